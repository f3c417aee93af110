//! TargetLocator - find the node whose properties get hooked

use crate::error::LocateError;
use rdisk_host::{ClassRegistry, Service, ServiceRef};
use rdisk_props::dlog;

/// Walks the provider chain looking for the first node of a given class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLocator {
    target_class: String,
}

impl TargetLocator {
    /// Locator for nodes of `target_class` (or a subclass)
    #[must_use]
    pub fn new(target_class: impl Into<String>) -> Self {
        Self {
            target_class: target_class.into(),
        }
    }

    /// Nearest ancestor of `this` that is an instance of the target class
    ///
    /// Starts at `this`'s provider, never considers `this` itself and stops
    /// before the service root. Read-only.
    ///
    /// # Errors
    /// `ClassNotLoaded` if the class is unknown to `classes`, `NotFound` if
    /// no ancestor matches
    pub fn find_target(
        &self,
        classes: &dyn ClassRegistry,
        this: &dyn Service,
    ) -> Result<ServiceRef, LocateError> {
        dlog!("{}::find_target({})", this.name(), self.target_class);

        let Some(class) = classes.meta_class_with_name(&self.target_class) else {
            tracing::warn!(
                "{}::find_target - failed to get class for '{}'",
                this.name(),
                self.target_class
            );
            return Err(LocateError::ClassNotLoaded(self.target_class.clone()));
        };

        let root = this.service_root_id();
        let mut cursor = this.provider();
        while let Some(node) = cursor {
            if node.id() == root {
                break;
            }
            if class.check_meta_cast(&*node) {
                dlog!("{}::find_target - got {} - SUCCESS", this.name(), node.name());
                return Ok(node);
            }
            dlog!("{}::find_target - got {} - SKIP", this.name(), node.name());
            cursor = node.provider();
        }

        Err(LocateError::NotFound(self.target_class.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdisk_host::sim::SimPlane;
    use rdisk_test_utils::{AhciStack, TARGET_CLASS};

    #[test]
    fn finds_nearest_target() {
        let stack = AhciStack::new();
        let locator = TargetLocator::new(TARGET_CLASS);

        let found = locator.find_target(&*stack.plane, &*stack.driver).unwrap();
        assert_eq!(found.id(), stack.disk.id());
    }

    #[test]
    fn subclass_matches() {
        let stack = AhciStack::with_disk_class("AppleAHCIDiskDriver");
        let locator = TargetLocator::new(TARGET_CLASS);

        let found = locator.find_target(&*stack.plane, &*stack.driver).unwrap();
        assert_eq!(found.id(), stack.disk.id());
    }

    #[test]
    fn target_absent_from_chain() {
        let stack = AhciStack::with_disk_class("IOSCSIPeripheralDeviceNub");
        let locator = TargetLocator::new(TARGET_CLASS);

        assert_eq!(
            locator.find_target(&*stack.plane, &*stack.driver).unwrap_err(),
            LocateError::NotFound(TARGET_CLASS.into())
        );
    }

    #[test]
    fn class_not_loaded() {
        let stack = AhciStack::without_target_class();
        let locator = TargetLocator::new(TARGET_CLASS);

        assert_eq!(
            locator.find_target(&*stack.plane, &*stack.driver).unwrap_err(),
            LocateError::ClassNotLoaded(TARGET_CLASS.into())
        );
    }

    #[test]
    fn self_and_root_are_never_matched() {
        let plane = SimPlane::new();
        plane.register_class(TARGET_CLASS, None).unwrap();
        let top = plane.attach("top", TARGET_CLASS, plane.root()).unwrap();
        let locator = TargetLocator::new(TARGET_CLASS);

        // `top` is a target itself, but only its ancestors are searched
        assert!(matches!(
            locator.find_target(&plane, &*top),
            Err(LocateError::NotFound(_))
        ));
        assert!(locator.find_target(&plane, &**plane.root()).is_err());
    }

    #[test]
    fn idempotent() {
        let stack = AhciStack::new();
        let locator = TargetLocator::new(TARGET_CLASS);
        let a = locator.find_target(&*stack.plane, &*stack.driver).unwrap();
        let b = locator.find_target(&*stack.plane, &*stack.driver).unwrap();
        assert_eq!(a.id(), b.id());
        assert!(!stack.disk.has_hooked_properties());
    }
}
