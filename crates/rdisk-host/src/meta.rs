//! MetaClass - runtime class identity and safe type checks

use crate::service::Service;
use std::sync::Arc;

/// Runtime class descriptor
///
/// Classes form a single-inheritance chain; a service "is a" class if that
/// class appears anywhere on its own class's superclass chain.
#[derive(Debug, PartialEq, Eq)]
pub struct MetaClass {
    name: String,
    superclass: Option<Arc<MetaClass>>,
}

impl MetaClass {
    /// Create a class with no superclass
    #[must_use]
    pub fn root(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            superclass: None,
        })
    }

    /// Create a class deriving from `superclass`
    #[must_use]
    pub fn subclass(name: impl Into<String>, superclass: &Arc<MetaClass>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            superclass: Some(Arc::clone(superclass)),
        })
    }

    /// Class name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct superclass
    #[inline]
    #[must_use]
    pub fn superclass(&self) -> Option<&Arc<MetaClass>> {
        self.superclass.as_ref()
    }

    /// Check if `self` is `other` or derives from it
    #[must_use]
    pub fn inherits_from(&self, other: &MetaClass) -> bool {
        let mut cursor = Some(self);
        while let Some(class) = cursor {
            if class.name == other.name {
                return true;
            }
            cursor = class.superclass.as_deref();
        }
        false
    }

    /// Check if `service` is an instance of this class
    #[inline]
    #[must_use]
    pub fn check_meta_cast(&self, service: &dyn Service) -> bool {
        service.meta_class().inherits_from(self)
    }
}

/// Lookup of classes loaded in the runtime image
pub trait ClassRegistry: Send + Sync {
    /// Class with the given name, if it is loaded
    fn meta_class_with_name(&self, name: &str) -> Option<Arc<MetaClass>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inherits_along_chain() {
        let base = MetaClass::root("IOService");
        let storage = MetaClass::subclass("IOBlockStorageDriver", &base);
        let ahci = MetaClass::subclass("IOAHCIBlockStorageDriver", &storage);

        assert!(ahci.inherits_from(&ahci));
        assert!(ahci.inherits_from(&storage));
        assert!(ahci.inherits_from(&base));
        assert!(!storage.inherits_from(&ahci));
    }

    #[test]
    fn unrelated_classes() {
        let a = MetaClass::root("IOMedia");
        let b = MetaClass::root("IOAHCIDevice");
        assert!(!a.inherits_from(&b));
        assert_eq!(a.superclass(), None);
    }
}
