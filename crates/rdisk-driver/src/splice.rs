//! SpliceController - swaps a hookable table into a live node and back
//!
//! Install sequence on the target:
//! 1. hold an extra reference,
//! 2. close the handle it holds on its provider,
//! 3. stop it,
//! 4. swap in a [`HookableMap`] with the rewriter on the hooked key,
//! 5. restart it, so it republishes its properties through the hook,
//! 6. release the extra reference,
//! 7. terminate every node between the driver and the target.

use crate::config::DriverConfig;
use crate::error::{LocateError, SpliceError};
use crate::locator::TargetLocator;
use crate::rewriter::{fix_model, ModelRewriter};
use rdisk_host::{ClassRegistry, IoReturn, PropertyAction, Service, ServiceId, ServiceRef};
use rdisk_props::{dlog, HookableMap, PropertyStore};
use std::sync::Arc;

/// What an install did
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct SpliceReport {
    /// Status of the property action that swapped the table
    pub hook_status: IoReturn,
    /// Cause of a failed swap, if any
    pub hook_error: Option<SpliceError>,
    /// Result of restarting the target
    pub restarted: bool,
    /// Nodes `terminate` was called on, nearest first
    pub terminated: Vec<ServiceId>,
}

impl SpliceReport {
    /// True if the hook is in place
    #[inline]
    #[must_use]
    pub fn is_hooked(&self) -> bool {
        self.hook_status.is_success()
    }
}

fn dump(store: &PropertyStore) -> String {
    store.to_json().unwrap_or_default()
}

/// Installs and removes the rewriter on a target node
#[derive(Debug)]
pub struct SpliceController {
    config: DriverConfig,
    rewriter: Arc<ModelRewriter>,
    locator: TargetLocator,
}

impl SpliceController {
    /// Controller for `config`, logging under `owner`
    #[must_use]
    pub fn new(config: DriverConfig, owner: &str) -> Self {
        let rewriter = Arc::new(ModelRewriter::new(config.prefix.clone(), owner));
        let locator = TargetLocator::new(config.target_class.clone());
        Self {
            config,
            rewriter,
            locator,
        }
    }

    /// Shared rewriter; every installed hook holds one reference to it
    #[inline]
    #[must_use]
    pub fn rewriter(&self) -> &Arc<ModelRewriter> {
        &self.rewriter
    }

    /// Find the target above `this`
    ///
    /// # Errors
    /// See [`TargetLocator::find_target`]
    pub fn locate(
        &self,
        classes: &dyn ClassRegistry,
        this: &dyn Service,
    ) -> Result<ServiceRef, LocateError> {
        self.locator.find_target(classes, this)
    }

    /// Put the rewriter on the hooked key of the store behind `action`
    ///
    /// A store that is already hookable gets its hook added or replaced in
    /// place. A plain table is copied into a new [`HookableMap`], which then
    /// replaces it; the old table is dropped after the new one is installed.
    /// On error the store is left exactly as it was.
    ///
    /// # Errors
    /// `NoMemory` if the copy or the hook cannot be allocated, `InvalidKey`
    /// if the configured hooked key is empty
    pub fn hook_properties(&self, action: &mut PropertyAction<'_>) -> Result<(), SpliceError> {
        let key = &self.config.hooked_key;
        dlog!("hook_properties - current table = {}", dump(action.property_table()));

        let replacement = match action.property_table_mut() {
            PropertyStore::Hookable(map) => {
                dlog!("hook_properties - table {} already hookable", map.id());
                map.add_hook(key, &self.rewriter, fix_model)?;
                None
            }
            PropertyStore::Plain(table) => {
                let mut map = HookableMap::with_table(table)?;
                map.add_hook(key, &self.rewriter, fix_model)?;
                Some(map)
            }
        };

        if let Some(map) = replacement {
            let old = action.set_property_table(PropertyStore::Hookable(map));
            dlog!("hook_properties - new table = {}", dump(action.property_table()));
            drop(old);
        }
        Ok(())
    }

    /// Replace a hookable store with a plain copy of its entries
    ///
    /// Dropping the hookable map releases its hooks, and with them this
    /// controller's rewriter.
    ///
    /// # Errors
    /// `NotHooked` if the store is already plain (left untouched),
    /// `NoMemory` if the copy cannot be allocated
    pub fn unhook_properties(
        &self,
        action: &mut PropertyAction<'_>,
        service: &str,
    ) -> Result<(), SpliceError> {
        let plain = match action.property_table() {
            PropertyStore::Hookable(map) => {
                dlog!("unhook_properties - replacing table = {}", dump(action.property_table()));
                map.to_plain()?
            }
            PropertyStore::Plain(_) => {
                return Err(SpliceError::NotHooked {
                    service: service.to_string(),
                });
            }
        };

        let old = action.set_property_table(PropertyStore::Plain(plain));
        dlog!("unhook_properties - new table = {}", dump(action.property_table()));
        drop(old);
        Ok(())
    }

    /// Splice the rewriter into `target` and restart it
    ///
    /// `provider` is the driver's own provider; the terminate walk starts
    /// there and stops at the target (or the root). The walk and the restart
    /// run even if the swap failed; the report says what happened.
    ///
    /// # Errors
    /// `Detached` if the target has no provider to restart it with; nothing
    /// is touched in that case
    pub fn install(
        &self,
        provider: &ServiceRef,
        target: ServiceRef,
    ) -> Result<SpliceReport, SpliceError> {
        let Some(target_parent) = target.provider() else {
            return Err(SpliceError::Detached {
                service: target.name().to_string(),
            });
        };
        let hold = Arc::clone(&target);

        if target_parent.is_open(&*target) {
            dlog!(
                "install - {} has opened {} ... closing",
                target.name(),
                target_parent.name()
            );
            target_parent.close(&*target);
        }

        dlog!("install - stopping {}", target.name());
        target.stop(&target_parent);

        dlog!("install - patching property table on {}", target.name());
        let mut hook_error = None;
        let hook_status = target.run_property_action(&mut |mut action| {
            match self.hook_properties(&mut action) {
                Ok(()) => IoReturn::Success,
                Err(err) => {
                    let status = err.io_return();
                    hook_error = Some(err);
                    status
                }
            }
        });
        if let Some(err) = &hook_error {
            tracing::error!("install - failed to hook {}: {err}", target.name());
        }

        let restarted = target.start(&target_parent);
        dlog!(
            "install - restarting {} ... {}",
            target.name(),
            if restarted { "OK" } else { "FAILED" }
        );
        drop(hold);

        let terminated = terminate_between(provider, &target);
        tracing::info!(
            "spliced {} on {}: {} node(s) terminated",
            self.config.hooked_key,
            target.name(),
            terminated.len()
        );

        Ok(SpliceReport {
            hook_status,
            hook_error,
            restarted,
            terminated,
        })
    }

    /// Swap a plain copy back into `target`
    ///
    /// # Errors
    /// `NotHooked` if the target's store is plain, `NoMemory` if the copy
    /// cannot be allocated; the store is untouched in both cases
    pub fn uninstall(&self, target: &ServiceRef) -> Result<(), SpliceError> {
        let hold = Arc::clone(target);
        dlog!("uninstall - unpatching property table on {}", hold.name());

        let mut outcome = Ok(());
        hold.run_property_action(&mut |mut action| {
            match self.unhook_properties(&mut action, hold.name()) {
                Ok(()) => IoReturn::Success,
                Err(err) => {
                    let status = err.io_return();
                    outcome = Err(err);
                    status
                }
            }
        });
        drop(hold);
        outcome
    }
}

/// Terminate from `start` upward, stopping at `target` or the root
fn terminate_between(start: &ServiceRef, target: &ServiceRef) -> Vec<ServiceId> {
    let target_id = target.id();
    let mut terminated = Vec::new();
    let mut cursor = Some(Arc::clone(start));

    while let Some(node) = cursor {
        if node.id() == target_id || node.id() == node.service_root_id() {
            break;
        }
        let next = node.provider();
        let ok = node.terminate();
        dlog!(
            "install - terminating {} ... {}",
            node.name(),
            if ok { "OK" } else { "FAILED" }
        );
        terminated.push(node.id());
        cursor = next;
    }
    terminated
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rdisk_host::sim::LifecycleEvent;
    use rdisk_props::{PropertyTable, PropertyValue, Symbol};
    use rdisk_test_utils::AhciStack;

    fn controller() -> SpliceController {
        SpliceController::new(DriverConfig::new(), "NewIOBlockStorageDriver")
    }

    #[test]
    fn hook_plain_table_copies_entries() {
        let ctl = controller();
        let mut table = PropertyTable::new();
        table.set("Model", PropertyValue::from("ST1000")).unwrap();
        table.set("Revision", PropertyValue::from("CC43")).unwrap();
        let mut store = PropertyStore::Plain(table.clone());

        ctl.hook_properties(&mut PropertyAction::new(&mut store)).unwrap();

        let map = store.as_hookable().unwrap();
        assert_eq!(map.table(), &table);
        assert!(map.has_hook("Model"));
        assert_eq!(Arc::strong_count(ctl.rewriter()), 2);

        store.set("Model", PropertyValue::from("ST2000")).unwrap();
        assert_eq!(
            store.get("Model"),
            Some(&PropertyValue::from("APPLE SSD (ST2000)"))
        );
    }

    #[test]
    fn hook_existing_map_replaces_in_place() {
        let ctl = controller();
        let mut map = HookableMap::new();
        map.add_hook_fn(&Symbol::from("Model"), |_key: &Symbol, _value: PropertyValue| {
            PropertyValue::from("other")
        })
        .unwrap();
        let id = map.id();
        let mut store = PropertyStore::Hookable(map);

        ctl.hook_properties(&mut PropertyAction::new(&mut store)).unwrap();
        ctl.hook_properties(&mut PropertyAction::new(&mut store)).unwrap();

        let map = store.as_hookable().unwrap();
        assert_eq!(map.id(), id);
        assert_eq!(map.hook_count(), 1);
        assert_eq!(Arc::strong_count(ctl.rewriter()), 2);
    }

    #[test]
    fn unhook_restores_plain_copy_and_releases_rewriter() {
        let ctl = controller();
        let mut store = PropertyStore::default();
        store.set("Model", PropertyValue::from("ST1000")).unwrap();
        ctl.hook_properties(&mut PropertyAction::new(&mut store)).unwrap();
        store.set("Model", PropertyValue::from("ST1000")).unwrap();

        ctl.unhook_properties(&mut PropertyAction::new(&mut store), "disk")
            .unwrap();

        assert!(!store.is_hooked());
        assert_eq!(Arc::strong_count(ctl.rewriter()), 1);
        assert_eq!(
            store.get("Model"),
            Some(&PropertyValue::from("APPLE SSD (ST1000)"))
        );
        store.set("Model", PropertyValue::from("ST2000")).unwrap();
        assert_eq!(store.get("Model"), Some(&PropertyValue::from("ST2000")));
    }

    #[test]
    fn unhook_plain_reports_not_hooked() {
        let ctl = controller();
        let mut store = PropertyStore::default();
        store.set("Model", PropertyValue::from("ST1000")).unwrap();

        let err = ctl
            .unhook_properties(&mut PropertyAction::new(&mut store), "disk")
            .unwrap_err();
        assert_eq!(
            err,
            SpliceError::NotHooked {
                service: "disk".into()
            }
        );
        assert_eq!(store.get("Model"), Some(&PropertyValue::from("ST1000")));
    }

    #[test]
    fn install_runs_full_sequence() {
        let stack = AhciStack::new();
        let ctl = controller();
        let target = ctl.locate(&*stack.plane, &*stack.driver).unwrap();

        let report = ctl.install(&stack.provider_ref(), target).unwrap();

        assert!(report.is_hooked());
        assert!(report.restarted);
        assert_eq!(report.terminated, vec![stack.block_device.id()]);
        assert!(stack.block_device.is_terminated());
        assert!(!stack.disk.is_terminated());
        assert!(!stack.device.is_open(&*stack.disk));
        assert_eq!(
            stack.disk_model().as_deref(),
            Some("APPLE SSD (ST1000DM003-1CH162)")
        );

        assert_eq!(
            stack.plane.events().for_service("device"),
            vec![LifecycleEvent::Closed {
                client: "disk".into()
            }]
        );
        assert_eq!(
            stack.plane.events().for_service("disk"),
            vec![LifecycleEvent::Stopped, LifecycleEvent::Started]
        );
    }

    #[test]
    fn install_on_detached_target_touches_nothing() {
        let stack = AhciStack::new();
        let ctl = controller();
        let root = stack.plane.root().as_service_ref();

        let err = ctl.install(&stack.provider_ref(), root).unwrap_err();
        assert_eq!(
            err,
            SpliceError::Detached {
                service: "Root".into()
            }
        );
        assert!(stack.plane.events().events().is_empty());
    }

    #[test]
    fn uninstall_round_trip() {
        let stack = AhciStack::new();
        let ctl = controller();
        let target = stack.disk_ref();

        let _ = ctl.install(&stack.provider_ref(), Arc::clone(&target)).unwrap();
        assert!(stack.disk.has_hooked_properties());

        ctl.uninstall(&target).unwrap();
        assert!(!stack.disk.has_hooked_properties());
        assert_eq!(Arc::strong_count(ctl.rewriter()), 1);
        assert_eq!(
            ctl.uninstall(&target),
            Err(SpliceError::NotHooked {
                service: "disk".into()
            })
        );
    }
}
