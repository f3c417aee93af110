//! Service - the host's service tree as seen by a driver

use crate::action::PropertyAction;
use crate::io_return::IoReturn;
use crate::meta::MetaClass;
use rdisk_props::PropertyValue;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

/// Identity of a node in the service tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceId(pub Uuid);

impl ServiceId {
    /// Fresh random identity
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ServiceId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ServiceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Counted reference to a service node
///
/// Cloning is a retain, dropping is a release.
pub type ServiceRef = Arc<dyn Service>;

/// Node in the host's service tree
///
/// Every node has at most one provider (parent). The host owns node
/// lifetimes and lifecycle; callers only invoke these operations.
pub trait Service: Send + Sync + Debug {
    /// Node identity
    fn id(&self) -> ServiceId;

    /// Display name
    fn name(&self) -> &str;

    /// Dynamic class of this node
    fn meta_class(&self) -> &Arc<MetaClass>;

    /// Parent node, `None` at the top of the tree
    fn provider(&self) -> Option<ServiceRef>;

    /// Identity of the tree root
    fn service_root_id(&self) -> ServiceId;

    /// Check if `client` currently holds this node open
    fn is_open(&self, client: &dyn Service) -> bool;

    /// Close the handle `client` holds on this node
    fn close(&self, client: &dyn Service);

    /// Start this node on `provider`
    fn start(&self, provider: &ServiceRef) -> bool;

    /// Stop this node on `provider`
    fn stop(&self, provider: &ServiceRef);

    /// Tear this node down
    fn terminate(&self) -> bool;

    /// Run `action` with exclusive access to this node's property store
    ///
    /// No other reader or writer of the store runs while `action` does.
    fn run_property_action(
        &self,
        action: &mut dyn FnMut(PropertyAction<'_>) -> IoReturn,
    ) -> IoReturn;

    /// Copy of the value stored under `key`
    fn property(&self, key: &str) -> Option<PropertyValue> {
        let mut value = None;
        self.run_property_action(&mut |action| {
            value = action.property_table().get(key).cloned();
            IoReturn::Success
        });
        value
    }

    /// Check if the property store is currently a hookable map
    fn has_hooked_properties(&self) -> bool {
        let mut hooked = false;
        self.run_property_action(&mut |action| {
            hooked = action.property_table().is_hooked();
            IoReturn::Success
        });
        hooked
    }
}

/// Default behaviour of the driver's superclass
///
/// A driver falls back to these whenever it has nothing of its own to do.
pub trait DriverBase: Send + Sync {
    /// Default attach-eligibility check
    fn probe(&self, provider: &ServiceRef, score: &mut i32) -> bool;

    /// Default start
    fn start(&self, provider: &ServiceRef) -> bool;

    /// Default stop
    fn stop(&self, provider: &ServiceRef);
}
