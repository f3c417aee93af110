use super::events::{EventRecorder, LifecycleEvent, SimEvent};
use crate::action::PropertyAction;
use crate::io_return::IoReturn;
use crate::meta::MetaClass;
use crate::service::{Service, ServiceId, ServiceRef};
use parking_lot::Mutex;
use rdisk_props::{MapId, PropertyResult, PropertyStore, PropertyValue, Symbol};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Hook run every time a [`SimService`] starts
///
/// Stands in for the node's own initialization, e.g. a disk driver reading
/// its identity and publishing it as properties.
pub type StartHook = Arc<dyn Fn(&SimService) + Send + Sync>;

#[derive(Debug, Default)]
struct Lifecycle {
    started: bool,
    terminated: bool,
    open_clients: Vec<ServiceId>,
}

/// Node of a [`SimPlane`](super::SimPlane)
pub struct SimService {
    id: ServiceId,
    name: String,
    meta_class: Arc<MetaClass>,
    provider: Option<Arc<SimService>>,
    root_id: ServiceId,
    properties: Mutex<PropertyStore>,
    lifecycle: Mutex<Lifecycle>,
    on_start: Mutex<Option<StartHook>>,
    events: Arc<EventRecorder>,
}

impl SimService {
    pub(super) fn new_root(
        name: &str,
        meta_class: Arc<MetaClass>,
        events: Arc<EventRecorder>,
    ) -> Self {
        let id = ServiceId::new();
        Self {
            id,
            name: name.to_string(),
            meta_class,
            provider: None,
            root_id: id,
            properties: Mutex::new(PropertyStore::default()),
            lifecycle: Mutex::new(Lifecycle {
                started: true,
                ..Lifecycle::default()
            }),
            on_start: Mutex::new(None),
            events,
        }
    }

    pub(super) fn new_child(
        name: &str,
        meta_class: Arc<MetaClass>,
        provider: &Arc<SimService>,
    ) -> Self {
        Self {
            id: ServiceId::new(),
            name: name.to_string(),
            meta_class,
            provider: Some(Arc::clone(provider)),
            root_id: provider.root_id,
            properties: Mutex::new(PropertyStore::default()),
            lifecycle: Mutex::new(Lifecycle {
                started: true,
                ..Lifecycle::default()
            }),
            on_start: Mutex::new(None),
            events: Arc::clone(&provider.events),
        }
    }

    /// As a counted service reference
    #[must_use]
    pub fn as_service_ref(self: &Arc<Self>) -> ServiceRef {
        Arc::clone(self) as ServiceRef
    }

    /// Mark `client` as holding this node open
    pub fn open(&self, client: &dyn Service) {
        let mut lifecycle = self.lifecycle.lock();
        if !lifecycle.open_clients.contains(&client.id()) {
            lifecycle.open_clients.push(client.id());
        }
    }

    /// Install the hook run on every successful start
    pub fn set_on_start(&self, hook: StartHook) {
        *self.on_start.lock() = Some(hook);
    }

    /// Store a property through the current store (hooks included)
    ///
    /// # Errors
    /// Propagates the store's own error
    pub fn set_property(&self, key: impl Into<Symbol>, value: PropertyValue) -> PropertyResult<()> {
        self.properties.lock().set(key, value)
    }

    /// Replace the whole property store
    pub fn replace_properties(&self, store: PropertyStore) {
        let old = std::mem::replace(&mut *self.properties.lock(), store);
        drop(old);
    }

    /// Identity of the installed hookable map, if any
    #[must_use]
    pub fn hooked_map_id(&self) -> Option<MapId> {
        self.properties.lock().as_hookable().map(|map| map.id())
    }

    /// Number of hooks on the installed hookable map (0 when plain)
    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.properties
            .lock()
            .as_hookable()
            .map_or(0, |map| map.hook_count())
    }

    /// Diagnostic dump of the current properties
    #[must_use]
    pub fn properties_json(&self) -> String {
        self.properties.lock().to_json().unwrap_or_default()
    }

    /// True while started and not terminated
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.lifecycle.lock().started
    }

    /// True once terminated
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.lifecycle.lock().terminated
    }

    fn record(&self, event: LifecycleEvent) {
        self.events.record(SimEvent::new(self.name.clone(), event));
    }
}

impl Debug for SimService {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimService")
            .field("name", &self.name)
            .field("class", &self.meta_class.name())
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl Service for SimService {
    fn id(&self) -> ServiceId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn meta_class(&self) -> &Arc<MetaClass> {
        &self.meta_class
    }

    fn provider(&self) -> Option<ServiceRef> {
        self.provider.as_ref().map(|p| Arc::clone(p) as ServiceRef)
    }

    fn service_root_id(&self) -> ServiceId {
        self.root_id
    }

    fn is_open(&self, client: &dyn Service) -> bool {
        self.lifecycle.lock().open_clients.contains(&client.id())
    }

    fn close(&self, client: &dyn Service) {
        self.lifecycle
            .lock()
            .open_clients
            .retain(|id| *id != client.id());
        self.record(LifecycleEvent::Closed {
            client: client.name().to_string(),
        });
    }

    fn start(&self, _provider: &ServiceRef) -> bool {
        {
            let mut lifecycle = self.lifecycle.lock();
            if lifecycle.terminated {
                drop(lifecycle);
                self.record(LifecycleEvent::StartRefused);
                return false;
            }
            lifecycle.started = true;
        }
        self.record(LifecycleEvent::Started);

        let hook = self.on_start.lock().clone();
        if let Some(hook) = hook {
            hook(self);
        }
        true
    }

    fn stop(&self, _provider: &ServiceRef) {
        self.lifecycle.lock().started = false;
        self.record(LifecycleEvent::Stopped);
    }

    fn terminate(&self) -> bool {
        {
            let mut lifecycle = self.lifecycle.lock();
            if lifecycle.terminated {
                return false;
            }
            lifecycle.terminated = true;
            lifecycle.started = false;
        }
        self.record(LifecycleEvent::Terminated);
        true
    }

    fn run_property_action(
        &self,
        action: &mut dyn FnMut(PropertyAction<'_>) -> IoReturn,
    ) -> IoReturn {
        let mut store = self.properties.lock();
        action(PropertyAction::new(&mut store))
    }
}
