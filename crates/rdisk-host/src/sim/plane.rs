use super::events::EventRecorder;
use super::node::SimService;
use crate::meta::{ClassRegistry, MetaClass};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;

/// Name of the class every plane starts with
pub const ROOT_CLASS: &str = "IORegistryEntry";

/// Errors building a simulated plane
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// No class registered under this name
    #[error("unknown class: {0}")]
    UnknownClass(String),

    /// A class with this name is already registered
    #[error("class already registered: {0}")]
    DuplicateClass(String),
}

/// Simulated service plane: class registry plus a tree rooted at one node
///
/// Nodes are attached already started, the way the host hands a fully
/// matched stack to a newly loaded driver.
#[derive(Debug)]
pub struct SimPlane {
    classes: RwLock<IndexMap<String, Arc<MetaClass>>>,
    root: Arc<SimService>,
    events: Arc<EventRecorder>,
}

impl SimPlane {
    /// Plane with only the root class and root node
    #[must_use]
    pub fn new() -> Self {
        let root_class = MetaClass::root(ROOT_CLASS);
        let events = Arc::new(EventRecorder::default());
        let root = Arc::new(SimService::new_root(
            "Root",
            Arc::clone(&root_class),
            Arc::clone(&events),
        ));

        let mut classes = IndexMap::new();
        classes.insert(ROOT_CLASS.to_string(), root_class);

        Self {
            classes: RwLock::new(classes),
            root,
            events,
        }
    }

    /// Register a class, deriving from `superclass` (or the root class)
    ///
    /// # Errors
    /// `DuplicateClass` if `name` is taken, `UnknownClass` if `superclass`
    /// is not registered
    pub fn register_class(
        &self,
        name: &str,
        superclass: Option<&str>,
    ) -> Result<Arc<MetaClass>, SimError> {
        let mut classes = self.classes.write();
        if classes.contains_key(name) {
            return Err(SimError::DuplicateClass(name.to_string()));
        }
        let parent_name = superclass.unwrap_or(ROOT_CLASS);
        let parent = classes
            .get(parent_name)
            .ok_or_else(|| SimError::UnknownClass(parent_name.to_string()))?;

        let class = MetaClass::subclass(name, parent);
        classes.insert(name.to_string(), Arc::clone(&class));
        tracing::trace!("sim: registered class {name} : {parent_name}");
        Ok(class)
    }

    /// Attach a new started node of class `class_name` under `provider`
    ///
    /// # Errors
    /// `UnknownClass` if `class_name` is not registered
    pub fn attach(
        &self,
        name: &str,
        class_name: &str,
        provider: &Arc<SimService>,
    ) -> Result<Arc<SimService>, SimError> {
        let class = self
            .meta_class_with_name(class_name)
            .ok_or_else(|| SimError::UnknownClass(class_name.to_string()))?;
        Ok(Arc::new(SimService::new_child(name, class, provider)))
    }

    /// Root node
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Arc<SimService> {
        &self.root
    }

    /// Lifecycle log shared by every node of this plane
    #[inline]
    #[must_use]
    pub fn events(&self) -> &Arc<EventRecorder> {
        &self.events
    }

    /// Number of registered classes
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.read().len()
    }
}

impl Default for SimPlane {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassRegistry for SimPlane {
    fn meta_class_with_name(&self, name: &str) -> Option<Arc<MetaClass>> {
        self.classes.read().get(name).cloned()
    }
}
