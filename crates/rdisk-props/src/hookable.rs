//! HookableMap - property table with per-key set hooks
//!
//! Provides [`HookableMap`], a [`PropertyTable`] paired with a side-table of
//! [`Callback`]s. A set on a hooked key stores whatever the hook returns
//! instead of the proposed value.

use crate::callback::{Callback, SetCallback};
use crate::dlog;
use crate::error::{PropertyError, PropertyResult};
use crate::symbol::Symbol;
use crate::table::PropertyTable;
use crate::value::PropertyValue;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

/// Identity of one [`HookableMap`] instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapId(Uuid);

impl MapId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for MapId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Property table with set hooks
///
/// At most one hook per key; registering again replaces the previous hook and
/// drops its context. Hooks are independent of the entries: removing a value
/// keeps the hook, so it fires again the next time the key is set.
///
/// Dropping the map drops the side-table first, then the entries.
#[derive(Debug)]
pub struct HookableMap {
    id: MapId,
    hooks: IndexMap<Symbol, Callback>,
    table: PropertyTable,
}

impl HookableMap {
    /// Create empty map with no hooks
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: MapId::new(),
            hooks: IndexMap::new(),
            table: PropertyTable::new(),
        }
    }

    /// Create a map holding a copy of every entry in `source`
    ///
    /// The copy goes straight into the underlying table, so no hook fires
    /// (there are none yet anyway).
    ///
    /// # Errors
    /// Returns [`PropertyError::NoMemory`] if either the side-table or the
    /// entry copy cannot be allocated. Nothing is leaked on failure.
    pub fn with_table(source: &PropertyTable) -> PropertyResult<Self> {
        let mut hooks: IndexMap<Symbol, Callback> = IndexMap::new();
        hooks.try_reserve(1).map_err(|_| {
            tracing::warn!("HookableMap::with_table - failed to allocate hook table");
            PropertyError::NoMemory
        })?;
        let table = source.try_clone().map_err(|e| {
            tracing::warn!("HookableMap::with_table - failed to copy {} entries", source.len());
            e
        })?;

        let map = Self {
            id: MapId::new(),
            hooks,
            table,
        };
        tracing::info!("HookableMap::with_table - created map {}", map.id);
        Ok(map)
    }

    /// Instance identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> MapId {
        self.id
    }

    /// Store `value` under `key`, routed through the key's hook if any
    ///
    /// # Errors
    /// - [`PropertyError::MissingKey`] if `key` is empty
    /// - [`PropertyError::NoMemory`] if the table cannot grow
    pub fn set(&mut self, key: impl Into<Symbol>, value: PropertyValue) -> PropertyResult<()> {
        let key = key.into();
        if key.is_empty() {
            return Err(PropertyError::MissingKey);
        }
        dlog!("HookableMap[{}]::set({}, {})", self.id, key, value.type_name());

        // Hold our own reference so the hook outlives the call even if the
        // side-table entry goes away.
        let Some(hook) = self.hooks.get(&key).cloned() else {
            return self.table.set(key, value);
        };
        dlog!("HookableMap[{}]::set - invoking hook for '{}'", self.id, key);
        let value = hook.invoke(&key, value);
        drop(hook);
        dlog!(
            "HookableMap[{}]::set - hook for '{}' returned {}",
            self.id,
            key,
            value.type_name()
        );
        self.table.set(key, value)
    }

    /// Remove `key` from the entries; hooks are left alone
    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.table.remove(key)
    }

    /// Register `f` with `context` as the hook for `key`
    ///
    /// # Errors
    /// - [`PropertyError::MissingKey`] if `key` is empty
    /// - [`PropertyError::NoMemory`] if the side-table cannot grow
    pub fn add_hook<C>(
        &mut self,
        key: &Symbol,
        context: &Arc<C>,
        f: SetCallback<C>,
    ) -> PropertyResult<()>
    where
        C: Send + Sync + 'static,
    {
        self.install_hook(key, Callback::with_func(f, context))
    }

    /// Register a closure as the hook for `key`
    ///
    /// # Errors
    /// Same as [`HookableMap::add_hook`]
    pub fn add_hook_fn<F>(&mut self, key: &Symbol, f: F) -> PropertyResult<()>
    where
        F: Fn(&Symbol, PropertyValue) -> PropertyValue + Send + Sync + 'static,
    {
        self.install_hook(key, Callback::from_fn(f))
    }

    fn install_hook(&mut self, key: &Symbol, hook: Callback) -> PropertyResult<()> {
        if key.is_empty() {
            return Err(PropertyError::MissingKey);
        }
        dlog!("HookableMap[{}]::add_hook('{}')", self.id, key);
        if !self.hooks.contains_key(key) {
            self.hooks.try_reserve(1)?;
        }
        // The replaced hook, if any, is dropped here.
        self.hooks.insert(key.clone(), hook);
        Ok(())
    }

    /// Drop the hook for `key`, if any
    pub fn remove_hook(&mut self, key: &str) {
        if key.is_empty() {
            return;
        }
        dlog!("HookableMap[{}]::remove_hook('{}')", self.id, key);
        self.hooks.shift_remove(key);
    }

    /// Check if `key` has a hook
    #[inline]
    #[must_use]
    pub fn has_hook(&self, key: &str) -> bool {
        self.hooks.contains_key(key)
    }

    /// Number of registered hooks
    #[inline]
    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Value stored under `key`
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.table.get(key)
    }

    /// Check if `key` holds a value
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if there are no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &PropertyValue)> {
        self.table.iter()
    }

    /// Underlying entries
    #[inline]
    #[must_use]
    pub fn table(&self) -> &PropertyTable {
        &self.table
    }

    /// Copy the entries into a plain table, leaving hooks behind
    ///
    /// # Errors
    /// Returns [`PropertyError::NoMemory`] if the copy cannot be allocated
    pub fn to_plain(&self) -> PropertyResult<PropertyTable> {
        self.table.try_clone()
    }

    /// Serialize the entries for diagnostics
    ///
    /// # Errors
    /// Returns the underlying `serde_json` error
    pub fn to_json(&self) -> serde_json::Result<String> {
        self.table.to_json()
    }
}

impl Default for HookableMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for HookableMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.table.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Context that counts how often its hook ran
    #[derive(Debug, Default)]
    struct Probe {
        calls: AtomicUsize,
    }

    fn wrap(probe: &Probe, _key: &Symbol, value: PropertyValue) -> PropertyValue {
        probe.calls.fetch_add(1, Ordering::SeqCst);
        match value {
            PropertyValue::String(s) => PropertyValue::String(format!("[{s}]")),
            other => other,
        }
    }

    fn star(probe: &Probe, _key: &Symbol, value: PropertyValue) -> PropertyValue {
        probe.calls.fetch_add(1, Ordering::SeqCst);
        match value {
            PropertyValue::String(s) => PropertyValue::String(format!("*{s}")),
            other => other,
        }
    }

    fn model() -> Symbol {
        Symbol::from("Model")
    }

    fn source_table() -> PropertyTable {
        [
            ("Model", PropertyValue::from("ST1000")),
            ("Revision", PropertyValue::from("CC43")),
            ("Block Size", PropertyValue::from(512u64)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn new_map_is_empty() {
        let map = HookableMap::new();
        assert!(map.is_empty());
        assert_eq!(map.hook_count(), 0);
    }

    #[test]
    fn set_without_hook_stores_value() {
        let mut map = HookableMap::new();
        map.set("Model", PropertyValue::from("ST1000")).unwrap();
        assert_eq!(map.get("Model"), Some(&PropertyValue::from("ST1000")));
    }

    #[test]
    fn set_with_hook_stores_hook_result() {
        let probe = Arc::new(Probe::default());
        let mut map = HookableMap::new();
        map.add_hook(&model(), &probe, wrap).unwrap();

        map.set("Model", PropertyValue::from("ST1000")).unwrap();
        assert_eq!(map.get("Model"), Some(&PropertyValue::from("[ST1000]")));
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn hook_only_fires_for_its_key() {
        let probe = Arc::new(Probe::default());
        let mut map = HookableMap::new();
        map.add_hook(&model(), &probe, wrap).unwrap();

        map.set("Revision", PropertyValue::from("CC43")).unwrap();
        assert_eq!(map.get("Revision"), Some(&PropertyValue::from("CC43")));
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn set_rejects_empty_key() {
        let probe = Arc::new(Probe::default());
        let mut map = HookableMap::new();
        map.add_hook(&model(), &probe, wrap).unwrap();
        assert_eq!(
            map.set("", PropertyValue::from("x")),
            Err(PropertyError::MissingKey)
        );
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn add_hook_rejects_empty_key() {
        let probe = Arc::new(Probe::default());
        let mut map = HookableMap::new();
        assert_eq!(
            map.add_hook(&Symbol::from(""), &probe, wrap),
            Err(PropertyError::MissingKey)
        );
        assert_eq!(map.hook_count(), 0);
        assert_eq!(Arc::strong_count(&probe), 1);
    }

    #[test]
    fn add_then_remove_hook_restores_pass_through() {
        let probe = Arc::new(Probe::default());
        let mut map = HookableMap::new();
        map.add_hook(&model(), &probe, wrap).unwrap();
        map.remove_hook("Model");

        map.set("Model", PropertyValue::from("ST1000")).unwrap();
        assert_eq!(map.get("Model"), Some(&PropertyValue::from("ST1000")));
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
        assert_eq!(Arc::strong_count(&probe), 1);
    }

    #[test]
    fn remove_hook_on_empty_or_unknown_key_is_noop() {
        let probe = Arc::new(Probe::default());
        let mut map = HookableMap::new();
        map.add_hook(&model(), &probe, wrap).unwrap();

        map.remove_hook("");
        map.remove_hook("Revision");
        assert!(map.has_hook("Model"));
    }

    #[test]
    fn second_hook_replaces_first_and_releases_its_context() {
        let first = Arc::new(Probe::default());
        let second = Arc::new(Probe::default());
        let mut map = HookableMap::new();

        map.add_hook(&model(), &first, wrap).unwrap();
        assert_eq!(Arc::strong_count(&first), 2);

        map.add_hook(&model(), &second, star).unwrap();
        assert_eq!(Arc::strong_count(&first), 1);
        assert_eq!(Arc::strong_count(&second), 2);
        assert_eq!(map.hook_count(), 1);

        map.set("Model", PropertyValue::from("ST1000")).unwrap();
        assert_eq!(map.get("Model"), Some(&PropertyValue::from("*ST1000")));
        assert_eq!(first.calls.load(Ordering::SeqCst), 0);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn hook_survives_remove_of_value() {
        let probe = Arc::new(Probe::default());
        let mut map = HookableMap::new();
        map.add_hook(&model(), &probe, wrap).unwrap();
        map.set("Model", PropertyValue::from("A")).unwrap();

        assert_eq!(map.remove("Model"), Some(PropertyValue::from("[A]")));
        assert!(map.has_hook("Model"));

        map.set("Model", PropertyValue::from("B")).unwrap();
        assert_eq!(map.get("Model"), Some(&PropertyValue::from("[B]")));
        assert_eq!(probe.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn with_table_copies_entries_without_hooks() {
        let source = source_table();
        let map = HookableMap::with_table(&source).unwrap();

        assert_eq!(map.table(), &source);
        assert_eq!(map.hook_count(), 0);
    }

    #[test]
    fn with_table_does_not_run_later_hooks_on_copied_entries() {
        let probe = Arc::new(Probe::default());
        let mut map = HookableMap::with_table(&source_table()).unwrap();
        map.add_hook(&model(), &probe, wrap).unwrap();

        assert_eq!(map.get("Model"), Some(&PropertyValue::from("ST1000")));
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn each_map_has_its_own_id() {
        let a = HookableMap::new();
        let b = HookableMap::with_table(&source_table()).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn dropping_map_releases_contexts() {
        let probe = Arc::new(Probe::default());
        let mut map = HookableMap::new();
        map.add_hook(&model(), &probe, wrap).unwrap();
        map.add_hook_fn(&Symbol::from("Revision"), {
            let probe = Arc::clone(&probe);
            move |key: &Symbol, value: PropertyValue| wrap(&probe, key, value)
        })
        .unwrap();
        assert_eq!(Arc::strong_count(&probe), 3);

        drop(map);
        assert_eq!(Arc::strong_count(&probe), 1);
    }

    #[test]
    fn to_plain_drops_hooks() {
        let probe = Arc::new(Probe::default());
        let mut map = HookableMap::with_table(&source_table()).unwrap();
        map.add_hook(&model(), &probe, wrap).unwrap();

        let mut plain = map.to_plain().unwrap();
        plain.set("Model", PropertyValue::from("ST2000")).unwrap();
        assert_eq!(plain.get("Model"), Some(&PropertyValue::from("ST2000")));
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn serializes_entries_only() {
        let probe = Arc::new(Probe::default());
        let mut map = HookableMap::with_table(&source_table()).unwrap();
        map.add_hook(&model(), &probe, wrap).unwrap();
        assert_eq!(map.to_json().unwrap(), source_table().to_json().unwrap());
    }

    proptest! {
        #[test]
        fn prop_unhooked_set_is_identity(key in "[A-Za-z ]{1,16}", value in ".*") {
            let mut map = HookableMap::new();
            map.set(key.as_str(), PropertyValue::from(value.clone())).unwrap();
            prop_assert_eq!(map.get(&key), Some(&PropertyValue::from(value)));
        }

        #[test]
        fn prop_hooked_set_stores_hook_result_once(
            values in proptest::collection::vec(".*", 1..8)
        ) {
            let probe = Arc::new(Probe::default());
            let mut map = HookableMap::new();
            map.add_hook(&model(), &probe, wrap).unwrap();

            for value in &values {
                map.set("Model", PropertyValue::from(value.as_str())).unwrap();
                prop_assert_eq!(
                    map.get("Model"),
                    Some(&PropertyValue::from(format!("[{value}]")))
                );
            }
            prop_assert_eq!(probe.calls.load(Ordering::SeqCst), values.len());
        }
    }
}
