//! PropertyStore - the table a service node holds

use crate::error::PropertyResult;
use crate::hookable::HookableMap;
use crate::symbol::Symbol;
use crate::table::PropertyTable;
use crate::value::PropertyValue;
use serde::{Serialize, Serializer};

/// Property store of a service node
///
/// Always exactly one of a plain table or a hookable map. Whether a node has
/// been hooked is a match on this enum.
#[derive(Debug)]
pub enum PropertyStore {
    /// Ordinary table
    Plain(PropertyTable),

    /// Table with set hooks installed
    Hookable(HookableMap),
}

impl PropertyStore {
    /// True if this store is a [`HookableMap`]
    #[inline]
    #[must_use]
    pub fn is_hooked(&self) -> bool {
        matches!(self, Self::Hookable(_))
    }

    /// Borrow the hookable map, if this store is one
    #[inline]
    #[must_use]
    pub fn as_hookable(&self) -> Option<&HookableMap> {
        match self {
            Self::Hookable(map) => Some(map),
            Self::Plain(_) => None,
        }
    }

    /// Entries, regardless of variant
    #[inline]
    #[must_use]
    pub fn table(&self) -> &PropertyTable {
        match self {
            Self::Plain(table) => table,
            Self::Hookable(map) => map.table(),
        }
    }

    /// Store a value; hooked stores route it through their hooks
    ///
    /// # Errors
    /// See [`PropertyTable::set`] and [`HookableMap::set`]
    pub fn set(&mut self, key: impl Into<Symbol>, value: PropertyValue) -> PropertyResult<()> {
        match self {
            Self::Plain(table) => table.set(key, value),
            Self::Hookable(map) => map.set(key, value),
        }
    }

    /// Remove a value
    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        match self {
            Self::Plain(table) => table.remove(key),
            Self::Hookable(map) => map.remove(key),
        }
    }

    /// Value stored under `key`
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.table().get(key)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.table().len()
    }

    /// Check if store has no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    /// Copy entries into a fresh plain table
    ///
    /// # Errors
    /// Returns `NoMemory` if the copy cannot be allocated
    pub fn to_plain(&self) -> PropertyResult<PropertyTable> {
        self.table().try_clone()
    }

    /// Serialize the entries for diagnostics
    ///
    /// # Errors
    /// Returns the underlying `serde_json` error
    pub fn to_json(&self) -> serde_json::Result<String> {
        self.table().to_json()
    }
}

impl Default for PropertyStore {
    fn default() -> Self {
        Self::Plain(PropertyTable::new())
    }
}

impl From<PropertyTable> for PropertyStore {
    fn from(table: PropertyTable) -> Self {
        Self::Plain(table)
    }
}

impl From<HookableMap> for PropertyStore {
    fn from(map: HookableMap) -> Self {
        Self::Hookable(map)
    }
}

impl Serialize for PropertyStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.table().serialize(serializer)
    }
}
