//! PropertyTable - plain ordered property table
//!
//! Provides [`PropertyTable`], the unhooked key/value store a service node
//! starts out with.

use crate::error::{PropertyError, PropertyResult};
use crate::symbol::Symbol;
use crate::value::PropertyValue;
use indexmap::IndexMap;
use serde::Serialize;

/// Plain property table
///
/// Keys are unique. Enumeration follows insertion order, which only matters
/// for serialization; lookups never depend on it.
///
/// Growth goes through `try_reserve`, so running out of memory surfaces as
/// [`PropertyError::NoMemory`] instead of aborting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PropertyTable {
    entries: IndexMap<Symbol, PropertyValue>,
}

impl PropertyTable {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Create empty table with room for `capacity` entries
    ///
    /// # Errors
    /// Returns [`PropertyError::NoMemory`] if the storage cannot be allocated
    pub fn with_capacity(capacity: usize) -> PropertyResult<Self> {
        let mut entries: IndexMap<Symbol, PropertyValue> = IndexMap::new();
        entries.try_reserve(capacity)?;
        Ok(Self { entries })
    }

    /// Copy every entry into a freshly allocated table
    ///
    /// # Errors
    /// Returns [`PropertyError::NoMemory`] if the copy cannot be allocated
    pub fn try_clone(&self) -> PropertyResult<Self> {
        let mut copy = Self::with_capacity(self.entries.len())?;
        for (key, value) in &self.entries {
            copy.entries.insert(key.clone(), value.clone());
        }
        Ok(copy)
    }

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    /// - [`PropertyError::MissingKey`] if `key` is empty
    /// - [`PropertyError::NoMemory`] if a new slot cannot be allocated
    pub fn set(&mut self, key: impl Into<Symbol>, value: PropertyValue) -> PropertyResult<()> {
        let key = key.into();
        if key.is_empty() {
            return Err(PropertyError::MissingKey);
        }
        if !self.entries.contains_key(&key) {
            self.entries.try_reserve(1)?;
        }
        self.entries.insert(key, value);
        Ok(())
    }

    /// Remove `key`, returning its value
    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.entries.shift_remove(key)
    }

    /// Value stored under `key`
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.get(key)
    }

    /// Check if `key` holds a value
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &PropertyValue)> {
        self.entries.iter()
    }

    /// Iterate keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.keys()
    }

    /// Serialize for diagnostics
    ///
    /// # Errors
    /// Returns the underlying `serde_json` error
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl<K: Into<Symbol>> FromIterator<(K, PropertyValue)> for PropertyTable {
    fn from_iter<I: IntoIterator<Item = (K, PropertyValue)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .filter(|(k, _)| !k.is_empty())
                .collect(),
        }
    }
}
