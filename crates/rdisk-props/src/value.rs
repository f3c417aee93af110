//! PropertyValue - typed values stored in property tables

use crate::table::PropertyTable;
use serde::Serialize;

/// Value stored under a property key
///
/// Mirrors the container types a service registry hands out: strings,
/// numbers, booleans, raw data, arrays and nested dictionaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// UTF-8 string
    String(String),

    /// Unsigned number
    Number(u64),

    /// Boolean
    Boolean(bool),

    /// Raw bytes
    Data(Vec<u8>),

    /// Ordered list of values
    Array(Vec<PropertyValue>),

    /// Nested table
    Dictionary(PropertyTable),
}

impl PropertyValue {
    /// Borrow as string, if this is one
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Short type name for diagnostics
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::Data(_) => "data",
            Self::Array(_) => "array",
            Self::Dictionary(_) => "dictionary",
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<u64> for PropertyValue {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Vec<u8>> for PropertyValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Data(bytes)
    }
}

impl From<PropertyTable> for PropertyValue {
    fn from(table: PropertyTable) -> Self {
        Self::Dictionary(table)
    }
}
