//! Symbol - interned property keys

use serde::{Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Property key
///
/// Cheap to clone; two symbols are equal when their text is equal.
/// The empty symbol stands for "no key" and is rejected by every table
/// operation that needs one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Create a symbol from text
    #[inline]
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    /// Key text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty symbol
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&Symbol> for Symbol {
    fn from(symbol: &Symbol) -> Self {
        symbol.clone()
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn symbol_equality_is_textual() {
        assert_eq!(Symbol::from("Model"), Symbol::from(String::from("Model")));
        assert_ne!(Symbol::from("Model"), Symbol::from("model"));
    }

    #[test]
    fn symbol_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(Symbol::from("Model"), 1);
        assert_eq!(map.get("Model"), Some(&1));
    }

    #[test]
    fn empty_symbol() {
        assert!(Symbol::from("").is_empty());
        assert!(!Symbol::from("Model").is_empty());
    }

    #[test]
    fn symbol_display() {
        assert_eq!(Symbol::from("Serial Number").to_string(), "Serial Number");
    }
}
