//! RenameDisk Property Tables
//!
//! Ordered property tables and a hookable wrapper that lets a callback
//! rewrite a value before it is stored.
//!
//! # Core Concepts
//!
//! - [`Symbol`]: Interned key identity
//! - [`PropertyValue`]: Typed property value (string, number, data, ...)
//! - [`PropertyTable`]: Plain ordered key/value table
//! - [`Callback`]: Set hook with its captured context
//! - [`HookableMap`]: Table plus a per-key hook side-table
//! - [`PropertyStore`]: What a service node actually holds, plain or hooked
//!
//! # Example
//!
//! ```rust
//! use rdisk_props::{HookableMap, PropertyTable, PropertyValue, Symbol};
//! use std::sync::Arc;
//!
//! let mut table = PropertyTable::new();
//! table.set("Model", PropertyValue::from("ST1000")).unwrap();
//!
//! let mut map = HookableMap::with_table(&table).unwrap();
//! let suffix = Arc::new(String::from("!"));
//! fn exclaim(suffix: &String, _key: &Symbol, value: PropertyValue) -> PropertyValue {
//!     match value {
//!         PropertyValue::String(s) => PropertyValue::String(format!("{s}{suffix}")),
//!         other => other,
//!     }
//! }
//! map.add_hook(&Symbol::from("Model"), &suffix, exclaim).unwrap();
//!
//! map.set("Model", PropertyValue::from("ST2000")).unwrap();
//! assert_eq!(map.get("Model"), Some(&PropertyValue::from("ST2000!")));
//! ```

#![warn(unreachable_pub)]

mod callback;
mod error;
mod hookable;
mod store;
mod symbol;
mod table;
mod value;

pub use callback::{Callback, SetCallback};
pub use error::{PropertyError, PropertyResult};
pub use hookable::{HookableMap, MapId};
pub use store::PropertyStore;
pub use symbol::Symbol;
pub use table::PropertyTable;
pub use value::PropertyValue;

#[doc(hidden)]
pub use tracing as __tracing;

/// Whether `dlog!` output is compiled in
#[inline]
#[must_use]
pub const fn debug_log_enabled() -> bool {
    cfg!(feature = "debug-log")
}

/// Debug-only trace line.
///
/// Forwards to `tracing::debug!` when the `debug-log` feature is enabled and
/// compiles to nothing observable otherwise.
#[macro_export]
macro_rules! dlog {
    ($($arg:tt)*) => {
        if $crate::debug_log_enabled() {
            $crate::__tracing::debug!($($arg)*);
        }
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
