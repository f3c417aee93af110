//! Callback - a set hook together with its captured context

use crate::symbol::Symbol;
use crate::value::PropertyValue;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Plain-function hook signature
///
/// Receives the context it was registered with, the key being set and the
/// proposed value. Whatever it returns is what gets stored; returning the
/// proposed value unchanged is a pass-through.
pub type SetCallback<C> = fn(&C, &Symbol, PropertyValue) -> PropertyValue;

type HookFn = dyn Fn(&Symbol, PropertyValue) -> PropertyValue + Send + Sync;

/// Set hook stored in a [`HookableMap`](crate::HookableMap) side-table
///
/// Cloning is cheap and shares the same function and context; the context is
/// released once the last clone is dropped.
#[derive(Clone)]
pub struct Callback {
    inner: Arc<HookFn>,
}

impl Callback {
    /// Bind a plain function to a context
    ///
    /// The callback keeps one strong reference to `context` for as long as it
    /// lives.
    #[must_use]
    pub fn with_func<C>(f: SetCallback<C>, context: &Arc<C>) -> Self
    where
        C: Send + Sync + 'static,
    {
        let context = Arc::clone(context);
        Self {
            inner: Arc::new(move |key: &Symbol, value: PropertyValue| f(&context, key, value)),
        }
    }

    /// Wrap a closure that carries its own context
    #[must_use]
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Symbol, PropertyValue) -> PropertyValue + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Run the hook and return its result verbatim
    #[inline]
    pub fn invoke(&self, key: &Symbol, value: PropertyValue) -> PropertyValue {
        (self.inner)(key, value)
    }
}

impl Debug for Callback {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("holders", &Arc::strong_count(&self.inner))
            .finish()
    }
}
