//! PropertyAction - exclusive access token for a node's property store

use rdisk_props::PropertyStore;
use std::mem;

/// Exclusive access to one node's property store
///
/// Only handed out by [`Service::run_property_action`](crate::Service::run_property_action),
/// which holds the node's property lock for as long as the token lives.
#[derive(Debug)]
pub struct PropertyAction<'a> {
    store: &'a mut PropertyStore,
}

impl<'a> PropertyAction<'a> {
    /// Wrap a store the caller already holds exclusively
    #[inline]
    #[must_use]
    pub fn new(store: &'a mut PropertyStore) -> Self {
        Self { store }
    }

    /// Current store
    #[inline]
    #[must_use]
    pub fn property_table(&self) -> &PropertyStore {
        &*self.store
    }

    /// Current store, mutably
    #[inline]
    pub fn property_table_mut(&mut self) -> &mut PropertyStore {
        &mut *self.store
    }

    /// Install `store` and hand back the previous one
    ///
    /// The new store is in place before the caller gets to drop the old one.
    #[must_use = "the previous store is returned so the caller controls when it is released"]
    pub fn set_property_table(&mut self, store: PropertyStore) -> PropertyStore {
        mem::replace(self.store, store)
    }
}
