//! RenameDisk Host Surface
//!
//! The capabilities the driver consumes from its host runtime, expressed as
//! traits, plus an in-memory host for tests.
//!
//! # Core Concepts
//!
//! - [`Service`]: Node in the service tree (provider chain, lifecycle, properties)
//! - [`MetaClass`] / [`ClassRegistry`]: Runtime class lookup and type checks
//! - [`PropertyAction`]: Exclusive access to a node's property store
//! - [`DriverBase`]: Default behaviour of the driver's superclass
//! - [`IoReturn`]: Integer status codes crossing the host boundary
//! - [`sim`]: In-memory host implementing all of the above

#![warn(unreachable_pub)]

mod action;
mod io_return;
mod meta;
mod service;

pub mod sim;

pub use action::PropertyAction;
pub use io_return::IoReturn;
pub use meta::{ClassRegistry, MetaClass};
pub use service::{DriverBase, Service, ServiceId, ServiceRef};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
