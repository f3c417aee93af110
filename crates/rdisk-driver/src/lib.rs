//! RenameDisk Driver
//!
//! Makes a generic AHCI disk report an Apple SSD model by hooking the
//! `Model` property of its storage driver node.
//!
//! # Core Concepts
//!
//! - [`DriverConfig`]: Target class, hooked key and prefix
//! - [`ModelRewriter`]: The hook itself, `"ST1000"` becomes `"APPLE SSD (ST1000)"`
//! - [`TargetLocator`]: Finds the node to hook along the provider chain
//! - [`SpliceController`]: Swaps a hookable table into a live node and back
//! - [`RenameDiskDriver`]: The probe/start/stop entry points
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rdisk_driver::prelude::*;
//!
//! let driver = RenameDiskDriver::new(this, base, classes, DriverConfig::new());
//! if driver.probe(&provider, &mut score) {
//!     // Always false once the splice ran; the host rebuilds the stack
//!     let _ = driver.start(&provider);
//! }
//! ```

#![warn(unreachable_pub)]

mod config;
mod driver;
mod error;
mod locator;
mod rewriter;
mod splice;

pub mod lifecycle;

pub use config::{DriverConfig, DEFAULT_HOOKED_KEY, DEFAULT_PREFIX, DEFAULT_TARGET_CLASS};
pub use driver::RenameDiskDriver;
pub use error::{LifecycleError, LocateError, SpliceError};
pub use lifecycle::SpliceState;
pub use locator::TargetLocator;
pub use rewriter::{fix_model, ModelRewriter};
pub use splice::{SpliceController, SpliceReport};

/// Common imports
pub mod prelude {
    pub use crate::{
        DriverConfig, LocateError, ModelRewriter, RenameDiskDriver, SpliceController,
        SpliceError, SpliceReport, SpliceState, TargetLocator,
    };
    pub use rdisk_host::{ClassRegistry, DriverBase, IoReturn, Service, ServiceRef};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Check if running with strict debugging enabled
#[must_use]
pub const fn strict_debug() -> bool {
    cfg!(feature = "strict-debug")
}
