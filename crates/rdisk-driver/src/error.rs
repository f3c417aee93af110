//! Error types for the driver
//!
//! Every error degrades to default driver behaviour or maps to an
//! [`IoReturn`] at the host boundary; none of them propagate past it.

use crate::lifecycle::SpliceState;
use rdisk_host::IoReturn;
use rdisk_props::PropertyError;

/// Target lookup failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    /// Target class is not loaded in the runtime
    #[error("class not loaded: {0}")]
    ClassNotLoaded(String),

    /// No node of the target class between this node and the root
    #[error("target ({0}) not found")]
    NotFound(String),
}

/// Splice (hook/unhook) failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpliceError {
    /// Replacement table or hook could not be allocated
    #[error("out of memory while splicing property table")]
    NoMemory,

    /// Unhook requested but the store is a plain table
    #[error("property table of {service} is not hooked")]
    NotHooked {
        /// Name of the target node
        service: String,
    },

    /// Target has no provider to stop and restart it with
    #[error("{service} has no provider")]
    Detached {
        /// Name of the target node
        service: String,
    },

    /// Hooked key is empty, so no hook can be registered
    #[error("hooked key is empty")]
    InvalidKey,
}

impl SpliceError {
    /// Status code reported to the host
    #[must_use]
    pub fn io_return(&self) -> IoReturn {
        match self {
            Self::NoMemory => IoReturn::NoMemory,
            Self::InvalidKey | Self::NotHooked { .. } | Self::Detached { .. } => {
                IoReturn::InternalError
            }
        }
    }
}

impl From<PropertyError> for SpliceError {
    fn from(err: PropertyError) -> Self {
        match err {
            PropertyError::NoMemory => Self::NoMemory,
            PropertyError::MissingKey => Self::InvalidKey,
        }
    }
}

/// Driver lifecycle bookkeeping failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// Transition not permitted by the driver state machine
    #[error("illegal transition {from:?} -> {to:?}")]
    IllegalTransition {
        /// State before
        from: SpliceState,
        /// Requested state
        to: SpliceState,
    },
}
