//! Driver state machine
//!
//! ```text
//! Unattached -> Probed -> Installed -> Uninstalled
//! Probed      -> Probed | Uninstalled
//! Uninstalled -> Installed | Probed
//! ```
//!
//! The host drives the lifecycle; this machine only records what the host
//! asked for and flags sequences that should never happen.

use crate::error::LifecycleError;

/// Where the driver is in its probe/start/stop lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpliceState {
    /// Constructed, not yet probed
    #[default]
    Unattached,
    /// Probe ran
    Probed,
    /// Start ran (splice attempted or skipped)
    Installed,
    /// Stop ran
    Uninstalled,
}

/// Validates a state transition.
///
/// Illegal transitions are returned as an error so the caller can log them
/// and carry on. With the `strict-debug` feature they panic instead.
///
/// # Errors
/// `IllegalTransition` if `to` is not reachable from `from`
pub fn validate_transition(from: SpliceState, to: SpliceState) -> Result<(), LifecycleError> {
    if allowed(from, to) {
        Ok(())
    } else {
        #[cfg(feature = "strict-debug")]
        panic!("Illegal driver state transition attempted: {from:?} -> {to:?}");

        #[cfg(not(feature = "strict-debug"))]
        Err(LifecycleError::IllegalTransition { from, to })
    }
}

/// States reachable in one step from `from`
#[must_use]
pub fn allowed_transitions(from: SpliceState) -> Vec<SpliceState> {
    use SpliceState::{Installed, Probed, Uninstalled, Unattached};
    match from {
        Unattached => vec![Probed],
        Probed => vec![Probed, Installed, Uninstalled],
        Installed => vec![Uninstalled],
        Uninstalled => vec![Installed, Probed],
    }
}

fn allowed(from: SpliceState, to: SpliceState) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}
