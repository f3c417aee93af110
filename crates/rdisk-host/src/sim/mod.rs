//! In-memory host
//!
//! A small service tree with real lifecycle bookkeeping, used to drive the
//! splice protocol end to end without a kernel. Every start/stop/close/
//! terminate is recorded so tests can assert on ordering.

mod driver_base;
mod events;
mod node;
mod plane;

pub use driver_base::{BaseCall, SimDriverBase};
pub use events::{EventRecorder, LifecycleEvent, SimEvent};
pub use node::{SimService, StartHook};
pub use plane::{SimError, SimPlane, ROOT_CLASS};
