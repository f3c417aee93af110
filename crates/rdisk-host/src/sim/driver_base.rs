use crate::service::{DriverBase, ServiceRef};
use parking_lot::Mutex;

/// Call made on [`SimDriverBase`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseCall {
    /// Default probe
    Probe,
    /// Default start
    Start,
    /// Default stop
    Stop,
}

/// Superclass behaviour with fixed answers
#[derive(Debug)]
pub struct SimDriverBase {
    eligible: bool,
    start_result: bool,
    calls: Mutex<Vec<BaseCall>>,
}

impl SimDriverBase {
    /// Base that accepts every provider and starts successfully
    #[must_use]
    pub fn new() -> Self {
        Self {
            eligible: true,
            start_result: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Override the default probe answer
    #[must_use]
    pub fn with_eligible(mut self, eligible: bool) -> Self {
        self.eligible = eligible;
        self
    }

    /// Override the default start answer
    #[must_use]
    pub fn with_start_result(mut self, start_result: bool) -> Self {
        self.start_result = start_result;
        self
    }

    /// Calls made so far
    #[must_use]
    pub fn calls(&self) -> Vec<BaseCall> {
        self.calls.lock().clone()
    }
}

impl Default for SimDriverBase {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverBase for SimDriverBase {
    fn probe(&self, _provider: &ServiceRef, _score: &mut i32) -> bool {
        self.calls.lock().push(BaseCall::Probe);
        self.eligible
    }

    fn start(&self, _provider: &ServiceRef) -> bool {
        self.calls.lock().push(BaseCall::Start);
        self.start_result
    }

    fn stop(&self, _provider: &ServiceRef) {
        self.calls.lock().push(BaseCall::Stop);
    }
}
