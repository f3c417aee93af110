use parking_lot::Mutex;

/// Lifecycle call observed on a simulated service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// `start` succeeded
    Started,

    /// `start` was refused (node already terminated)
    StartRefused,

    /// `stop` ran
    Stopped,

    /// A client's open handle was closed
    Closed {
        /// Name of the client whose handle was closed
        client: String,
    },

    /// `terminate` ran
    Terminated,
}

/// One recorded lifecycle call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimEvent {
    /// Name of the service the call was made on
    pub service: String,
    /// What happened
    pub event: LifecycleEvent,
}

impl SimEvent {
    /// Build an event
    #[must_use]
    pub fn new(service: impl Into<String>, event: LifecycleEvent) -> Self {
        Self {
            service: service.into(),
            event,
        }
    }
}

/// Append-only log of lifecycle calls across a whole plane
#[derive(Debug, Default)]
pub struct EventRecorder {
    inner: Mutex<Vec<SimEvent>>,
}

impl EventRecorder {
    /// Append an event
    pub fn record(&self, event: SimEvent) {
        tracing::trace!("sim: {} {:?}", event.service, event.event);
        self.inner.lock().push(event);
    }

    /// Snapshot of every event so far
    #[must_use]
    pub fn events(&self) -> Vec<SimEvent> {
        self.inner.lock().clone()
    }

    /// Events recorded for one service
    #[must_use]
    pub fn for_service(&self, service: &str) -> Vec<LifecycleEvent> {
        self.inner
            .lock()
            .iter()
            .filter(|e| e.service == service)
            .map(|e| e.event.clone())
            .collect()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order_and_filters() {
        let recorder = EventRecorder::default();
        recorder.record(SimEvent::new("a", LifecycleEvent::Stopped));
        recorder.record(SimEvent::new("b", LifecycleEvent::Terminated));
        recorder.record(SimEvent::new("a", LifecycleEvent::Started));

        assert_eq!(recorder.events().len(), 3);
        assert_eq!(
            recorder.for_service("a"),
            vec![LifecycleEvent::Stopped, LifecycleEvent::Started]
        );

        recorder.clear();
        assert!(recorder.events().is_empty());
    }
}
