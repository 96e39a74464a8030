//! Recording listeners for asserting delivery order.
//!
//! ```rust
//! use herald_core::events::{BaseEvent, Dispatcher, EventDispatcher};
//! use herald_core::test_support::{CallLog, RecordingListener};
//!
//! let dispatcher = EventDispatcher::new();
//! let log = CallLog::new();
//! dispatcher.add_listener("e", RecordingListener::new("low", &log).shared(), 1);
//! dispatcher.add_listener("e", RecordingListener::new("high", &log).shared(), 9);
//!
//! dispatcher.dispatch(BaseEvent::new("e"));
//! assert_eq!(log.calls(), vec!["high", "low"]);
//! ```

use crate::events::{Event, Listener, SharedListener};
use parking_lot::Mutex;
use std::sync::Arc;

/// Ordered, shareable record of invocations.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, label: impl Into<String>) {
        self.calls.lock().push(label.into());
    }

    /// Labels recorded so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

/// Listener that records its label, optionally failing or stopping
/// propagation.
#[derive(Debug, Clone)]
pub struct RecordingListener {
    label: String,
    log: CallLog,
    result: bool,
    stop: bool,
}

impl RecordingListener {
    pub fn new(label: impl Into<String>, log: &CallLog) -> Self {
        Self {
            label: label.into(),
            log: log.clone(),
            result: true,
            stop: false,
        }
    }

    /// Stop propagation after recording.
    pub fn stopping(mut self) -> Self {
        self.stop = true;
        self
    }

    /// Report failure (`false`) after recording.
    pub fn failing(mut self) -> Self {
        self.result = false;
        self
    }

    pub fn shared(self) -> SharedListener {
        Arc::new(self)
    }
}

impl Listener for RecordingListener {
    fn handle(&self, event: &mut dyn Event) -> bool {
        self.log.record(self.label.clone());
        if self.stop {
            event.stop_propagation();
        }
        self.result
    }
}
