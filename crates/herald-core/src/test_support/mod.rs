//! Test helpers shared by unit and integration tests.
//!
//! - [`CallLog`]: thread-safe ordered record of listener invocations
//! - [`RecordingListener`]: listener that appends its label to a `CallLog`
//! - [`TraceCapture`]: in-memory `tracing` layer for asserting on spans and events

pub mod recording;
pub mod traces;

pub use recording::{CallLog, RecordingListener};
pub use traces::{CapturedEvent, CapturedSpan, TraceCapture};
