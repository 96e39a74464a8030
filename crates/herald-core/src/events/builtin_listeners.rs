//! Built-in listeners for common dispatch patterns.
//!
//! # Available Listeners
//!
//! - [`LoggingListener`]: Logs every event it sees
//! - [`TimingStartListener`] / [`TimingReportListener`]: Measure how long the
//!   listeners between them take
//! - [`FilterListener`]: Stops propagation when a predicate matches
//! - [`CountingListener`]: Counts invocations
//!
//! # Example
//!
//! ```rust,ignore
//! let dispatcher = EventDispatcher::new();
//!
//! // Wrap everything registered for "order.created"
//! install_timing(&dispatcher, "order.created");
//! dispatcher.add_listener(
//!     "order.created",
//!     Arc::new(LoggingListener::new()),
//!     LOGGING_PRIORITY,
//! );
//! ```

use super::dispatcher::Dispatcher;
use super::event::Event;
use super::listener::Listener;
use chrono::Utc;
use serde_json::json;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

/// Priority that runs timing start before ordinary listeners.
pub const TIMING_START_PRIORITY: i32 = 1000;

/// Priority for request logging, right after timing start.
pub const LOGGING_PRIORITY: i32 = 900;

/// Priority that runs timing report after ordinary listeners.
pub const TIMING_REPORT_PRIORITY: i32 = -1000;

/// Argument key holding the timing start, in microseconds since the epoch.
pub const TIMING_START_KEY: &str = "_timing_start";

// ============================================================================
// LoggingListener - Logs all events
// ============================================================================

/// Listener that logs every event passing through it.
pub struct LoggingListener {
    name: String,
}

impl Default for LoggingListener {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingListener {
    pub fn new() -> Self {
        Self {
            name: "builtin:logging".to_string(),
        }
    }

    /// Set a custom name for this listener.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Listener for LoggingListener {
    fn handle(&self, event: &mut dyn Event) -> bool {
        tracing::info!(
            event = %event.name(),
            listener = %self.name,
            arguments = event.arguments().len(),
            "Event occurred"
        );
        true
    }
}

// ============================================================================
// Timing - Measures listener time between start and report
// ============================================================================

/// Stores the current time under [`TIMING_START_KEY`].
#[derive(Debug, Default)]
pub struct TimingStartListener;

impl Listener for TimingStartListener {
    fn handle(&self, event: &mut dyn Event) -> bool {
        event
            .arguments_mut()
            .insert(TIMING_START_KEY.to_string(), json!(Utc::now().timestamp_micros()));
        true
    }
}

/// Reads [`TIMING_START_KEY`], logs the elapsed time and removes the key.
///
/// The last measurement is kept and can be read through
/// [`TimingReportListener::last_elapsed_micros`].
#[derive(Debug)]
pub struct TimingReportListener {
    last_elapsed_micros: Arc<AtomicI64>,
}

impl Default for TimingReportListener {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingReportListener {
    pub fn new() -> Self {
        Self {
            last_elapsed_micros: Arc::new(AtomicI64::new(-1)),
        }
    }

    /// Elapsed microseconds of the last timed dispatch, `None` before the
    /// first one.
    pub fn last_elapsed_micros(&self) -> Option<i64> {
        let elapsed = self.last_elapsed_micros.load(Ordering::Relaxed);
        (elapsed >= 0).then_some(elapsed)
    }
}

impl Listener for TimingReportListener {
    fn handle(&self, event: &mut dyn Event) -> bool {
        let Some(started) = event
            .arguments_mut()
            .remove(TIMING_START_KEY)
            .and_then(|value| value.as_i64())
        else {
            tracing::debug!(event = %event.name(), "No timing start recorded");
            return false;
        };

        let elapsed = (Utc::now().timestamp_micros() - started).max(0);
        self.last_elapsed_micros.store(elapsed, Ordering::Relaxed);
        tracing::info!(event = %event.name(), elapsed_us = elapsed, "Event processed");
        true
    }
}

/// Register timing start and report around every other listener of
/// `event_name`. Returns the report listener for reading measurements.
pub fn install_timing<D>(dispatcher: &D, event_name: &str) -> Arc<TimingReportListener>
where
    D: Dispatcher + ?Sized,
{
    let report = Arc::new(TimingReportListener::new());
    dispatcher.add_listener(event_name, Arc::new(TimingStartListener), TIMING_START_PRIORITY);
    dispatcher.add_listener(event_name, report.clone(), TIMING_REPORT_PRIORITY);
    report
}

// ============================================================================
// FilterListener - Conditionally stops propagation
// ============================================================================

/// Listener that stops propagation when its predicate returns `true`.
///
/// ```rust,ignore
/// let guard = FilterListener::new("security:block_bots", |event| {
///     event.arguments().get("user_agent") == Some(&json!("bot"))
/// });
/// dispatcher.add_listener("user.created", Arc::new(guard), 500);
/// ```
pub struct FilterListener<F>
where
    F: Fn(&dyn Event) -> bool + Send + Sync,
{
    name: String,
    should_stop: F,
}

impl<F> FilterListener<F>
where
    F: Fn(&dyn Event) -> bool + Send + Sync,
{
    pub fn new(name: impl Into<String>, should_stop: F) -> Self {
        Self {
            name: name.into(),
            should_stop,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<F> Listener for FilterListener<F>
where
    F: Fn(&dyn Event) -> bool + Send + Sync,
{
    fn handle(&self, event: &mut dyn Event) -> bool {
        if (self.should_stop)(&*event) {
            tracing::info!(
                listener = %self.name,
                event = %event.name(),
                "Event stopped by filter"
            );
            event.stop_propagation();
        }
        true
    }
}

// ============================================================================
// CountingListener - Counts invocations
// ============================================================================

/// Listener that counts how many events it has seen.
#[derive(Debug, Default)]
pub struct CountingListener {
    total_events: Arc<AtomicU64>,
}

impl CountingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_events(&self) -> u64 {
        self.total_events.load(Ordering::Relaxed)
    }

    /// Get a clone of the counter for external monitoring.
    pub fn counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.total_events)
    }
}

impl Listener for CountingListener {
    fn handle(&self, _event: &mut dyn Event) -> bool {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        true
    }
}
