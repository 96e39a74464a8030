//! Event dispatcher.
//!
//! [`EventDispatcher`] owns a [`ListenerRegistry`] behind a
//! `parking_lot::RwLock`. Registration and removal take the write lock for
//! the whole mutation including the re-sort. Dispatch takes the read lock
//! only to clone the event's sorted sequence, then releases it before the
//! first listener runs, so listeners may register, remove or dispatch
//! re-entrantly.
//!
//! The event name and propagation flag are always read through
//! [`Event::base`], never through overridable accessors.
//!
//! # Example
//!
//! ```rust
//! use herald_core::events::{listener_fn, BaseEvent, Dispatcher, Event, EventDispatcher};
//!
//! let dispatcher = EventDispatcher::new();
//! dispatcher.add_listener("user.created", listener_fn(|event| {
//!     event.arguments_mut().insert("welcomed".into(), true.into());
//!     true
//! }), 10);
//!
//! let event = dispatcher.dispatch(BaseEvent::new("user.created"));
//! assert_eq!(event.argument("welcomed"), Some(&serde_json::json!(true)));
//! ```

use super::event::Event;
use super::listener::{ListenerEntry, SharedListener, DEFAULT_PRIORITY};
use super::registry::ListenerRegistry;
use crate::config::{DispatcherConfig, FaultPolicy};
use parking_lot::RwLock;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Registration, lookup and ordered delivery of events.
///
/// Object safe apart from the generic [`Dispatcher::dispatch`] convenience,
/// so `&dyn Dispatcher` can be handed to subscribers.
pub trait Dispatcher: Send + Sync {
    /// Register `listener` for `event_name` at `priority`.
    ///
    /// Higher priorities run first; equal priorities run in registration
    /// order. The same listener may be registered any number of times.
    fn add_listener(&self, event_name: &str, listener: SharedListener, priority: i32);

    /// Whether `listener` is registered for `event_name`.
    fn has_listener(&self, event_name: &str, listener: &SharedListener) -> bool;

    /// Remove every registration of `listener` for `event_name`.
    ///
    /// Removing a listener that is not registered is a no-op.
    fn remove_listener(&self, event_name: &str, listener: &SharedListener);

    /// Deliver `event` to the listeners registered under its name.
    fn dispatch_in_place(&self, event: &mut dyn Event);

    /// Register `listener` at [`DEFAULT_PRIORITY`].
    fn listen(&self, event_name: &str, listener: SharedListener) {
        self.add_listener(event_name, listener, DEFAULT_PRIORITY);
    }

    /// Deliver `event` and hand it back for inspection.
    fn dispatch<E: Event>(&self, mut event: E) -> E
    where
        Self: Sized,
    {
        self.dispatch_in_place(&mut event);
        event
    }
}

/// Default thread-safe [`Dispatcher`].
#[derive(Debug, Default)]
pub struct EventDispatcher {
    registry: RwLock<ListenerRegistry>,
    config: DispatcherConfig,
}

impl EventDispatcher {
    /// Create a dispatcher with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DispatcherConfig) -> Self {
        Self {
            registry: RwLock::new(ListenerRegistry::new()),
            config,
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Registered entries for `event_name` in delivery order.
    pub fn listeners(&self, event_name: &str) -> Vec<ListenerEntry> {
        self.registry
            .read()
            .snapshot(event_name)
            .map(|entries| entries.to_vec())
            .unwrap_or_default()
    }

    pub fn has_listeners(&self, event_name: &str) -> bool {
        self.listener_count(event_name) > 0
    }

    pub fn listener_count(&self, event_name: &str) -> usize {
        self.registry.read().len(event_name)
    }

    /// Names with at least one listener, sorted.
    pub fn event_names(&self) -> Vec<String> {
        self.registry.read().event_names()
    }

    /// Remove every listener registered for `event_name`.
    pub fn clear_listeners(&self, event_name: &str) {
        let removed = self.registry.write().clear_event(event_name);
        tracing::trace!(event = %event_name, removed, "Listeners cleared");
    }

    fn invoke(&self, entry: &ListenerEntry, event: &mut dyn Event) -> bool {
        match self.config.fault_policy {
            FaultPolicy::Propagate => entry.listener().handle(event),
            FaultPolicy::Isolate => {
                match panic::catch_unwind(AssertUnwindSafe(|| entry.listener().handle(event))) {
                    Ok(handled) => handled,
                    Err(payload) => {
                        tracing::error!(
                            event = %event.base().name(),
                            priority = entry.priority(),
                            panic = %panic_message(payload.as_ref()),
                            "Listener panicked"
                        );
                        false
                    }
                }
            }
        }
    }

    fn deliver(&self, event: &mut dyn Event) {
        let snapshot = {
            let registry = self.registry.read();
            registry.snapshot(event.base().name())
        };

        let Some(entries) = snapshot else {
            tracing::trace!(event = %event.base().name(), "No listeners");
            return;
        };

        let mut invoked = 0usize;
        let mut failed = 0usize;
        for entry in entries.iter() {
            tracing::trace!(event = %event.base().name(), priority = entry.priority(), "Invoking listener");
            invoked += 1;

            if !self.invoke(entry, event) {
                failed += 1;
                tracing::debug!(
                    event = %event.base().name(),
                    priority = entry.priority(),
                    "Listener reported failure"
                );
            }

            if event.base().is_propagation_stopped() {
                tracing::debug!(
                    event = %event.base().name(),
                    priority = entry.priority(),
                    skipped = entries.len() - invoked,
                    "Propagation stopped"
                );
                break;
            }
        }

        tracing::debug!(
            event = %event.base().name(),
            listeners = entries.len(),
            invoked,
            failed,
            "Event dispatched"
        );
    }
}

impl Dispatcher for EventDispatcher {
    fn add_listener(&self, event_name: &str, listener: SharedListener, priority: i32) {
        self.registry
            .write()
            .insert(event_name, ListenerEntry::new(listener, priority));
        tracing::trace!(event = %event_name, priority, "Listener added");
    }

    fn has_listener(&self, event_name: &str, listener: &SharedListener) -> bool {
        self.registry.read().contains(event_name, listener)
    }

    fn remove_listener(&self, event_name: &str, listener: &SharedListener) {
        let removed = self.registry.write().remove(event_name, listener);
        tracing::trace!(event = %event_name, removed, "Listener removed");
    }

    fn dispatch_in_place(&self, event: &mut dyn Event) {
        if self.config.trace_dispatch {
            let span = tracing::debug_span!("herald.dispatch", event = %event.base().name());
            let _guard = span.enter();
            self.deliver(event);
        } else {
            self.deliver(event);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
