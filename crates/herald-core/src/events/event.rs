//! Event types passed through the dispatcher.
//!
//! Every event carries three things:
//!
//! - a name, fixed at construction, used to look up listeners
//! - an argument bag shared by all listeners of one dispatch
//! - a one-way propagation-stop flag
//!
//! [`BaseEvent`] holds that state. Domain events embed a `BaseEvent` and
//! implement [`Event`] by exposing it:
//!
//! ```rust
//! use herald_core::events::{BaseEvent, Event};
//! use std::any::Any;
//!
//! struct OrderCreated {
//!     base: BaseEvent,
//!     order_id: String,
//! }
//!
//! impl Event for OrderCreated {
//!     fn base(&self) -> &BaseEvent {
//!         &self.base
//!     }
//!
//!     fn base_mut(&mut self) -> &mut BaseEvent {
//!         &mut self.base
//!     }
//!
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//!
//!     fn as_any_mut(&mut self) -> &mut dyn Any {
//!         self
//!     }
//! }
//!
//! let event = OrderCreated {
//!     base: BaseEvent::new("order.created"),
//!     order_id: "ORD-1".into(),
//! };
//! let dynamic: &dyn Event = &event;
//! assert_eq!(dynamic.name(), "order.created");
//! assert_eq!(dynamic.downcast_ref::<OrderCreated>().unwrap().order_id, "ORD-1");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;

/// Argument bag carried by an event.
pub type Arguments = HashMap<String, Value>;

/// An event that can be dispatched to listeners.
///
/// Implementors only supply access to their [`BaseEvent`] plus `Any`
/// upcasts; name, arguments and propagation state are provided.
///
/// Do not override the provided accessors. [`BaseEvent`] is the only source
/// of the name and the propagation flag, and the dispatcher reads both
/// through [`Event::base`].
pub trait Event: Any {
    /// Shared event state.
    fn base(&self) -> &BaseEvent;

    /// Mutable shared event state.
    fn base_mut(&mut self) -> &mut BaseEvent;

    /// Upcast for downcasting to the concrete event type.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete event type.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Name the event is dispatched under. Fixed at construction.
    fn name(&self) -> &str {
        self.base().name()
    }

    /// The live argument bag.
    fn arguments(&self) -> &Arguments {
        self.base().arguments()
    }

    /// The live argument bag, for writing.
    ///
    /// Values written here are visible to every later listener of the same
    /// dispatch and to the dispatch caller afterwards.
    fn arguments_mut(&mut self) -> &mut Arguments {
        self.base_mut().arguments_mut()
    }

    /// Stop delivery to the remaining listeners of the current dispatch.
    fn stop_propagation(&mut self) {
        self.base_mut().stop_propagation();
    }

    /// Whether propagation has been stopped. Never reverts to `false`.
    fn is_propagation_stopped(&self) -> bool {
        self.base().is_propagation_stopped()
    }
}

impl dyn Event {
    /// Downcast to a concrete event type.
    pub fn downcast_ref<T: Event>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutably downcast to a concrete event type.
    pub fn downcast_mut<T: Event>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Check whether this event is of type `T`.
    pub fn is<T: Event>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Plain named event with an argument bag.
///
/// The name is private and has no setter. The propagation flag only moves
/// from `false` to `true`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseEvent {
    name: String,
    #[serde(default)]
    arguments: Arguments,
    #[serde(default)]
    propagation_stopped: bool,
}

impl BaseEvent {
    /// Create an event with an empty argument bag.
    ///
    /// An empty name is accepted; it is dispatched like any other name.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_arguments(name, Arguments::new())
    }

    /// Create an event with initial arguments.
    pub fn with_arguments(name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            name: name.into(),
            arguments,
            propagation_stopped: false,
        }
    }

    /// Builder-style helper to add one argument.
    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    pub fn arguments_mut(&mut self) -> &mut Arguments {
        &mut self.arguments
    }

    /// Get a single argument.
    pub fn argument(&self, key: &str) -> Option<&Value> {
        self.arguments.get(key)
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Consume the event and return its arguments.
    pub fn into_arguments(self) -> Arguments {
        self.arguments
    }
}

impl Event for BaseEvent {
    fn base(&self) -> &BaseEvent {
        self
    }

    fn base_mut(&mut self) -> &mut BaseEvent {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
