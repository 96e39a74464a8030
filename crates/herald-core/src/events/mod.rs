//! Event system for herald.
//!
//! Synchronous, in-process publish/subscribe: listeners register for an
//! event name at a priority, and a dispatcher delivers each dispatched event
//! to them in priority order until one stops propagation.
//!
//! # Architecture
//!
//! ```text
//! EventDispatcher
//!    │
//!    ├── ListenerRegistry   (event name → sorted entries, behind RwLock)
//!    │
//!    ├── closures / Listener impls      (add_listener)
//!    └── subscribers via MethodTable    (register_subscriber)
//!
//! dispatch(event): snapshot entries → release lock → invoke in order
//!                  → stop as soon as event.is_propagation_stopped()
//! ```
//!
//! # Key Components
//!
//! - [`Event`] / [`BaseEvent`]: named event, argument bag, stop flag
//! - [`Listener`]: handles one event, reports success
//! - [`Dispatcher`] / [`EventDispatcher`]: registry and ordered delivery
//! - [`Subscriber`] / [`SubscriberMethods`]: declarative subscriptions
//!
//! # Ordering
//!
//! Higher priority runs first. Equal priorities run in registration order.
//! A listener registered twice runs twice, once in each slot.
//!
//! # Listener Results
//!
//! `Listener::handle` returns `bool`, but `false` only gets logged. The only
//! way to end a dispatch early is `Event::stop_propagation`.
//!
//! # Example
//!
//! ```rust
//! use herald_core::events::{listener_fn, BaseEvent, Dispatcher, Event, EventDispatcher};
//!
//! let dispatcher = EventDispatcher::new();
//! dispatcher.add_listener("user.created", listener_fn(|event| {
//!     event.stop_propagation();
//!     true
//! }), 100);
//! dispatcher.add_listener("user.created", listener_fn(|_| unreachable!()), 50);
//!
//! let event = dispatcher.dispatch(BaseEvent::new("user.created"));
//! assert!(event.is_propagation_stopped());
//! ```

pub mod builtin_listeners;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod listener;
pub mod registry;
pub mod subscriber;

pub use builtin_listeners::{
    install_timing, CountingListener, FilterListener, LoggingListener, TimingReportListener,
    TimingStartListener, LOGGING_PRIORITY, TIMING_REPORT_PRIORITY, TIMING_START_KEY,
    TIMING_START_PRIORITY,
};
pub use dispatcher::{Dispatcher, EventDispatcher};
pub use error::{SubscriberError, SubscriberResult};
pub use event::{Arguments, BaseEvent, Event};
pub use listener::{listener_fn, same_listener, Listener, ListenerEntry, SharedListener, DEFAULT_PRIORITY};
pub use registry::{ListenerRegistry, ListenerSnapshot};
pub use subscriber::{
    register_listener, register_subscriber, unregister, HandlerOutcome, MethodTable,
    Registration, SubscribedEvents, Subscriber, SubscriberConfig, SubscriberMethods,
};
