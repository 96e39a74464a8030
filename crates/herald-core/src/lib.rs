//! Synchronous in-process event bus.
//!
//! Listeners register for named events at a priority; an
//! [`EventDispatcher`] delivers dispatched events to them in priority order
//! and stops as soon as a listener stops propagation. Subscribers declare
//! their subscriptions once and are adapted into ordinary listeners.
//!
//! See [`events`] for the full tour.

pub mod config;
pub mod events;
pub mod logging;
pub mod test_support;

pub use config::{ConfigError, ConfigResult, DispatcherConfig, FaultPolicy, HeraldConfig, LoggingConfig};
pub use events::{
    listener_fn, register_listener, register_subscriber, BaseEvent, Dispatcher, Event,
    EventDispatcher, Listener, SharedListener, Subscriber, SubscriberConfig, SubscriberError,
    SubscriberMethods,
};
pub use logging::{init_logging, LoggingError};
