//! Subscriber registration errors

use thiserror::Error;

/// Errors raised while adapting a subscriber into listeners.
///
/// These are configuration errors: they surface at registration time and
/// nothing from the failing subscriber is registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriberError {
    /// Descriptor names a method the subscriber's method table lacks
    #[error("Method {method} does not exist on subscriber {subscriber} (subscribed to {event})")]
    MissingMethod {
        /// Concrete subscriber type name
        subscriber: &'static str,
        /// Method identifier from the descriptor
        method: String,
        /// Event the method was subscribed to
        event: String,
    },
}

/// Specialized Result type for subscriber registration
pub type SubscriberResult<T> = Result<T, SubscriberError>;

impl SubscriberError {
    /// Create a missing method error
    pub fn missing_method(
        subscriber: &'static str,
        method: impl Into<String>,
        event: impl Into<String>,
    ) -> Self {
        Self::MissingMethod {
            subscriber,
            method: method.into(),
            event: event.into(),
        }
    }
}
