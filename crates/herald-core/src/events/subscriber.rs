//! Subscriber adaptation.
//!
//! A subscriber declares which events it handles, through which method and
//! at what priority. [`register_subscriber`] turns each declared
//! (event, method, priority) triple into an ordinary listener on a
//! [`Dispatcher`]; the dispatcher never learns it came from a subscriber.
//!
//! Methods are resolved through an explicit [`MethodTable`] built by the
//! subscriber type, not by name lookup at call time. A descriptor that names
//! a method missing from the table fails registration with
//! [`SubscriberError::MissingMethod`] before anything is registered.
//!
//! ```rust
//! use herald_core::events::{
//!     register_subscriber, BaseEvent, Dispatcher, Event, EventDispatcher, MethodTable,
//!     SubscribedEvents, Subscriber, SubscriberConfig, SubscriberMethods,
//! };
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct WelcomeMailer {
//!     sent: AtomicUsize,
//! }
//!
//! impl WelcomeMailer {
//!     fn on_user_created(&self, _event: &mut dyn Event) {
//!         self.sent.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! impl Subscriber for WelcomeMailer {
//!     fn subscribed_events(&self) -> SubscribedEvents {
//!         SubscribedEvents::from([(
//!             "user.created".to_string(),
//!             vec![SubscriberConfig::new("on_user_created", 5)],
//!         )])
//!     }
//! }
//!
//! impl SubscriberMethods for WelcomeMailer {
//!     fn methods() -> MethodTable<Self> {
//!         MethodTable::new().method("on_user_created", Self::on_user_created)
//!     }
//! }
//!
//! let dispatcher = EventDispatcher::new();
//! let mailer = Arc::new(WelcomeMailer::default());
//! register_subscriber(&dispatcher, Arc::clone(&mailer)).unwrap();
//!
//! dispatcher.dispatch(BaseEvent::new("user.created"));
//! assert_eq!(mailer.sent.load(Ordering::SeqCst), 1);
//! ```

use super::dispatcher::Dispatcher;
use super::error::{SubscriberError, SubscriberResult};
use super::event::Event;
use super::listener::{Listener, SharedListener};
use serde::{Deserialize, Serialize};
use std::any::type_name;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// One (method, priority) subscription for an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberConfig {
    /// Method identifier resolved through the subscriber's [`MethodTable`]
    pub method: String,

    /// Listener priority
    #[serde(default)]
    pub priority: i32,
}

impl SubscriberConfig {
    pub fn new(method: impl Into<String>, priority: i32) -> Self {
        Self {
            method: method.into(),
            priority,
        }
    }
}

/// Event name to subscriptions, registered in key order.
pub type SubscribedEvents = BTreeMap<String, Vec<SubscriberConfig>>;

/// Declares the events a type subscribes to.
pub trait Subscriber {
    fn subscribed_events(&self) -> SubscribedEvents;
}

impl<F> Subscriber for F
where
    F: Fn() -> SubscribedEvents,
{
    fn subscribed_events(&self) -> SubscribedEvents {
        self()
    }
}

/// Return types accepted from subscriber methods.
///
/// `bool` is passed through; `()` counts as handled.
pub trait HandlerOutcome {
    fn into_handled(self) -> bool;
}

impl HandlerOutcome for bool {
    fn into_handled(self) -> bool {
        self
    }
}

impl HandlerOutcome for () {
    fn into_handled(self) -> bool {
        true
    }
}

type BoundMethod<S> = Arc<dyn Fn(&S, &mut dyn Event) -> bool + Send + Sync>;

/// Method identifiers of a subscriber type mapped to its handler functions.
pub struct MethodTable<S> {
    methods: HashMap<String, BoundMethod<S>>,
}

impl<S: 'static> MethodTable<S> {
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    /// Add a method under `name`.
    ///
    /// Accepts `fn(&S, &mut dyn Event) -> bool` and
    /// `fn(&S, &mut dyn Event)`, as well as closures of either shape.
    pub fn method<F, R>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&S, &mut dyn Event) -> R + Send + Sync + 'static,
        R: HandlerOutcome,
    {
        let bound: BoundMethod<S> =
            Arc::new(move |subscriber: &S, event: &mut dyn Event| f(subscriber, event).into_handled());
        self.methods.insert(name.into(), bound);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Method identifiers, sorted.
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn get(&self, name: &str) -> Option<&BoundMethod<S>> {
        self.methods.get(name)
    }
}

impl<S: 'static> Default for MethodTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for MethodTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodTable")
            .field("subscriber", &type_name::<S>())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Subscribers whose methods can be resolved by identifier.
pub trait SubscriberMethods: Subscriber + Send + Sync + Sized + 'static {
    fn methods() -> MethodTable<Self>;
}

/// Listener calling one bound method on a shared subscriber.
struct MethodListener<S> {
    subscriber: Arc<S>,
    method: BoundMethod<S>,
}

impl<S: Send + Sync> Listener for MethodListener<S> {
    fn handle(&self, event: &mut dyn Event) -> bool {
        (self.method)(&self.subscriber, event)
    }
}

/// A listener created by [`register_subscriber`].
#[derive(Clone)]
pub struct Registration {
    pub event_name: String,
    pub method: String,
    pub priority: i32,
    pub listener: SharedListener,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("event_name", &self.event_name)
            .field("method", &self.method)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Register every subscription of `subscriber` on `dispatcher`.
///
/// Each (event, method, priority) triple becomes its own listener. All
/// methods are resolved before the first registration, so a missing method
/// leaves the dispatcher untouched.
pub fn register_subscriber<D, S>(dispatcher: &D, subscriber: Arc<S>) -> SubscriberResult<Vec<Registration>>
where
    D: Dispatcher + ?Sized,
    S: SubscriberMethods,
{
    let subscribed = subscriber.subscribed_events();
    let table = S::methods();

    let mut resolved = Vec::new();
    for (event_name, configs) in &subscribed {
        for config in configs {
            let method = table.get(&config.method).ok_or_else(|| {
                SubscriberError::missing_method(type_name::<S>(), &config.method, event_name)
            })?;
            resolved.push((event_name, config, Arc::clone(method)));
        }
    }

    let mut registrations = Vec::with_capacity(resolved.len());
    for (event_name, config, method) in resolved {
        let listener: SharedListener = Arc::new(MethodListener {
            subscriber: Arc::clone(&subscriber),
            method,
        });
        dispatcher.add_listener(event_name, Arc::clone(&listener), config.priority);

        registrations.push(Registration {
            event_name: event_name.clone(),
            method: config.method.clone(),
            priority: config.priority,
            listener,
        });
    }

    tracing::debug!(
        subscriber = type_name::<S>(),
        registrations = registrations.len(),
        "Subscriber registered"
    );
    Ok(registrations)
}

/// Register a prebuilt `handler` wherever `subscriber` subscribes `method`.
///
/// The subscriber's descriptor only supplies event names and priorities.
/// The same `handler` is registered for every match, so one
/// `remove_listener` per event removes it again. Returns the number of
/// registrations made.
pub fn register_listener<D, S>(
    dispatcher: &D,
    subscriber: &S,
    method: &str,
    handler: SharedListener,
) -> usize
where
    D: Dispatcher + ?Sized,
    S: Subscriber + ?Sized,
{
    let mut count = 0;
    for (event_name, configs) in subscriber.subscribed_events() {
        for config in configs.iter().filter(|config| config.method == method) {
            dispatcher.add_listener(&event_name, Arc::clone(&handler), config.priority);
            count += 1;
        }
    }

    tracing::trace!(method, registrations = count, "Handler registered from descriptor");
    count
}

/// Remove listeners created by [`register_subscriber`].
pub fn unregister<D>(dispatcher: &D, registrations: &[Registration])
where
    D: Dispatcher + ?Sized,
{
    for registration in registrations {
        dispatcher.remove_listener(&registration.event_name, &registration.listener);
    }
}
