//! Listener trait and registration entries.
//!
//! A listener handles one event and reports whether it handled it. The
//! result is informational: only the event's propagation flag changes the
//! course of a dispatch.
//!
//! Closures and functions with the signature
//! `Fn(&mut dyn Event) -> bool + Send + Sync` are listeners already, so no
//! wrapper type is needed:
//!
//! ```rust
//! use herald_core::events::{listener_fn, BaseEvent, Event, Listener};
//!
//! let listener = listener_fn(|event| {
//!     event.arguments_mut().insert("seen".into(), true.into());
//!     true
//! });
//!
//! let mut event = BaseEvent::new("user.created");
//! assert!(listener.handle(&mut event));
//! assert_eq!(event.argument("seen"), Some(&serde_json::json!(true)));
//! ```

use super::event::Event;
use std::fmt;
use std::sync::Arc;

/// Priority used when none is given.
pub const DEFAULT_PRIORITY: i32 = 0;

/// Something that can handle an event.
pub trait Listener: Send + Sync {
    /// Handle the event.
    ///
    /// Return `true` if the event was handled successfully, `false` if the
    /// listener failed. Returning `false` does not stop the dispatch.
    fn handle(&self, event: &mut dyn Event) -> bool;
}

impl<F> Listener for F
where
    F: Fn(&mut dyn Event) -> bool + Send + Sync,
{
    fn handle(&self, event: &mut dyn Event) -> bool {
        self(event)
    }
}

/// Listener handle stored by the dispatcher.
///
/// Identity is the allocation: clones of one `SharedListener` are the same
/// listener, two separately created listeners never are, even when built
/// from the same closure.
pub type SharedListener = Arc<dyn Listener>;

/// Wrap a closure or function into a [`SharedListener`].
pub fn listener_fn<F>(f: F) -> SharedListener
where
    F: Fn(&mut dyn Event) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Whether two listener handles refer to the same listener.
///
/// Only the data pointer is compared; vtable pointers of the same type may
/// differ between codegen units.
pub fn same_listener(a: &SharedListener, b: &SharedListener) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// A listener registered at a priority.
#[derive(Clone)]
pub struct ListenerEntry {
    listener: SharedListener,
    priority: i32,
}

impl ListenerEntry {
    pub fn new(listener: SharedListener, priority: i32) -> Self {
        Self { listener, priority }
    }

    pub fn listener(&self) -> &SharedListener {
        &self.listener
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Whether this entry holds the given listener.
    pub fn holds(&self, listener: &SharedListener) -> bool {
        same_listener(&self.listener, listener)
    }
}

impl fmt::Debug for ListenerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerEntry")
            .field("listener", &(Arc::as_ptr(&self.listener) as *const ()))
            .field("priority", &self.priority)
            .finish()
    }
}
