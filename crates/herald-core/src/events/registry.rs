//! Per-event listener registry.
//!
//! Each event name maps to a sequence of [`ListenerEntry`] kept sorted by
//! priority (highest first, ties in registration order) after every
//! mutation. Sequences are copy-on-write: [`ListenerRegistry::snapshot`]
//! hands out an `Arc` that later mutations never touch.

use super::listener::{ListenerEntry, SharedListener};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

/// Sorted, immutable view of one event's listeners.
pub type ListenerSnapshot = Arc<Vec<ListenerEntry>>;

/// Event name to sorted listener sequence.
///
/// Not synchronized; the dispatcher owns it behind a lock.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    sequences: HashMap<String, ListenerSnapshot>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and restore priority order.
    ///
    /// `sort_by_key` is stable, so the new entry lands after existing
    /// entries of equal priority.
    pub fn insert(&mut self, event_name: &str, entry: ListenerEntry) {
        let sequence = self.sequences.entry(event_name.to_owned()).or_default();
        let entries = Arc::make_mut(sequence);
        entries.push(entry);
        entries.sort_by_key(|entry| Reverse(entry.priority()));
    }

    /// Remove every entry holding `listener`. Returns how many were removed.
    pub fn remove(&mut self, event_name: &str, listener: &SharedListener) -> usize {
        let Some(sequence) = self.sequences.get_mut(event_name) else {
            return 0;
        };

        let before = sequence.len();
        if !sequence.iter().any(|entry| entry.holds(listener)) {
            return 0;
        }

        let entries = Arc::make_mut(sequence);
        entries.retain(|entry| !entry.holds(listener));
        let removed = before - entries.len();

        if entries.is_empty() {
            self.sequences.remove(event_name);
        }

        removed
    }

    /// Whether `listener` is registered for `event_name`.
    pub fn contains(&self, event_name: &str, listener: &SharedListener) -> bool {
        self.sequences
            .get(event_name)
            .is_some_and(|entries| entries.iter().any(|entry| entry.holds(listener)))
    }

    /// Current sorted sequence for `event_name`, if any listener is registered.
    pub fn snapshot(&self, event_name: &str) -> Option<ListenerSnapshot> {
        self.sequences.get(event_name).map(Arc::clone)
    }

    pub fn len(&self, event_name: &str) -> usize {
        self.sequences.get(event_name).map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Names with at least one registered listener, sorted.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sequences.keys().cloned().collect();
        names.sort();
        names
    }

    /// Drop every listener for `event_name`. Returns how many were dropped.
    pub fn clear_event(&mut self, event_name: &str) -> usize {
        self.sequences
            .remove(event_name)
            .map_or(0, |entries| entries.len())
    }

    /// Drop every listener.
    pub fn clear(&mut self) {
        self.sequences.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::listener::listener_fn;

    fn noop() -> SharedListener {
        listener_fn(|_| true)
    }

    fn priorities(registry: &ListenerRegistry, event_name: &str) -> Vec<i32> {
        registry
            .snapshot(event_name)
            .map(|entries| entries.iter().map(ListenerEntry::priority).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_insert_keeps_priority_order() {
        let mut registry = ListenerRegistry::new();
        for priority in [10, 50, -5, 50, 0] {
            registry.insert("e", ListenerEntry::new(noop(), priority));
        }

        assert_eq!(priorities(&registry, "e"), vec![50, 50, 10, 0, -5]);
    }

    #[test]
    fn test_ties_keep_registration_order() {
        let mut registry = ListenerRegistry::new();
        let first = noop();
        let second = noop();
        registry.insert("e", ListenerEntry::new(Arc::clone(&first), 5));
        registry.insert("e", ListenerEntry::new(Arc::clone(&second), 5));

        let snapshot = registry.snapshot("e").unwrap();
        assert!(snapshot[0].holds(&first));
        assert!(snapshot[1].holds(&second));
    }

    #[test]
    fn test_remove_all_entries_of_listener() {
        let mut registry = ListenerRegistry::new();
        let target = noop();
        let other = noop();
        registry.insert("e", ListenerEntry::new(Arc::clone(&target), 10));
        registry.insert("e", ListenerEntry::new(Arc::clone(&other), 5));
        registry.insert("e", ListenerEntry::new(Arc::clone(&target), 1));

        assert_eq!(registry.remove("e", &target), 2);
        assert!(!registry.contains("e", &target));
        assert!(registry.contains("e", &other));
        assert_eq!(registry.len("e"), 1);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut registry = ListenerRegistry::new();
        let listener = noop();
        assert_eq!(registry.remove("missing", &listener), 0);

        registry.insert("e", ListenerEntry::new(noop(), 0));
        assert_eq!(registry.remove("e", &listener), 0);
        assert_eq!(registry.len("e"), 1);
    }

    #[test]
    fn test_last_removal_drops_event_name() {
        let mut registry = ListenerRegistry::new();
        let listener = noop();
        registry.insert("e", ListenerEntry::new(Arc::clone(&listener), 0));
        registry.remove("e", &listener);

        assert!(registry.snapshot("e").is_none());
        assert!(registry.event_names().is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_mutation() {
        let mut registry = ListenerRegistry::new();
        let listener = noop();
        registry.insert("e", ListenerEntry::new(Arc::clone(&listener), 0));

        let snapshot = registry.snapshot("e").unwrap();
        registry.insert("e", ListenerEntry::new(noop(), 100));
        registry.remove("e", &listener);

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot[0].holds(&listener));
        assert_eq!(priorities(&registry, "e"), vec![100]);
    }

    #[test]
    fn test_event_names_sorted() {
        let mut registry = ListenerRegistry::new();
        registry.insert("b", ListenerEntry::new(noop(), 0));
        registry.insert("a", ListenerEntry::new(noop(), 0));

        assert_eq!(registry.event_names(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_clear_event() {
        let mut registry = ListenerRegistry::new();
        registry.insert("a", ListenerEntry::new(noop(), 0));
        registry.insert("a", ListenerEntry::new(noop(), 1));
        registry.insert("b", ListenerEntry::new(noop(), 0));

        assert_eq!(registry.clear_event("a"), 2);
        assert_eq!(registry.len("a"), 0);
        assert_eq!(registry.len("b"), 1);

        registry.clear();
        assert!(registry.is_empty());
    }
}
