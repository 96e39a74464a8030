//! Contract tests for EventDispatcher ordering and propagation
//!
//! These verify the delivery rules every dispatch must satisfy:
//! priority-descending order, registration-order tie-break, short-circuit on
//! propagation stop, and no-op handling of unknown names and listeners.

use herald_core::events::{listener_fn, BaseEvent, Dispatcher, Event, EventDispatcher, SharedListener};
use herald_core::test_support::{CallLog, RecordingListener};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Expected delivery order for (label, priority) registrations.
fn expected_order(registrations: &[(String, i32)]) -> Vec<String> {
    let mut sorted: Vec<(usize, &(String, i32))> = registrations.iter().enumerate().collect();
    sorted.sort_by(|(ia, (_, pa)), (ib, (_, pb))| pb.cmp(pa).then(ia.cmp(ib)));
    sorted.into_iter().map(|(_, (label, _))| label.clone()).collect()
}

fn register_all(dispatcher: &EventDispatcher, log: &CallLog, registrations: &[(String, i32)]) {
    for (label, priority) in registrations {
        dispatcher.add_listener("e", RecordingListener::new(label.clone(), log).shared(), *priority);
    }
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn equal_priorities_fire_in_registration_order() {
    let dispatcher = EventDispatcher::new();
    let log = CallLog::new();

    dispatcher.add_listener("e", RecordingListener::new("A", &log).shared(), 10);
    dispatcher.add_listener("e", RecordingListener::new("B", &log).shared(), 50);
    dispatcher.add_listener("e", RecordingListener::new("C", &log).shared(), 50);

    dispatcher.dispatch(BaseEvent::new("e"));
    assert_eq!(log.calls(), vec!["B", "C", "A"]);
}

#[test]
fn stop_propagation_halts_lower_priorities() {
    let dispatcher = EventDispatcher::new();
    let log = CallLog::new();

    dispatcher.add_listener("e", RecordingListener::new("X", &log).stopping().shared(), 100);
    dispatcher.add_listener("e", RecordingListener::new("Y", &log).shared(), 50);

    let event = dispatcher.dispatch(BaseEvent::new("e"));
    assert_eq!(log.calls(), vec!["X"]);
    assert!(event.is_propagation_stopped());
}

#[test]
fn pre_stopped_event_still_reaches_first_listener() {
    let dispatcher = EventDispatcher::new();
    let log = CallLog::new();

    dispatcher.add_listener("e", RecordingListener::new("first", &log).shared(), 10);
    dispatcher.add_listener("e", RecordingListener::new("second", &log).shared(), 0);

    let mut event = BaseEvent::new("e");
    event.stop_propagation();

    let event = dispatcher.dispatch(event);
    assert_eq!(log.calls(), vec!["first"]);
    assert!(event.is_propagation_stopped());
}

#[test]
fn listeners_before_the_stop_run_exactly_once() {
    let dispatcher = EventDispatcher::new();
    let log = CallLog::new();

    dispatcher.add_listener("e", RecordingListener::new("first", &log).shared(), 100);
    dispatcher.add_listener("e", RecordingListener::new("stopper", &log).stopping().shared(), 100);
    dispatcher.add_listener("e", RecordingListener::new("skipped", &log).shared(), 90);

    dispatcher.dispatch(BaseEvent::new("e"));
    assert_eq!(log.calls(), vec!["first", "stopper"]);
}

#[test]
fn failure_without_stop_continues() {
    let dispatcher = EventDispatcher::new();
    let log = CallLog::new();

    dispatcher.add_listener("e", RecordingListener::new("fails", &log).failing().shared(), 5);
    dispatcher.add_listener("e", RecordingListener::new("runs", &log).shared(), 1);

    dispatcher.dispatch(BaseEvent::new("e"));
    assert_eq!(log.calls(), vec!["fails", "runs"]);
}

#[test]
fn same_listener_registered_twice_runs_in_both_slots() {
    let dispatcher = EventDispatcher::new();
    let log = CallLog::new();
    let twice = RecordingListener::new("twice", &log).shared();

    dispatcher.add_listener("e", Arc::clone(&twice), 100);
    dispatcher.add_listener("e", RecordingListener::new("middle", &log).shared(), 50);
    dispatcher.add_listener("e", Arc::clone(&twice), 10);

    dispatcher.dispatch(BaseEvent::new("e"));
    assert_eq!(log.calls(), vec!["twice", "middle", "twice"]);

    dispatcher.remove_listener("e", &twice);
    log.clear();
    dispatcher.dispatch(BaseEvent::new("e"));
    assert_eq!(log.calls(), vec!["middle"]);
}

#[test]
fn has_listener_tracks_add_and_remove() {
    let dispatcher = EventDispatcher::new();
    let listener: SharedListener = listener_fn(|_| true);

    dispatcher.add_listener("user.created", Arc::clone(&listener), 7);
    assert!(dispatcher.has_listener("user.created", &listener));

    dispatcher.remove_listener("user.created", &listener);
    assert!(!dispatcher.has_listener("user.created", &listener));
}

#[test]
fn identical_closures_are_distinct_listeners() {
    let dispatcher = EventDispatcher::new();
    let make = || listener_fn(|_| true);
    let a = make();
    let b = make();

    dispatcher.listen("e", Arc::clone(&a));
    assert!(dispatcher.has_listener("e", &a));
    assert!(!dispatcher.has_listener("e", &b));

    dispatcher.remove_listener("e", &b);
    assert!(dispatcher.has_listener("e", &a));
}

#[test]
fn dispatch_without_listeners_is_a_no_op() {
    let dispatcher = EventDispatcher::new();
    let log = CallLog::new();
    dispatcher.listen("other", RecordingListener::new("other", &log).shared());

    let original = BaseEvent::new("e").with_argument("user_id", 123);
    let returned = dispatcher.dispatch(original.clone());

    assert_eq!(returned, original);
    assert!(log.is_empty());
}

#[test]
fn arguments_are_shared_across_listeners() {
    let dispatcher = EventDispatcher::new();
    let observed = CallLog::new();
    let probe = observed.clone();

    dispatcher.add_listener(
        "user.created",
        listener_fn(|event| {
            event.arguments_mut().insert("greeting".into(), json!("hello"));
            true
        }),
        10,
    );
    dispatcher.add_listener(
        "user.created",
        listener_fn(move |event| {
            let greeting = event.arguments()["greeting"].as_str().unwrap_or_default().to_string();
            probe.record(greeting);
            true
        }),
        0,
    );

    let event = BaseEvent::new("user.created").with_argument("user_id", 123);
    assert_eq!(event.arguments().get("user_id"), Some(&json!(123)));

    let event = dispatcher.dispatch(event);
    assert_eq!(observed.calls(), vec!["hello"]);
    assert_eq!(event.arguments().len(), 2);
}

#[test]
fn order_reflects_registrations_made_between_dispatches() {
    let dispatcher = EventDispatcher::new();
    let log = CallLog::new();
    let low = RecordingListener::new("low", &log).shared();

    dispatcher.add_listener("e", Arc::clone(&low), 1);
    dispatcher.dispatch(BaseEvent::new("e"));

    dispatcher.add_listener("e", RecordingListener::new("high", &log).shared(), 9);
    dispatcher.dispatch(BaseEvent::new("e"));

    dispatcher.remove_listener("e", &low);
    dispatcher.add_listener("e", RecordingListener::new("lowest", &log).shared(), -9);
    dispatcher.dispatch(BaseEvent::new("e"));

    assert_eq!(log.calls(), vec!["low", "high", "low", "high", "lowest"]);
}

#[test]
fn dyn_dispatcher_dispatches_in_place() {
    let dispatcher = EventDispatcher::new();
    dispatcher.listen("e", listener_fn(|event| {
        event.stop_propagation();
        true
    }));

    let dynamic: &dyn Dispatcher = &dispatcher;
    let mut event = BaseEvent::new("e");
    dynamic.dispatch_in_place(&mut event);
    assert!(event.is_propagation_stopped());
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn delivery_is_priority_descending_and_stable(priorities in prop::collection::vec(-5i32..5, 0..24)) {
        let dispatcher = EventDispatcher::new();
        let log = CallLog::new();
        let registrations: Vec<(String, i32)> = priorities
            .iter()
            .enumerate()
            .map(|(i, p)| (format!("L{i}"), *p))
            .collect();

        register_all(&dispatcher, &log, &registrations);
        dispatcher.dispatch(BaseEvent::new("e"));

        prop_assert_eq!(log.calls(), expected_order(&registrations));
    }

    #[test]
    fn stop_at_index_invokes_exact_prefix(count in 1usize..12, stop_at in 0usize..12) {
        let stop_at = stop_at % count;
        let dispatcher = EventDispatcher::new();
        let log = CallLog::new();

        for i in 0..count {
            let listener = RecordingListener::new(format!("L{i}"), &log);
            let listener = if i == stop_at { listener.stopping() } else { listener };
            // Distinct descending priorities make index order the delivery order.
            dispatcher.add_listener("e", listener.shared(), (count - i) as i32);
        }

        let event = dispatcher.dispatch(BaseEvent::new("e"));
        let expected: Vec<String> = (0..=stop_at).map(|i| format!("L{i}")).collect();
        prop_assert_eq!(log.calls(), expected);
        prop_assert!(event.is_propagation_stopped());
    }
}
