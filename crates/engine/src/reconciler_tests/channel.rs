// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Channel failures: one resubscribe, then a disconnected indicator.

use super::*;

fn subscribe(epoch: u64) -> Effect {
    Effect::Subscribe { run_id: RunId::new(RUN), epoch }
}

#[test]
fn connect_marks_connected() {
    let mut rec = live();
    assert_eq!(rec.connection(), ConnectionState::Connecting);
    rec.on_channel_connected(1);
    assert!(rec.is_connected());
    assert!(rec.view().connected());
}

#[test]
fn first_error_resubscribes_with_forced_fetch() {
    let mut rec = live();
    rec.on_channel_connected(1);

    let effects = rec.on_channel_error(1, &SubscribeError::Closed);
    assert_eq!(
        effects,
        vec![
            Effect::Unsubscribe { epoch: 1 },
            subscribe(2),
            Effect::Fetch { run_id: RunId::new(RUN), seq: 2, forced: true },
        ]
    );
    assert_eq!(rec.connection(), ConnectionState::Reconnecting);
}

#[test]
fn repeated_failure_reports_disconnected_and_keeps_snapshot() {
    let mut rec = live();
    rec.on_channel_error(1, &SubscribeError::Stream("reset".into()));
    let effects = rec.on_channel_error(2, &SubscribeError::Connect("refused".into()));

    assert_eq!(effects, vec![Effect::Unsubscribe { epoch: 2 }]);
    assert_eq!(rec.connection(), ConnectionState::Disconnected);
    assert!(!rec.view().connected());
    assert_eq!(status(&rec), Some(RunStatus::Running));
    assert_eq!(rec.phase(), Phase::Live);
}

#[test]
fn delivered_event_restores_the_resubscribe_budget() {
    let mut rec = live();
    rec.on_channel_error(1, &SubscribeError::Closed);
    rec.on_channel_connected(2);
    rec.on_event(2, &log_event(RUN, "back"));

    let effects = rec.on_channel_error(2, &SubscribeError::Closed);
    assert!(effects.contains(&subscribe(3)));
    assert_eq!(rec.connection(), ConnectionState::Reconnecting);
}

#[test]
fn connect_without_events_does_not_restore_the_budget() {
    let mut rec = live();
    rec.on_channel_error(1, &SubscribeError::Closed);
    rec.on_channel_connected(2);
    assert!(rec.is_connected());

    let effects = rec.on_channel_error(2, &SubscribeError::Closed);
    assert_eq!(effects, vec![Effect::Unsubscribe { epoch: 2 }]);
    assert_eq!(rec.connection(), ConnectionState::Disconnected);
}

#[test]
fn channel_dropped_right_after_connect_settles_disconnected() {
    let mut rec = live();
    for epoch in 1..=50 {
        rec.on_channel_connected(epoch);
        rec.on_channel_error(epoch, &SubscribeError::Closed);
    }

    assert_eq!(rec.connection(), ConnectionState::Disconnected);
    assert_eq!(rec.epoch(), 2);
    assert_eq!(rec.in_flight(), 1);
}

#[test]
fn resubscribe_queues_behind_an_in_flight_fetch() {
    let mut rec = live();
    assert_eq!(fetch_seqs(&rec.on_event(1, &state_event(RunEventType::StepStarted))), vec![2]);

    let effects = rec.on_channel_error(1, &SubscribeError::Closed);
    assert_eq!(effects, vec![Effect::Unsubscribe { epoch: 1 }, subscribe(2)]);
    assert_eq!(rec.in_flight(), 1);
    assert!(rec.is_queued());

    let effects = rec.on_fetch_result(2, Ok(snapshot(RunStatus::Running, 1)), now());
    assert_eq!(fetch_seqs(&effects), vec![3]);
}

#[test]
fn errors_from_released_channels_are_ignored() {
    let mut rec = live();
    rec.on_channel_error(1, &SubscribeError::Closed);

    assert!(rec.on_channel_error(1, &SubscribeError::Closed).is_empty());
    assert!(rec.on_event(1, &state_event(RunEventType::StepStarted)).is_empty());
    rec.on_channel_connected(1);
    assert_eq!(rec.connection(), ConnectionState::Reconnecting);
}

#[test]
fn first_event_counts_as_connected() {
    let mut rec = live();
    rec.on_event(1, &log_event(RUN, "hello"));
    assert!(rec.is_connected());
}

#[test]
fn manual_reconnect_after_disconnect() {
    let mut rec = live();
    rec.on_channel_error(1, &SubscribeError::Closed);
    rec.on_channel_error(2, &SubscribeError::Closed);
    // forced fetch from the first resubscribe still outstanding
    assert_eq!(rec.in_flight(), 1);

    let effects = rec.reconnect();
    assert_eq!(
        effects,
        vec![subscribe(3), Effect::Fetch { run_id: RunId::new(RUN), seq: 3, forced: true }]
    );
    assert_eq!(rec.connection(), ConnectionState::Connecting);

    // Budget is back: one more resubscribe before disconnecting again
    let effects = rec.on_channel_error(3, &SubscribeError::Closed);
    assert!(effects.contains(&subscribe(4)));
}

#[test]
fn reconnect_while_healthy_is_a_no_op() {
    let mut rec = live();
    rec.on_channel_connected(1);
    assert!(rec.reconnect().is_empty());
    assert_eq!(rec.epoch(), 1);
}

#[test]
fn reconnect_after_terminal_is_a_no_op() {
    let mut rec = live();
    rec.on_channel_error(1, &SubscribeError::Closed);
    rec.on_channel_error(2, &SubscribeError::Closed);
    rec.on_fetch_result(2, Ok(snapshot(RunStatus::Completed, 1)), now());
    assert!(rec.reconnect().is_empty());
}

#[test]
fn zero_budget_disconnects_immediately() {
    let mut rec = live_with(MonitorConfig::default().resubscribe_attempts(0));
    let effects = rec.on_channel_error(1, &SubscribeError::Closed);
    assert_eq!(effects, vec![Effect::Unsubscribe { epoch: 1 }]);
    assert_eq!(rec.connection(), ConnectionState::Disconnected);
}
