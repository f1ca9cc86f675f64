// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `close` is idempotent and turns outstanding work into no-ops.

use super::*;

#[test]
fn close_twice_releases_once() {
    let mut rec = live();
    assert_eq!(rec.close(), vec![Effect::Unsubscribe { epoch: 1 }]);
    assert!(rec.close().is_empty());
    assert_eq!(rec.phase(), Phase::Closed);
    assert_eq!(rec.connection(), ConnectionState::Closed);
}

#[test]
fn fetch_resolving_after_close_has_no_effect() {
    let mut rec = live();
    rec.on_event(1, &state_event(RunEventType::StepStarted));
    rec.on_event(1, &log_event(RUN, "line"));
    rec.close();

    let effects = rec.on_fetch_result(2, Ok(snapshot(RunStatus::Paused, 1)), now());
    assert!(effects.is_empty());

    let view = rec.view();
    assert_eq!(view.run, None);
    assert!(view.logs.is_empty());
    assert_eq!(view.applied_seq, 1);
}

#[test]
fn close_disarms_retry_timer() {
    let mut rec = live();
    rec.on_event(1, &state_event(RunEventType::StepStarted));
    rec.on_fetch_result(2, Err(FetchError::Network("reset".into())), now());

    assert_eq!(rec.close(), vec![Effect::Unsubscribe { epoch: 1 }, Effect::DisarmRetry]);
    assert!(rec.on_retry_timer().is_empty());
}

#[test]
fn close_while_opening_drops_the_baseline() {
    let mut rec = reconciler();
    rec.open();
    assert!(rec.close().is_empty());

    let effects = rec.on_fetch_result(1, Ok(snapshot(RunStatus::Running, 0)), now());
    assert!(effects.is_empty());
    assert_eq!(rec.run(), None);
    assert_eq!(rec.epoch(), 0);
}

#[test]
fn close_before_open_is_safe() {
    let mut rec = reconciler();
    assert!(rec.close().is_empty());
    assert!(rec.open().is_empty());
}

#[test]
fn events_after_close_are_ignored() {
    let mut rec = live();
    rec.close();
    assert!(rec.on_event(1, &state_event(RunEventType::StepStarted)).is_empty());
    assert!(rec.on_channel_error(1, &SubscribeError::Closed).is_empty());
    assert!(rec.reconnect().is_empty());
}

#[test]
fn failed_baseline_never_subscribes() {
    let mut rec = reconciler();
    rec.open();
    let error = FetchError::NotFound(RunId::new(RUN));
    let effects = rec.on_fetch_result(1, Err(error.clone()), now());

    assert!(effects.is_empty());
    assert_eq!(rec.phase(), Phase::OpenFailed);
    assert_eq!(rec.open_error(), Some(&error));
    assert_eq!(rec.run(), None);
    assert!(rec.close().is_empty());
}

#[test]
fn invalid_baseline_fails_the_open() {
    let mut rec = reconciler();
    rec.open();
    let wrong = WorkflowRun::builder().id("run-2").build();
    rec.on_fetch_result(1, Ok(wrong), now());

    assert_eq!(rec.phase(), Phase::OpenFailed);
    assert!(matches!(rec.open_error(), Some(FetchError::Invalid(_))));
}

#[test]
fn open_twice_issues_one_baseline() {
    let mut rec = reconciler();
    assert_eq!(fetch_seqs(&rec.open()), vec![1]);
    assert!(rec.open().is_empty());
}
