// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fetch results are applied in issue order, never completion order.

use super::*;
use std::time::Duration;

#[test]
fn later_fetch_wins_over_slow_earlier_one() {
    let mut rec = live();

    // A: event-triggered refresh
    let a = fetch_seqs(&rec.on_event(1, &state_event(RunEventType::StepStarted)));
    assert_eq!(a, vec![2]);

    // B: forced refresh after an accepted command, issued while A is in flight
    rec.begin_command(RunCommand::Cancel).unwrap();
    let (ack, effects) = rec.finish_command(RunCommand::Cancel, Ok(()));
    assert_eq!(ack.unwrap().refresh_seq, Some(3));
    assert_eq!(forced_seqs(&effects), vec![3]);

    // B resolves first, A resolves late
    rec.on_fetch_result(3, Ok(snapshot(RunStatus::Paused, 2)), now());
    assert_eq!(status(&rec), Some(RunStatus::Paused));
    let effects = rec.on_fetch_result(2, Ok(snapshot(RunStatus::Running, 1)), now());

    assert!(effects.is_empty());
    assert_eq!(status(&rec), Some(RunStatus::Paused));
    assert_eq!(rec.applied_seq(), 3);
    assert_eq!(rec.in_flight(), 0);
}

#[test]
fn failure_covered_by_a_newer_fetch_is_not_retried() {
    let mut rec = live();
    rec.on_event(1, &state_event(RunEventType::StepStarted));
    rec.begin_command(RunCommand::Cancel).unwrap();
    rec.finish_command(RunCommand::Cancel, Ok(()));
    assert_eq!(rec.in_flight(), 2);

    let effects = rec.on_fetch_result(2, Err(FetchError::Network("reset".into())), now());
    assert!(effects.is_empty());
    assert!(!rec.is_queued());
    assert!(!rec.is_retry_armed());
    assert_eq!(rec.view().fetch_failures, 0);

    let effects = rec.on_fetch_result(3, Ok(snapshot(RunStatus::Cancelled, 1)), now());
    assert_eq!(fetch_seqs(&effects), Vec::<u64>::new());
    assert_eq!(rec.phase(), Phase::Final);
}

#[test]
fn in_order_results_both_apply() {
    let mut rec = live();
    rec.on_event(1, &state_event(RunEventType::StepStarted));
    rec.on_fetch_result(2, Ok(snapshot(RunStatus::Running, 1)), now());
    rec.on_event(1, &state_event(RunEventType::RunPaused));
    rec.on_fetch_result(3, Ok(snapshot(RunStatus::Paused, 2)), now());

    assert_eq!(rec.applied_seq(), 3);
    assert_eq!(status(&rec), Some(RunStatus::Paused));
}

#[test]
fn older_activity_is_skipped_but_consumes_its_sequence() {
    let mut rec = live();
    rec.on_event(1, &state_event(RunEventType::StepStarted));
    rec.on_fetch_result(2, Ok(snapshot(RunStatus::Paused, 10)), now());

    rec.on_event(1, &state_event(RunEventType::StepCompleted));
    let effects = rec.on_fetch_result(3, Ok(snapshot(RunStatus::Running, 5)), now());

    assert!(effects.is_empty());
    assert_eq!(status(&rec), Some(RunStatus::Paused));
    assert_eq!(rec.applied_seq(), 3);
}

#[test]
fn equal_activity_still_replaces() {
    let mut rec = live();
    rec.on_event(1, &state_event(RunEventType::StepStarted));
    rec.on_fetch_result(2, Ok(snapshot(RunStatus::Paused, 0)), now());
    assert_eq!(status(&rec), Some(RunStatus::Paused));
}

#[test]
fn snapshot_for_another_run_is_a_failed_fetch() {
    let mut rec = live();
    rec.on_event(1, &state_event(RunEventType::StepStarted));
    let other = WorkflowRun::builder().id("run-2").activity_offset_secs(5).build();
    let effects = rec.on_fetch_result(2, Ok(other), now());

    assert_eq!(effects, vec![Effect::ArmRetry { delay: Duration::from_millis(500) }]);
    assert_eq!(rec.run().map(|r| r.id.as_str()), Some(RUN));
    assert_eq!(rec.view().fetch_failures, 1);
    assert!(rec.view().last_fetch_error.unwrap().contains("run-2"));
}

#[test]
fn structurally_broken_snapshot_is_a_failed_fetch() {
    let mut rec = live();
    rec.on_event(1, &state_event(RunEventType::StepStarted));
    let mut broken = snapshot(RunStatus::Running, 1);
    broken.steps_state.pop();
    rec.on_fetch_result(2, Ok(broken), now());

    assert_eq!(rec.applied_seq(), 1);
    assert_eq!(rec.run().map(|r| r.steps_state.len()), Some(3));
    assert!(rec.is_retry_armed());
}

#[test]
fn failure_keeps_last_snapshot_and_retries_after_backoff() {
    let mut rec = live();
    rec.on_event(1, &state_event(RunEventType::StepStarted));
    let effects = rec.on_fetch_result(2, Err(FetchError::Network("reset".into())), now());

    assert_eq!(effects, vec![Effect::ArmRetry { delay: Duration::from_millis(500) }]);
    assert_eq!(status(&rec), Some(RunStatus::Running));
    assert!(rec.is_queued());

    // Events during backoff only queue
    assert!(rec.on_event(1, &state_event(RunEventType::StepCompleted)).is_empty());

    let effects = rec.on_retry_timer();
    assert_eq!(fetch_seqs(&effects), vec![3]);

    let effects = rec.on_fetch_result(3, Ok(snapshot(RunStatus::Running, 1)), now());
    assert!(effects.is_empty());
    let view = rec.view();
    assert_eq!(view.fetch_failures, 0);
    assert_eq!(view.last_fetch_error, None);
}

#[test]
fn consecutive_failures_back_off_exponentially() {
    let mut rec = live();
    rec.on_event(1, &state_event(RunEventType::StepStarted));

    let mut delays = Vec::new();
    for seq in 2..=5 {
        let effects = rec.on_fetch_result(seq, Err(FetchError::Status { status: 502, message: String::new() }), now());
        delays.extend(effects.iter().filter_map(|e| match e {
            Effect::ArmRetry { delay } => Some(delay.as_millis() as u64),
            _ => None,
        }));
        assert_eq!(fetch_seqs(&rec.on_retry_timer()), vec![seq + 1]);
    }
    assert_eq!(delays, vec![500, 1_000, 2_000, 4_000]);
}

#[test]
fn retry_timer_without_arming_is_ignored() {
    let mut rec = live();
    assert!(rec.on_retry_timer().is_empty());
}

#[test]
fn sync_time_follows_applied_snapshots() {
    let mut rec = live();
    assert_eq!(rec.view().last_synced_at, Some(now()));

    let later = now() + chrono::Duration::seconds(30);
    rec.on_event(1, &state_event(RunEventType::StepStarted));
    rec.on_fetch_result(2, Ok(snapshot(RunStatus::Running, 1)), later);
    assert_eq!(rec.view().last_synced_at, Some(later));
}
