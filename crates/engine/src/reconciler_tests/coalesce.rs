// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event bursts coalesce into one in-flight fetch plus one trailing fetch.

use super::*;

#[test]
fn burst_during_fetch_issues_exactly_one_trailing_fetch() {
    let mut rec = live();
    let mut issued = fetch_seqs(&rec.on_event(1, &state_event(RunEventType::StepStarted)));

    for event_type in [
        RunEventType::StepCompleted,
        RunEventType::StepStarted,
        RunEventType::StepCompleted,
        RunEventType::RunPaused,
        RunEventType::RunResumed,
    ] {
        issued.extend(fetch_seqs(&rec.on_event(1, &state_event(event_type))));
    }
    assert_eq!(issued, vec![2]);
    assert!(rec.is_queued());

    issued.extend(fetch_seqs(&rec.on_fetch_result(2, Ok(snapshot(RunStatus::Running, 1)), now())));
    assert_eq!(issued, vec![2, 3]);
    assert!(!rec.is_queued());

    issued.extend(fetch_seqs(&rec.on_fetch_result(3, Ok(snapshot(RunStatus::Running, 2)), now())));
    assert_eq!(issued, vec![2, 3]);
    assert_eq!(rec.in_flight(), 0);
}

#[test]
fn trailing_fetch_fires_even_when_in_flight_one_fails() {
    let mut rec = live();
    rec.on_event(1, &state_event(RunEventType::StepStarted));
    rec.on_event(1, &state_event(RunEventType::StepCompleted));

    let effects = rec.on_fetch_result(2, Err(FetchError::Network("timeout".into())), now());
    assert_eq!(count(&effects, "arm_retry"), 1);
    assert!(fetch_seqs(&effects).is_empty());

    assert_eq!(fetch_seqs(&rec.on_retry_timer()), vec![3]);
}

#[test]
fn idle_event_fetches_immediately() {
    let mut rec = live();
    let effects = rec.on_event(1, &state_event(RunEventType::StepCompleted));
    assert_eq!(effects, vec![Effect::Fetch { run_id: RunId::new(RUN), seq: 2, forced: false }]);
}

#[test]
fn unknown_event_types_are_dirty_signals() {
    let mut rec = live();
    let event = state_event(RunEventType::from("approval.requested".to_string()));
    assert_eq!(fetch_seqs(&rec.on_event(1, &event)), vec![2]);
}

#[test]
fn log_lines_append_in_order_without_fetching() {
    let mut rec = live();
    let mut effects = rec.on_event(1, &log_event(RUN, "line1"));
    effects.extend(rec.on_event(1, &log_event(RUN, "line2")));

    assert!(fetch_seqs(&effects).is_empty());
    assert_eq!(rec.logs().texts(), vec!["line1", "line2"]);
}

#[test]
fn log_lines_append_while_a_fetch_is_in_flight() {
    let mut rec = live();
    rec.on_event(1, &state_event(RunEventType::StepStarted));
    rec.on_event(1, &log_event(RUN, "compiling"));
    assert!(!rec.is_queued());

    rec.on_fetch_result(2, Ok(snapshot(RunStatus::Running, 1)), now());
    rec.on_event(1, &log_event(RUN, "linking"));

    assert_eq!(rec.logs().texts(), vec!["compiling", "linking"]);
    assert_eq!(rec.in_flight(), 0);
    assert_eq!(rec.applied_seq(), 2);
}

#[test]
fn log_capacity_evicts_oldest_lines() {
    let mut rec = live_with(MonitorConfig::default().log_capacity(2usize));
    for line in ["a", "b", "c"] {
        rec.on_event(1, &log_event(RUN, line));
    }
    assert_eq!(rec.logs().texts(), vec!["b", "c"]);
    assert_eq!(rec.view().log_lines().first().map(|l| l.seq), Some(1));
}

#[test]
fn views_share_log_lines_instead_of_copying() {
    let mut rec = live();
    rec.on_event(1, &log_event(RUN, "one"));
    let before = rec.view();
    rec.on_event(1, &log_event(RUN, "two"));
    let after = rec.view();

    assert_eq!(before.logs, after.logs);
    assert_ne!(before, after);
    assert_eq!(before.log_count, 1);
    assert_eq!(before.log_lines().len(), 1);
    assert_eq!(after.logs_since(1).into_iter().map(|l| l.text).collect::<Vec<_>>(), vec!["two"]);
}

#[test]
fn events_for_another_run_are_ignored() {
    let mut rec = live();
    let effects = rec.on_event(1, &step_event("run-2", RunEventType::StepStarted, 0));
    assert!(effects.is_empty());
    assert!(rec.on_event(1, &log_event("run-2", "x")).is_empty());
    assert!(rec.logs().is_empty());
}
