// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal statuses are absorbing.

use super::*;

#[test]
fn terminal_snapshot_unsubscribes_once_and_absorbs_later_events() {
    let mut rec = live();
    rec.on_channel_connected(1);

    let effects = rec.on_event(1, &state_event(RunEventType::RunCompleted));
    assert_eq!(fetch_seqs(&effects), vec![2]);

    let effects = rec.on_fetch_result(2, Ok(snapshot(RunStatus::Completed, 1)), now());
    assert_eq!(effects, vec![Effect::Unsubscribe { epoch: 1 }]);
    assert_eq!(rec.phase(), Phase::Final);
    assert_eq!(rec.connection(), ConnectionState::Closed);

    // Stray event from the closing channel
    let effects = rec.on_event(1, &state_event(RunEventType::StepCompleted));
    assert!(effects.is_empty());
    assert!(rec.on_event(1, &log_event(RUN, "late")).is_empty());
    assert!(rec.logs().is_empty());
    assert_eq!(status(&rec), Some(RunStatus::Completed));

    // Closing later does not release the channel a second time
    assert!(rec.close().is_empty());
}

#[test]
fn earlier_fetch_cannot_reopen_a_terminal_run() {
    let mut rec = live();
    rec.on_event(1, &state_event(RunEventType::StepStarted));
    rec.begin_command(RunCommand::Cancel).unwrap();
    rec.finish_command(RunCommand::Cancel, Ok(()));

    rec.on_fetch_result(3, Ok(snapshot(RunStatus::Cancelled, 2)), now());
    let effects = rec.on_fetch_result(2, Ok(snapshot(RunStatus::Running, 1)), now());

    assert!(effects.is_empty());
    assert_eq!(status(&rec), Some(RunStatus::Cancelled));
    assert!(rec.view().is_final);
}

#[test]
fn terminal_snapshot_drops_the_queued_refresh() {
    let mut rec = live();
    rec.on_event(1, &state_event(RunEventType::StepCompleted));
    rec.on_event(1, &state_event(RunEventType::RunFailed));
    assert!(rec.is_queued());

    let failed = WorkflowRun::builder().id(RUN).status(RunStatus::Failed).build();
    let effects = rec.on_fetch_result(2, Ok(failed), now());

    assert!(fetch_seqs(&effects).is_empty());
    assert!(!rec.is_queued());
}

#[test]
fn terminal_snapshot_disarms_pending_retry() {
    let mut rec = live();
    rec.on_event(1, &state_event(RunEventType::StepStarted));
    rec.begin_command(RunCommand::Cancel).unwrap();
    rec.finish_command(RunCommand::Cancel, Ok(()));

    rec.on_fetch_result(2, Err(FetchError::Network("reset".into())), now());
    assert!(rec.is_retry_armed());
    let effects = rec.on_fetch_result(3, Ok(snapshot(RunStatus::Cancelled, 1)), now());

    assert_eq!(effects, vec![Effect::DisarmRetry, Effect::Unsubscribe { epoch: 1 }]);
    assert!(!rec.is_retry_armed());
}

#[yare::parameterized(
    completed = { RunStatus::Completed },
    failed    = { RunStatus::Failed },
    cancelled = { RunStatus::Cancelled },
)]
fn terminal_baseline_never_subscribes(terminal: RunStatus) {
    let mut rec = reconciler();
    rec.open();
    let effects = rec.on_fetch_result(1, Ok(snapshot(terminal, 0)), now());

    assert!(effects.is_empty());
    assert_eq!(rec.phase(), Phase::Final);
    assert_eq!(status(&rec), Some(terminal));
    assert_eq!(rec.epoch(), 0);
}

#[test]
fn commands_against_terminal_run_are_rejected() {
    let mut rec = reconciler();
    rec.open();
    rec.on_fetch_result(1, Ok(snapshot(RunStatus::Completed, 0)), now());

    assert_eq!(
        rec.begin_command(RunCommand::Cancel),
        Err(CommandError::InvalidState { command: RunCommand::Cancel, status: RunStatus::Completed })
    );
}
