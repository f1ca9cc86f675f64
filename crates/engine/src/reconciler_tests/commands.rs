// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resume/cancel gating and follow-up refresh.

use super::*;

fn paused_live() -> RunReconciler {
    let mut rec = live();
    rec.on_event(1, &state_event(RunEventType::RunPaused));
    rec.on_fetch_result(2, Ok(snapshot(RunStatus::Paused, 1)), now());
    assert_eq!(status(&rec), Some(RunStatus::Paused));
    rec
}

#[test]
fn resume_while_running_is_rejected() {
    let mut rec = live();
    assert_eq!(
        rec.begin_command(RunCommand::Resume),
        Err(CommandError::InvalidState { command: RunCommand::Resume, status: RunStatus::Running })
    );
    assert_eq!(rec.pending_command(), None);
}

#[test]
fn resume_while_paused_refreshes_immediately() {
    let mut rec = paused_live();
    rec.begin_command(RunCommand::Resume).unwrap();
    assert_eq!(rec.view().pending_command, Some(RunCommand::Resume));

    let (ack, effects) = rec.finish_command(RunCommand::Resume, Ok(()));
    assert_eq!(ack, Ok(CommandAck { command: RunCommand::Resume, refresh_seq: Some(3) }));
    assert_eq!(forced_seqs(&effects), vec![3]);
    assert_eq!(rec.pending_command(), None);

    // Status is not flipped locally
    assert_eq!(status(&rec), Some(RunStatus::Paused));
}

#[test]
fn refresh_after_command_bypasses_coalescing() {
    let mut rec = paused_live();
    rec.on_event(1, &state_event(RunEventType::StepStarted));
    rec.on_event(1, &state_event(RunEventType::StepCompleted));
    assert_eq!(rec.in_flight(), 1);
    assert!(rec.is_queued());

    rec.begin_command(RunCommand::Cancel).unwrap();
    let (_, effects) = rec.finish_command(RunCommand::Cancel, Ok(()));
    assert_eq!(forced_seqs(&effects), vec![4]);
    assert_eq!(rec.in_flight(), 2);
    // The forced fetch already covers the queued signal
    assert!(!rec.is_queued());
}

#[test]
fn transport_failure_leaves_state_untouched() {
    let mut rec = paused_live();
    let before = rec.view();
    rec.begin_command(RunCommand::Resume).unwrap();

    let error = TransportError::Status { status: 409, message: "not paused".into() };
    let (ack, effects) = rec.finish_command(RunCommand::Resume, Err(error.clone()));

    assert_eq!(ack, Err(CommandError::Transport { command: RunCommand::Resume, source: error }));
    assert!(effects.is_empty());
    assert_eq!(rec.view(), before);
}

#[test]
fn second_command_while_one_is_in_flight_is_rejected() {
    let mut rec = paused_live();
    rec.begin_command(RunCommand::Resume).unwrap();
    assert_eq!(
        rec.begin_command(RunCommand::Resume),
        Err(CommandError::InFlight(RunCommand::Resume))
    );
    assert_eq!(
        rec.begin_command(RunCommand::Cancel),
        Err(CommandError::InFlight(RunCommand::Resume))
    );
}

#[test]
fn commands_before_the_baseline_are_rejected() {
    let mut rec = reconciler();
    assert_eq!(rec.begin_command(RunCommand::Cancel), Err(CommandError::NotLoaded));
    rec.open();
    assert_eq!(rec.begin_command(RunCommand::Cancel), Err(CommandError::NotLoaded));
}

#[test]
fn commands_after_close_are_rejected() {
    let mut rec = paused_live();
    rec.close();
    assert_eq!(rec.begin_command(RunCommand::Resume), Err(CommandError::Closed));
}

#[test]
fn command_finishing_after_close_issues_nothing() {
    let mut rec = paused_live();
    rec.begin_command(RunCommand::Cancel).unwrap();
    rec.close();

    let (ack, effects) = rec.finish_command(RunCommand::Cancel, Ok(()));
    assert_eq!(ack, Ok(CommandAck { command: RunCommand::Cancel, refresh_seq: None }));
    assert!(effects.is_empty());
}
