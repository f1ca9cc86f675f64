// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rw_core::{PausedReason, RunStatus};

fn run(status: RunStatus) -> WorkflowRun {
    match status {
        RunStatus::Paused => WorkflowRun::builder().paused(PausedReason::StepFailed).build(),
        other => WorkflowRun::builder().status(other).build(),
    }
}

#[yare::parameterized(
    resume_running   = { RunCommand::Resume, RunStatus::Running },
    resume_pending   = { RunCommand::Resume, RunStatus::Pending },
    resume_failed    = { RunCommand::Resume, RunStatus::Failed },
    cancel_completed = { RunCommand::Cancel, RunStatus::Completed },
    cancel_cancelled = { RunCommand::Cancel, RunStatus::Cancelled },
    cancel_pending   = { RunCommand::Cancel, RunStatus::Pending },
)]
fn rejects_invalid_state(command: RunCommand, status: RunStatus) {
    let snapshot = run(status);
    assert_eq!(
        check(command, Some(&snapshot), None),
        Err(CommandError::InvalidState { command, status })
    );
}

#[yare::parameterized(
    resume_paused  = { RunCommand::Resume, RunStatus::Paused },
    cancel_running = { RunCommand::Cancel, RunStatus::Running },
    cancel_paused  = { RunCommand::Cancel, RunStatus::Paused },
)]
fn accepts_valid_state(command: RunCommand, status: RunStatus) {
    assert_eq!(check(command, Some(&run(status)), None), Ok(()));
}

#[test]
fn rejects_before_first_snapshot() {
    assert_eq!(check(RunCommand::Cancel, None, None), Err(CommandError::NotLoaded));
}

#[test]
fn one_command_in_flight() {
    let snapshot = run(RunStatus::Paused);
    let mut dispatcher = Dispatcher::default();

    dispatcher.begin(RunCommand::Resume, Some(&snapshot)).unwrap();
    assert_eq!(
        dispatcher.begin(RunCommand::Cancel, Some(&snapshot)),
        Err(CommandError::InFlight(RunCommand::Resume))
    );

    assert!(!dispatcher.finish(RunCommand::Cancel));
    assert!(dispatcher.finish(RunCommand::Resume));
    assert_eq!(dispatcher.pending(), None);
    assert_eq!(dispatcher.begin(RunCommand::Cancel, Some(&snapshot)), Ok(()));
}

#[test]
fn rejection_does_not_mark_in_flight() {
    let snapshot = run(RunStatus::Running);
    let mut dispatcher = Dispatcher::default();
    assert!(dispatcher.begin(RunCommand::Resume, Some(&snapshot)).is_err());
    assert_eq!(dispatcher.pending(), None);
}

#[test]
fn transport_errors_are_not_rejections() {
    let rejected = CommandError::NotLoaded;
    let failed = CommandError::Transport {
        command: RunCommand::Cancel,
        source: rw_adapters::TransportError::Network("reset".into()),
    };
    assert!(rejected.is_rejected());
    assert!(!failed.is_rejected());
}
