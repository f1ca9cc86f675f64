// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local gate in front of resume/cancel.
//!
//! Commands are checked against the last fetched snapshot and rejected
//! before anything is sent. At most one command is in flight per monitor.
//! The gate never changes the displayed status; only a later fetch does.

use crate::error::CommandError;
use rw_core::{RunCommand, WorkflowRun};

/// A command the backend accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandAck {
    pub command: RunCommand,
    /// Sequence number of the refresh issued in response, if the monitor
    /// was still live to issue one.
    pub refresh_seq: Option<u64>,
}

/// Check `command` against the current snapshot and in-flight command.
pub fn check(
    command: RunCommand,
    run: Option<&WorkflowRun>,
    pending: Option<RunCommand>,
) -> Result<(), CommandError> {
    let Some(run) = run else {
        return Err(CommandError::NotLoaded);
    };
    if let Some(pending) = pending {
        return Err(CommandError::InFlight(pending));
    }
    if !command.permits(run.status) {
        return Err(CommandError::InvalidState { command, status: run.status });
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct Dispatcher {
    pending: Option<RunCommand>,
}

impl Dispatcher {
    pub fn pending(&self) -> Option<RunCommand> {
        self.pending
    }

    /// Gate `command` and mark it in flight.
    pub fn begin(
        &mut self,
        command: RunCommand,
        run: Option<&WorkflowRun>,
    ) -> Result<(), CommandError> {
        check(command, run, self.pending)?;
        self.pending = Some(command);
        Ok(())
    }

    /// Clear the in-flight marker. Returns false if `command` was not the
    /// one in flight.
    pub fn finish(&mut self, command: RunCommand) -> bool {
        if self.pending == Some(command) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
