// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control commands a client may send for a run.

use crate::run::RunStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunCommand {
    Resume,
    Cancel,
}

crate::simple_display! {
    RunCommand {
        Resume => "resume",
        Cancel => "cancel",
    }
}

impl RunCommand {
    /// Whether the command may be sent while the run reports `status`.
    ///
    /// Resume needs a paused run. Cancel needs a run that has started and
    /// not yet finished.
    pub fn permits(self, status: RunStatus) -> bool {
        match self {
            RunCommand::Resume => status == RunStatus::Paused,
            RunCommand::Cancel => matches!(status, RunStatus::Running | RunStatus::Paused),
        }
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
