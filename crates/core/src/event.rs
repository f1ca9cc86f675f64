// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events pushed by the backend over a run's event channel.
//!
//! Events are notifications, not state: apart from `tool.log` lines they
//! only tell the monitor that the snapshot it holds may be out of date.

use crate::id::RunId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The `event_type` discriminator of a [`RunEvent`].
///
/// Unrecognized types are preserved in `Other` so that a newer backend
/// does not break older clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunEventType {
    RunStarted,
    RunPaused,
    RunResumed,
    RunCompleted,
    RunFailed,
    RunCancelled,
    StepStarted,
    StepCompleted,
    StepFailed,
    StepPaused,
    ToolLog,
    Other(String),
}

impl RunEventType {
    pub fn as_str(&self) -> &str {
        match self {
            RunEventType::RunStarted => "run.started",
            RunEventType::RunPaused => "run.paused",
            RunEventType::RunResumed => "run.resumed",
            RunEventType::RunCompleted => "run.completed",
            RunEventType::RunFailed => "run.failed",
            RunEventType::RunCancelled => "run.cancelled",
            RunEventType::StepStarted => "step.started",
            RunEventType::StepCompleted => "step.completed",
            RunEventType::StepFailed => "step.failed",
            RunEventType::StepPaused => "step.paused",
            RunEventType::ToolLog => "tool.log",
            RunEventType::Other(name) => name,
        }
    }
}

impl From<String> for RunEventType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "run.started" => RunEventType::RunStarted,
            "run.paused" => RunEventType::RunPaused,
            "run.resumed" => RunEventType::RunResumed,
            "run.completed" => RunEventType::RunCompleted,
            "run.failed" => RunEventType::RunFailed,
            "run.cancelled" => RunEventType::RunCancelled,
            "step.started" => RunEventType::StepStarted,
            "step.completed" => RunEventType::StepCompleted,
            "step.failed" => RunEventType::StepFailed,
            "step.paused" => RunEventType::StepPaused,
            "tool.log" => RunEventType::ToolLog,
            _ => RunEventType::Other(name),
        }
    }
}

impl From<RunEventType> for String {
    fn from(event_type: RunEventType) -> Self {
        match event_type {
            RunEventType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for RunEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record delivered on the event channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunEvent {
    pub event_type: RunEventType,
    pub run_id: RunId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl RunEvent {
    /// `tool.log` events feed the log buffer and never mark the snapshot dirty.
    pub fn is_log(&self) -> bool {
        self.event_type == RunEventType::ToolLog
    }

    /// Compact one-line summary for logging
    pub fn log_summary(&self) -> String {
        let mut summary = format!("{} run={}", self.event_type, self.run_id);
        if let Some(index) = self.step_index {
            summary.push_str(&format!(" step={}", index));
        }
        if let Some(reason) = &self.reason {
            summary.push_str(&format!(" reason={}", crate::id::short(reason, 40)));
        }
        summary
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
