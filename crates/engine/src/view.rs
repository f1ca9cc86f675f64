// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! What the presentation layer reads.

use chrono::{DateTime, Utc};
use rw_core::{LogLine, RunCommand, RunStatus, SharedLogBuffer, WorkflowRun};

/// Health of the event channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Not subscribed yet, or the first subscription has not connected.
    Connecting,
    Connected,
    /// The channel failed and a fresh subscription is being attempted.
    Reconnecting,
    /// Re-subscription failed; the last snapshot stays visible.
    Disconnected,
    /// The monitor unsubscribed for good (terminal run or close).
    Closed,
}

rw_core::simple_display! {
    ConnectionState {
        Connecting => "connecting",
        Connected => "connected",
        Reconnecting => "reconnecting",
        Disconnected => "disconnected",
        Closed => "closed",
    }
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}

/// Point-in-time copy of a monitor's state.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorView {
    /// Latest applied snapshot; `None` before the first one or after close.
    pub run: Option<WorkflowRun>,
    pub connection: ConnectionState,
    /// `tool.log` lines, shared with the monitor rather than copied.
    pub logs: SharedLogBuffer,
    /// Lines appended when this view was taken; later lines belong to a
    /// later view.
    pub log_count: u64,
    /// Sequence number of the newest snapshot applied (or skipped as stale).
    pub applied_seq: u64,
    pub pending_command: Option<RunCommand>,
    /// Local time the current snapshot was applied.
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Last refresh failure, cleared by the next successful one.
    pub last_fetch_error: Option<String>,
    pub fetch_failures: u32,
    /// The run reached a terminal status; nothing will change any more.
    pub is_final: bool,
}

impl Default for MonitorView {
    fn default() -> Self {
        Self {
            run: None,
            connection: ConnectionState::Connecting,
            logs: SharedLogBuffer::default(),
            log_count: 0,
            applied_seq: 0,
            pending_command: None,
            last_synced_at: None,
            last_fetch_error: None,
            fetch_failures: 0,
            is_final: false,
        }
    }
}

impl MonitorView {
    pub fn connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Held log lines up to this view.
    pub fn log_lines(&self) -> Vec<LogLine> {
        self.logs_since(0)
    }

    /// Held log lines with `seq >= from`, up to this view.
    pub fn logs_since(&self, from: u64) -> Vec<LogLine> {
        self.logs.range(from, self.log_count)
    }

    pub fn status(&self) -> Option<RunStatus> {
        self.run.as_ref().map(|run| run.status)
    }

    /// Whether the affordance for `command` should be enabled.
    pub fn allows(&self, command: RunCommand) -> bool {
        self.pending_command.is_none() && self.status().is_some_and(|s| command.permits(s))
    }
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
