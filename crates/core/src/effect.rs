// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects represent I/O the reconciler needs the monitor runtime to perform

use crate::id::RunId;
use std::time::Duration;

/// Effects produced by the reconciler and executed by the monitor runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    // === Snapshot effects ===
    /// Fetch a full snapshot. The result must be reported back with the same `seq`.
    Fetch {
        run_id: RunId,
        seq: u64,
        /// Issued outside the coalescing discipline (command follow-up, reconnect)
        forced: bool,
    },

    // === Channel effects ===
    /// Open a new event channel tagged with `epoch`
    Subscribe { run_id: RunId, epoch: u64 },

    /// Release the event channel tagged with `epoch`
    Unsubscribe { epoch: u64 },

    // === Timer effects ===
    /// Arm the fetch-retry timer
    ArmRetry { delay: Duration },

    /// Disarm the fetch-retry timer
    DisarmRetry,
}

impl Effect {
    /// Effect name for log spans
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Fetch { .. } => "fetch",
            Effect::Subscribe { .. } => "subscribe",
            Effect::Unsubscribe { .. } => "unsubscribe",
            Effect::ArmRetry { .. } => "arm_retry",
            Effect::DisarmRetry => "disarm_retry",
        }
    }

    /// Key-value pairs for structured logging
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::Fetch { run_id, seq, forced } => vec![
                ("run_id", run_id.to_string()),
                ("seq", seq.to_string()),
                ("forced", forced.to_string()),
            ],
            Effect::Subscribe { run_id, epoch } => {
                vec![("run_id", run_id.to_string()), ("epoch", epoch.to_string())]
            }
            Effect::Unsubscribe { epoch } => vec![("epoch", epoch.to_string())],
            Effect::ArmRetry { delay } => vec![("delay_ms", delay.as_millis().to_string())],
            Effect::DisarmRetry => vec![],
        }
    }

    /// Whether to log both 'started' and 'completed' or a single line,
    /// to control the verbosity for frequent effects.
    pub fn verbose(&self) -> bool {
        match self {
            // Fetches fire on every event burst
            Effect::Fetch { .. } => false,
            Effect::ArmRetry { .. } => false,
            Effect::DisarmRetry => false,
            // Channel lifecycle is rare and worth both lines
            Effect::Subscribe { .. } | Effect::Unsubscribe { .. } => true,
        }
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
