// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{RunEvent, RunEventType, RunId};
use chrono::{DateTime, TimeZone, Utc};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for run model types.
pub mod strategies {
    use crate::run::{PausedReason, RunStatus};
    use crate::RunEventType;
    use proptest::prelude::*;

    pub fn arb_run_status() -> impl Strategy<Value = RunStatus> {
        prop_oneof![
            Just(RunStatus::Pending),
            Just(RunStatus::Running),
            Just(RunStatus::Paused),
            Just(RunStatus::Completed),
            Just(RunStatus::Failed),
            Just(RunStatus::Cancelled),
        ]
    }

    pub fn arb_paused_reason() -> impl Strategy<Value = PausedReason> {
        prop_oneof![
            Just(PausedReason::AwaitingApproval),
            Just(PausedReason::StepFailed),
            Just(PausedReason::EngineInterrupted),
        ]
    }

    /// Event types that mark the snapshot dirty (everything but `tool.log`).
    pub fn arb_state_event_type() -> impl Strategy<Value = RunEventType> {
        prop_oneof![
            Just(RunEventType::RunStarted),
            Just(RunEventType::RunPaused),
            Just(RunEventType::RunResumed),
            Just(RunEventType::StepStarted),
            Just(RunEventType::StepCompleted),
            Just(RunEventType::StepFailed),
            Just(RunEventType::StepPaused),
            "[a-z]{1,8}\\.[a-z]{1,8}".prop_map(RunEventType::from),
        ]
        .prop_filter("tool.log is not a state event", |t| *t != RunEventType::ToolLog)
    }
}

// ── Event factory functions ─────────────────────────────────────────────────

/// Fixed timestamp used by event factories.
pub fn event_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).single().unwrap_or_default()
}

pub fn run_event(run_id: &str, event_type: RunEventType) -> RunEvent {
    RunEvent {
        event_type,
        run_id: RunId::new(run_id),
        step_index: None,
        reason: None,
        log: None,
        timestamp: event_time(),
    }
}

pub fn step_event(run_id: &str, event_type: RunEventType, step_index: usize) -> RunEvent {
    RunEvent { step_index: Some(step_index), ..run_event(run_id, event_type) }
}

pub fn log_event(run_id: &str, text: &str) -> RunEvent {
    RunEvent { log: Some(text.to_string()), ..run_event(run_id, RunEventType::ToolLog) }
}

pub fn paused_event(run_id: &str, step_index: usize, reason: &str) -> RunEvent {
    RunEvent {
        step_index: Some(step_index),
        reason: Some(reason.to_string()),
        ..run_event(run_id, RunEventType::RunPaused)
    }
}
