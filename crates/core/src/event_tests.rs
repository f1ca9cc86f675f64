// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[yare::parameterized(
    run_started    = { "run.started",    RunEventType::RunStarted },
    run_paused     = { "run.paused",     RunEventType::RunPaused },
    run_resumed    = { "run.resumed",    RunEventType::RunResumed },
    run_completed  = { "run.completed",  RunEventType::RunCompleted },
    run_failed     = { "run.failed",     RunEventType::RunFailed },
    run_cancelled  = { "run.cancelled",  RunEventType::RunCancelled },
    step_started   = { "step.started",   RunEventType::StepStarted },
    step_completed = { "step.completed", RunEventType::StepCompleted },
    step_failed    = { "step.failed",    RunEventType::StepFailed },
    step_paused    = { "step.paused",    RunEventType::StepPaused },
    tool_log       = { "tool.log",       RunEventType::ToolLog },
)]
fn known_event_types_parse(name: &str, expected: RunEventType) {
    assert_eq!(RunEventType::from(name.to_string()), expected);
    assert_eq!(expected.as_str(), name);
}

#[test]
fn unknown_event_type_is_preserved() {
    let parsed = RunEventType::from("approval.requested".to_string());
    assert_eq!(parsed, RunEventType::Other("approval.requested".to_string()));
    assert_eq!(String::from(parsed), "approval.requested");
}

#[test]
fn deserializes_log_event() {
    let event: RunEvent = serde_json::from_value(json!({
        "event_type": "tool.log",
        "run_id": "run-1",
        "step_index": 2,
        "log": "compiling rw-core",
        "timestamp": "2026-03-01T10:00:00Z"
    }))
    .unwrap();

    assert!(event.is_log());
    assert_eq!(event.step_index, Some(2));
    assert_eq!(event.log.as_deref(), Some("compiling rw-core"));
}

#[test]
fn deserializes_status_event_without_optionals() {
    let event: RunEvent = serde_json::from_value(json!({
        "event_type": "run.completed",
        "run_id": "run-1",
        "timestamp": "2026-03-01T10:00:00Z"
    }))
    .unwrap();

    assert!(!event.is_log());
    assert_eq!(event.event_type, RunEventType::RunCompleted);
    assert!(event.step_index.is_none());
    assert!(event.reason.is_none());
}

#[test]
fn event_without_timestamp_is_rejected() {
    let result = serde_json::from_value::<RunEvent>(json!({
        "event_type": "step.started",
        "run_id": "run-1"
    }));
    assert!(result.is_err());
}

#[test]
fn log_summary_includes_step_and_reason() {
    let event: RunEvent = serde_json::from_value(json!({
        "event_type": "step.failed",
        "run_id": "run-9",
        "step_index": 1,
        "reason": "exit status 2",
        "timestamp": "2026-03-01T10:00:00Z"
    }))
    .unwrap();

    assert_eq!(event.log_summary(), "step.failed run=run-9 step=1 reason=exit status 2");
}
