// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Duration;
use rw_core::test_support::event_time;
use rw_core::{PausedReason, RunStatus, StepState, StepStatus};
use serial_test::serial;
use yare::parameterized;

fn no_color() {
    std::env::set_var("NO_COLOR", "1");
}

fn render(run: &WorkflowRun, now: DateTime<Utc>) -> String {
    let mut out = Vec::new();
    render_run(&mut out, run, now).unwrap();
    String::from_utf8(out).unwrap()
}

#[parameterized(
    seconds = { 5, "5s" },
    just_under_a_minute = { 59, "59s" },
    minutes = { 125, "2m" },
    hours = { 7200, "2h" },
    days = { 3 * 86_400, "3d" },
)]
fn elapsed_formats(secs: u64, expected: &str) {
    assert_eq!(format_elapsed(secs), expected);
}

#[test]
fn time_ago_clamps_future_timestamps() {
    let now = event_time();
    assert_eq!(format_time_ago(now + Duration::seconds(30), now), "0s ago");
    assert_eq!(format_time_ago(now - Duration::seconds(90), now), "1m ago");
}

#[test]
#[serial]
fn renders_paused_run_with_reason_and_current_step() {
    no_color();
    let run = WorkflowRun::builder()
        .paused(PausedReason::AwaitingApproval)
        .current_step_index(1)
        .build();

    let text = render(&run, event_time() + Duration::seconds(5));
    assert!(text.starts_with("Run: run-1\n"));
    assert!(text.contains("Workflow: deploy"));
    assert!(text.contains("Status: paused (awaiting approval)"));
    assert!(text.contains("Step: 2/3 test"));
    assert!(text.contains("Activity: 5s ago"));
    assert!(text.contains("    build        completed\n"));
    assert!(text.contains("    test         paused\n"));
}

#[test]
#[serial]
fn terminal_run_has_no_current_step() {
    no_color();
    let run = WorkflowRun::builder().status(RunStatus::Completed).current_step_index(3).build();

    let text = render(&run, event_time());
    assert!(!text.contains("Step:"));
    assert!(text.contains("Status: completed"));
}

#[test]
#[serial]
fn step_errors_and_retries_are_shown() {
    no_color();
    let run = WorkflowRun::builder()
        .status(RunStatus::Failed)
        .current_step_index(1)
        .step_state(
            StepState::builder()
                .step_index(1)
                .status(StepStatus::Failed)
                .attempts(3)
                .error_message("exit code 2")
                .build(),
        )
        .build();

    let text = render(&run, event_time());
    assert!(text.contains("    test         failed     3 attempts\n"));
    assert!(text.contains("      error: exit code 2\n"));
}

#[test]
#[serial]
fn log_lines_carry_one_based_step() {
    no_color();
    let line = LogLine { seq: 0, step_index: Some(0), text: "compiling".into(), timestamp: event_time() };
    assert_eq!(format_log_line(&line), "[1] compiling");

    let bare = LogLine { step_index: None, ..line };
    assert_eq!(format_log_line(&bare), "compiling");
}
