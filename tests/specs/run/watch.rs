// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rw watch`

use crate::prelude::*;
use std::time::Duration;

fn event(event_type: &str, extra: Value) -> Value {
    let mut event = json!({
        "event_type": event_type,
        "run_id": "run-1",
        "timestamp": "2026-01-01T00:00:01Z",
    });
    if let (Some(event), Some(extra)) = (event.as_object_mut(), extra.as_object()) {
        event.extend(extra.clone());
    }
    event
}

#[test]
fn watch_streams_logs_until_terminal() {
    let server = FakeServer::start().with_run(run_json("running", 0)).stream(vec![
        StreamStep::Event(event("tool.log", json!({ "step_index": 0, "log": "compiling" }))),
        StreamStep::Sleep(Duration::from_millis(50)),
        StreamStep::SetRun(run_json("completed", 3)),
        StreamStep::Event(event("run.completed", json!({}))),
    ]);

    cli()
        .against(&server)
        .args(&["watch", "run-1"])
        .passes()
        .stdout_has("Run: run-1")
        .stdout_has("[1] compiling")
        .stdout_has("Run run-1 completed");
}

#[test]
fn watch_follows_status_changes() {
    let server = FakeServer::start().with_run(run_json("running", 0)).stream(vec![
        StreamStep::SetRun(run_json("paused", 1)),
        StreamStep::Event(event("run.paused", json!({ "step_index": 1, "reason": "approval" }))),
        StreamStep::Sleep(Duration::from_millis(200)),
        StreamStep::SetRun(run_json("failed", 1)),
        StreamStep::Event(event("run.failed", json!({}))),
    ]);

    cli()
        .against(&server)
        .args(&["watch", "run-1", "--no-logs"])
        .passes()
        .stdout_has("status: paused (awaiting approval) step 2/3 test")
        .stdout_has("Run run-1 failed");
}

#[test]
fn watch_of_finished_run_never_subscribes() {
    let server = FakeServer::start().with_run(run_json("cancelled", 1));

    cli().against(&server).args(&["watch", "run-1"]).passes().stdout_has("Run run-1 cancelled");

    assert!(server.requests().iter().all(|r| !r.ends_with("/events")));
}
