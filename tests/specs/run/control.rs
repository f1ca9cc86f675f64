// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rw resume` / `rw cancel`

use crate::prelude::*;

#[test]
fn resume_shows_refreshed_snapshot() {
    let server = FakeServer::start()
        .with_run(run_json("paused", 1))
        .after_command("resume", run_json("running", 1));

    cli()
        .against(&server)
        .args(&["resume", "run-1"])
        .passes()
        .stdout_has("Resumed run-1")
        .stdout_has("Status: running");

    similar_asserts::assert_eq!(server.posts(), vec!["POST /api/workflow-runs/run-1/resume".to_string()]);
}

#[test]
fn resume_json_reports_command_and_run() {
    let server = FakeServer::start()
        .with_run(run_json("paused", 1))
        .after_command("resume", run_json("running", 1));

    let out = cli().against(&server).args(&["resume", "run-1", "--json"]).passes();
    let body = out.stdout_json();
    assert_eq!(body["command"], "resume");
    assert_eq!(body["run"]["status"], "running");
}

#[test]
fn resume_of_running_run_is_rejected_without_request() {
    let server = FakeServer::start().with_run(run_json("running", 0));

    cli()
        .against(&server)
        .args(&["resume", "run-1"])
        .fails_with(2)
        .stderr_has("cannot resume a running run");

    assert!(server.posts().is_empty());
}

#[test]
fn cancel_of_finished_run_is_rejected() {
    let server = FakeServer::start().with_run(run_json("completed", 3));

    cli()
        .against(&server)
        .args(&["cancel", "run-1"])
        .fails_with(2)
        .stderr_has("cannot cancel a completed run");

    assert!(server.posts().is_empty());
}

#[test]
fn refused_cancel_reports_server_status() {
    let server = FakeServer::start().with_run(run_json("running", 0)).refuse_commands(409);

    cli()
        .against(&server)
        .args(&["cancel", "run-1"])
        .fails_with(1)
        .stderr_has("409");

    similar_asserts::assert_eq!(server.posts(), vec!["POST /api/workflow-runs/run-1/cancel".to_string()]);
}

#[test]
fn cancel_without_waiting_still_succeeds() {
    let server = FakeServer::start()
        .with_run(run_json("running", 0))
        .after_command("cancel", run_json("cancelled", 0));

    cli()
        .against(&server)
        .args(&["cancel", "run-1", "--no-wait"])
        .passes()
        .stdout_has("Cancelled run-1");
}
