// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rw show`

use crate::prelude::*;

#[test]
fn show_renders_snapshot() {
    let server = FakeServer::start().with_run(run_json("paused", 1));

    cli()
        .against(&server)
        .args(&["show", "run-1"])
        .passes()
        .stdout_has("Run: run-1")
        .stdout_has("Workflow: deploy")
        .stdout_has("Status: paused (awaiting approval)")
        .stdout_has("Step: 2/3 test");

    similar_asserts::assert_eq!(server.requests(), vec!["GET /api/workflow-runs/run-1".to_string()]);
}

#[test]
fn show_json_is_the_snapshot() {
    let server = FakeServer::start().with_run(run_json("running", 0));

    let out = cli().against(&server).args(&["show", "run-1", "--json"]).passes();
    let run = out.stdout_json();
    assert_eq!(run["id"], "run-1");
    assert_eq!(run["status"], "running");
    assert_eq!(run["steps_state"].as_array().map(Vec::len), Some(3));
}

#[test]
fn unknown_run_fails() {
    let server = FakeServer::start().with_run(run_json("running", 0));

    cli().against(&server).args(&["show", "nope"]).fails_with(1).stderr_has("run not found: nope");
}

#[test]
fn inconsistent_snapshot_is_rejected() {
    let mut run = run_json("running", 0);
    run["steps_state"] = json!([]);
    let server = FakeServer::start().with_run(run);

    cli().against(&server).args(&["show", "run-1"]).fails_with(1).stderr_has("step states");
}
