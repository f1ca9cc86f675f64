// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Where `rw` finds its backend.

use crate::prelude::*;

#[test]
fn missing_base_url_fails() {
    cli().args(&["show", "run-1"]).fails_with(1).stderr_has("RW_BASE_URL");
}

#[test]
fn base_url_from_config_file() {
    let server = FakeServer::start().with_run(run_json("running", 0));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, format!("base_url = \"{}\"\n", server.base_url())).unwrap();

    cli()
        .env("RW_CONFIG", path.to_str().unwrap())
        .args(&["show", "run-1"])
        .passes()
        .stdout_has("Run: run-1");
}

#[test]
fn flag_overrides_environment() {
    let server = FakeServer::start().with_run(run_json("running", 0));

    cli()
        .env("RW_BASE_URL", "http://127.0.0.1:1")
        .args(&["show", "run-1", "--base-url", server.base_url()])
        .passes()
        .stdout_has("Run: run-1");
}

#[test]
fn explicit_config_file_must_exist() {
    cli()
        .env("RW_CONFIG", "/nonexistent/rw-specs/config.toml")
        .args(&["show", "run-1"])
        .fails_with(1)
        .stderr_has("reading config");
}
