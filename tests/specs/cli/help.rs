// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help output specs

use crate::prelude::*;

#[test]
fn help_lists_every_command() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("Usage:")
        .stdout_has("show")
        .stdout_has("watch")
        .stdout_has("resume")
        .stdout_has("cancel");
}

#[test]
fn resume_help_mentions_json_and_no_wait() {
    cli().args(&["resume", "--help"]).passes().stdout_has("--json").stdout_has("--no-wait");
}

#[test]
fn version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has(env!("CARGO_PKG_VERSION"));
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    cli().fails_with(2).stderr_has("Usage:");
}
