// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fluent helpers for running the `rw` binary.

pub use crate::server::{run_json, FakeServer, StreamStep};
pub use serde_json::{json, Value};

/// An `rw` invocation isolated from the caller's config and environment.
pub fn cli() -> Cli {
    let mut cmd = assert_cmd::Command::cargo_bin("rw").expect("rw binary not built");
    for key in [
        "RW_BASE_URL",
        "RW_TOKEN",
        "RW_CONFIG",
        "RW_LOG",
        "RW_LOG_DIR",
        "RW_REQUEST_TIMEOUT_MS",
        "RW_RETRY_BASE_MS",
        "RW_RETRY_MAX_MS",
        "COLOR",
    ] {
        cmd.env_remove(key);
    }
    cmd.env("NO_COLOR", "1")
        .env("XDG_CONFIG_HOME", "/nonexistent/rw-specs")
        .timeout(std::time::Duration::from_secs(20));
    Cli { cmd }
}

pub struct Cli {
    cmd: assert_cmd::Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Point the binary at `server`.
    pub fn against(self, server: &FakeServer) -> Self {
        self.env("RW_BASE_URL", server.base_url())
    }

    pub fn passes(mut self) -> Output {
        let output = self.cmd.output().expect("failed to run rw");
        let out = Output::from(output.clone());
        assert!(output.status.success(), "rw failed\nstdout:\n{}\nstderr:\n{}", out.stdout, out.stderr);
        out
    }

    pub fn fails_with(mut self, code: i32) -> Output {
        let output = self.cmd.output().expect("failed to run rw");
        let out = Output::from(output.clone());
        assert_eq!(
            output.status.code(),
            Some(code),
            "unexpected exit\nstdout:\n{}\nstderr:\n{}",
            out.stdout,
            out.stderr
        );
        out
    }
}

pub struct Output {
    pub stdout: String,
    pub stderr: String,
}

impl From<std::process::Output> for Output {
    fn from(output: std::process::Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

impl Output {
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout missing {needle:?}:\n{}", self.stdout);
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(!self.stdout.contains(needle), "stdout unexpectedly has {needle:?}:\n{}", self.stdout);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr missing {needle:?}:\n{}", self.stderr);
        self
    }

    pub fn stdout_json(&self) -> Value {
        serde_json::from_str(&self.stdout).expect("stdout is not JSON")
    }
}
