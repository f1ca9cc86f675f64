// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

use std::path::PathBuf;
use std::time::Duration;

/// Log filter used when `RW_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn millis(key: &str) -> Option<Duration> {
    std::env::var(key).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

/// Backend base URL, e.g. `http://localhost:8080`.
pub fn base_url() -> Option<String> {
    non_empty("RW_BASE_URL")
}

/// Bearer token sent with every backend request.
pub fn token() -> Option<String> {
    non_empty("RW_TOKEN")
}

/// `tracing` filter directives.
pub fn log_filter() -> String {
    non_empty("RW_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

/// When set, logs go to a daily file in this directory instead of stderr.
pub fn log_dir() -> Option<PathBuf> {
    non_empty("RW_LOG_DIR").map(PathBuf::from)
}

/// Explicit config file. Unlike the default location it must exist.
pub fn config_override() -> Option<PathBuf> {
    non_empty("RW_CONFIG").map(PathBuf::from)
}

/// Default config file: XDG_CONFIG_HOME/runwatch > ~/.config/runwatch
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(xdg) = non_empty("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg).join("runwatch/config.toml"));
    }
    dirs::home_dir().map(|home| home.join(".config/runwatch/config.toml"))
}

/// Per-request timeout for snapshot and command calls.
pub fn request_timeout() -> Option<Duration> {
    millis("RW_REQUEST_TIMEOUT_MS")
}

pub fn retry_base() -> Option<Duration> {
    millis("RW_RETRY_BASE_MS")
}

pub fn retry_max() -> Option<Duration> {
    millis("RW_RETRY_MAX_MS")
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
