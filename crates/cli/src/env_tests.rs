// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial]
fn empty_values_count_as_unset() {
    std::env::set_var("RW_BASE_URL", "");
    std::env::set_var("RW_TOKEN", "");
    assert_eq!(base_url(), None);
    assert_eq!(token(), None);
    std::env::remove_var("RW_BASE_URL");
    std::env::remove_var("RW_TOKEN");
}

#[test]
#[serial]
fn log_filter_defaults_to_warn() {
    std::env::remove_var("RW_LOG");
    assert_eq!(log_filter(), "warn");

    std::env::set_var("RW_LOG", "rw_engine=debug");
    assert_eq!(log_filter(), "rw_engine=debug");
    std::env::remove_var("RW_LOG");
}

#[test]
#[serial]
fn durations_parse_as_milliseconds() {
    std::env::set_var("RW_REQUEST_TIMEOUT_MS", "2500");
    std::env::set_var("RW_RETRY_BASE_MS", "not-a-number");
    assert_eq!(request_timeout(), Some(Duration::from_millis(2500)));
    assert_eq!(retry_base(), None);
    std::env::remove_var("RW_REQUEST_TIMEOUT_MS");
    std::env::remove_var("RW_RETRY_BASE_MS");
}

#[test]
#[serial]
fn xdg_config_home_wins_over_home() {
    std::env::set_var("XDG_CONFIG_HOME", "/tmp/xdg");
    assert_eq!(default_config_path(), Some(PathBuf::from("/tmp/xdg/runwatch/config.toml")));
    std::env::remove_var("XDG_CONFIG_HOME");
}
