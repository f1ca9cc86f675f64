// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    first   = { 1,  500 },
    second  = { 2,  1_000 },
    third   = { 3,  2_000 },
    capped  = { 8,  30_000 },
    huge    = { 90, 30_000 },
    zero    = { 0,  500 },
)]
fn retry_delay(failures: u32, expected_ms: u64) {
    let config = MonitorConfig::default();
    assert_eq!(config.retry_delay(failures), Duration::from_millis(expected_ms));
}

#[test]
fn setters_override_defaults() {
    let config = MonitorConfig::default()
        .retry_base(Duration::from_millis(10))
        .retry_max(Duration::from_millis(25))
        .resubscribe_attempts(3)
        .log_capacity(100usize);
    assert_eq!(config.retry_delay(3), Duration::from_millis(25));
    assert_eq!(config.resubscribe_attempts, 3);
    assert_eq!(config.log_capacity, Some(100));
}
