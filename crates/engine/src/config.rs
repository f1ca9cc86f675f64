// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Monitor tuning.

use std::time::Duration;

pub const DEFAULT_RETRY_BASE: Duration = Duration::from_millis(500);
pub const DEFAULT_RETRY_MAX: Duration = Duration::from_secs(30);

/// Tuning for one run monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Delay before retrying the first failed refresh.
    pub retry_base: Duration,
    /// Upper bound on the retry delay.
    pub retry_max: Duration,
    /// Re-subscriptions allowed after a channel error before the monitor
    /// reports itself disconnected. Reset by every successful connect.
    pub resubscribe_attempts: u32,
    /// Keep at most this many log lines; `None` keeps all of them.
    pub log_capacity: Option<usize>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            retry_base: DEFAULT_RETRY_BASE,
            retry_max: DEFAULT_RETRY_MAX,
            resubscribe_attempts: 1,
            log_capacity: None,
        }
    }
}

impl MonitorConfig {
    rw_core::setters! {
        set {
            retry_base: Duration,
            retry_max: Duration,
            resubscribe_attempts: u32,
        }
        option {
            log_capacity: usize,
        }
    }

    /// Backoff after `failures` consecutive failed refreshes:
    /// `retry_base * 2^(failures - 1)`, capped at `retry_max`.
    pub fn retry_delay(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(20);
        self.retry_base.saturating_mul(1 << exponent).min(self.retry_max)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
