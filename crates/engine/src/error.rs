// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error types

use rw_adapters::{FetchError, TransportError};
use rw_core::{RunCommand, RunStatus};
use thiserror::Error;

/// Why a resume/cancel did not happen or did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("cannot {command} a {status} run")]
    InvalidState { command: RunCommand, status: RunStatus },
    #[error("run is not loaded yet")]
    NotLoaded,
    #[error("{0} already in flight")]
    InFlight(RunCommand),
    #[error("monitor is closed")]
    Closed,
    #[error("{command} failed: {source}")]
    Transport {
        command: RunCommand,
        #[source]
        source: TransportError,
    },
}

impl CommandError {
    /// Rejected locally, before anything was sent.
    pub fn is_rejected(&self) -> bool {
        !matches!(self, CommandError::Transport { .. })
    }
}

/// Opening a monitor failed; nothing was subscribed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpenError {
    #[error("initial fetch failed: {0}")]
    Fetch(#[from] FetchError),
}
