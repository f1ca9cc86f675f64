// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control command transport.

use async_trait::async_trait;
use rw_core::{RunCommand, RunId, WorkflowRun};
use thiserror::Error;

/// A command did not reach the backend or was refused by it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Sends resume/cancel to the backend.
///
/// The returned run, if the backend sent one, is informational only and
/// must never replace a fetched snapshot.
#[async_trait]
pub trait RunCommander: Clone + Send + Sync + 'static {
    async fn send(
        &self,
        run_id: &RunId,
        command: RunCommand,
    ) -> Result<Option<WorkflowRun>, TransportError>;
}
