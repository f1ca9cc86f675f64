// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot reads.

use async_trait::async_trait;
use rw_core::{InvariantViolation, RunId, WorkflowRun};
use thiserror::Error;

/// Errors from a snapshot read.
///
/// None of these mean the workflow failed; only a fetched `failed` status does.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("run {0} not found")]
    NotFound(RunId),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed snapshot: {0}")]
    Decode(String),
    #[error("invalid snapshot: {0}")]
    Invalid(#[from] InvariantViolation),
}

/// Reads the full current state of a run.
///
/// Implementations are stateless and never retry; retry policy belongs to
/// the caller.
#[async_trait]
pub trait SnapshotFetcher: Clone + Send + Sync + 'static {
    async fn fetch(&self, run_id: &RunId) -> Result<WorkflowRun, FetchError>;
}
