// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod control;
pub mod show;
pub mod watch;

use anyhow::Result;
use rw_adapters::{FetchError, HttpBackend};
use rw_core::{RunId, SystemClock};
use rw_engine::{MonitorHandle, OpenError};

use crate::exit_error::{ExitError, FAILURE};
use crate::settings::Settings;

pub(crate) fn backend(settings: &Settings) -> Result<HttpBackend> {
    Ok(HttpBackend::new(settings.backend.clone())?)
}

/// Open a live monitor, mapping a failed baseline to a user-facing error.
pub(crate) async fn open_monitor(settings: &Settings, run_id: RunId) -> Result<MonitorHandle> {
    let backend = backend(settings)?;
    match rw_engine::open(backend, SystemClock, run_id.clone(), settings.monitor.clone()).await {
        Ok(handle) => Ok(handle),
        Err(OpenError::Fetch(e)) => Err(fetch_failure(&run_id, e)),
    }
}

pub(crate) fn fetch_failure(run_id: &RunId, err: FetchError) -> anyhow::Error {
    match err {
        FetchError::NotFound(_) => ExitError::new(FAILURE, format!("run not found: {run_id}")).into(),
        other => ExitError::new(FAILURE, format!("cannot load run {run_id}: {other}")).into(),
    }
}
