// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rw show` - one-shot snapshot

use anyhow::Result;
use chrono::Utc;
use rw_adapters::SnapshotFetcher;
use rw_core::RunId;

use crate::output::{format_or_json, render_run};
use crate::settings::Settings;

pub async fn handle(settings: &Settings, run_id: RunId, json: bool) -> Result<()> {
    let backend = super::backend(settings)?;
    let run = backend.fetch(&run_id).await.map_err(|e| super::fetch_failure(&run_id, e))?;
    run.validate(&run_id)?;
    format_or_json(json, &run, || render_run(&mut std::io::stdout(), &run, Utc::now()))
}
