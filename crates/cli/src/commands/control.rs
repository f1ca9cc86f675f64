// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rw resume` / `rw cancel`
//!
//! Both open a monitor so the command goes through the same state gate
//! the live view uses, then wait for the refresh the command triggers.

use anyhow::Result;
use chrono::Utc;
use rw_core::{RunCommand, RunId};
use rw_engine::{MonitorHandle, MonitorView};
use std::time::Duration;

use crate::color;
use crate::exit_error::ExitError;
use crate::output::render_run;
use crate::settings::Settings;

pub async fn handle(
    settings: &Settings,
    run_id: RunId,
    command: RunCommand,
    json: bool,
    no_wait: bool,
) -> Result<()> {
    let monitor = super::open_monitor(settings, run_id).await?;
    let result = dispatch(&monitor, command, no_wait, settings.backend.request_timeout).await;
    monitor.close().await;

    let view = result?;
    if json {
        let obj = serde_json::json!({
            "command": command,
            "run": view.run,
        });
        println!("{}", serde_json::to_string_pretty(&obj)?);
        return Ok(());
    }

    println!("{} {}", past_tense(command), color::header(monitor.run_id().as_str()));
    if let Some(run) = &view.run {
        println!();
        render_run(&mut std::io::stdout(), run, Utc::now())?;
    }
    Ok(())
}

async fn dispatch(
    monitor: &MonitorHandle,
    command: RunCommand,
    no_wait: bool,
    timeout: Duration,
) -> Result<MonitorView> {
    let failures_before = monitor.view().fetch_failures;
    let ack = monitor.command(command).await.map_err(ExitError::from)?;
    let Some(seq) = ack.refresh_seq.filter(|_| !no_wait) else {
        return Ok(monitor.view());
    };

    let refreshed = monitor.wait_until(|v| refresh_settled(v, seq, failures_before));
    match tokio::time::timeout(timeout, refreshed).await {
        Ok(Some(view)) => Ok(view),
        _ => {
            tracing::warn!(seq, "refresh after {} did not land", command);
            Ok(monitor.view())
        }
    }
}

/// The refresh `seq` was applied, or a refresh failed after the command.
fn refresh_settled(view: &MonitorView, seq: u64, failures_before: u32) -> bool {
    view.applied_seq >= seq || view.fetch_failures > failures_before
}

fn past_tense(command: RunCommand) -> &'static str {
    match command {
        RunCommand::Resume => "Resumed",
        RunCommand::Cancel => "Cancelled",
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
