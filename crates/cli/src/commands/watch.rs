// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rw watch` - follow a run until it finishes

use std::io::Write;

use anyhow::Result;
use chrono::Utc;
use rw_core::{PausedReason, RunId, RunStatus};
use rw_engine::{ConnectionState, MonitorView};

use crate::color;
use crate::output::{format_log_line, render_run};
use crate::settings::Settings;

pub async fn handle(settings: &Settings, run_id: RunId, logs: bool) -> Result<()> {
    let monitor = super::open_monitor(settings, run_id).await?;
    let mut views = monitor.watch();
    let mut printer = WatchPrinter::new(logs);
    let mut stdout = std::io::stdout();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let view = views.borrow_and_update().clone();
        printer.print(&mut stdout, &view)?;
        stdout.flush()?;
        if view.is_final {
            break;
        }
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                tracing::debug!("interrupted");
                break;
            }
        }
    }

    monitor.close().await;
    Ok(())
}

/// Where the run stood the last time a line was printed for it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Position {
    status: RunStatus,
    step: usize,
    paused_reason: Option<PausedReason>,
}

/// Turns successive views into an incremental transcript.
pub(crate) struct WatchPrinter {
    logs: bool,
    position: Option<Position>,
    /// Next `LogLine::seq` to print.
    next_log: u64,
    connection: Option<ConnectionState>,
    fetch_error: Option<String>,
}

impl WatchPrinter {
    pub(crate) fn new(logs: bool) -> Self {
        Self { logs, position: None, next_log: 0, connection: None, fetch_error: None }
    }

    pub(crate) fn print(&mut self, out: &mut dyn Write, view: &MonitorView) -> std::io::Result<()> {
        if let Some(run) = &view.run {
            let position = Position {
                status: run.status,
                step: run.current_step_index,
                paused_reason: run.paused_reason,
            };
            match self.position {
                None => {
                    render_run(out, run, Utc::now())?;
                    writeln!(out)?;
                }
                Some(previous) if previous != position => {
                    let step = run
                        .current_step()
                        .map(|(spec, _)| {
                            format!(" step {}/{} {}", position.step + 1, run.step_count(), spec.name)
                        })
                        .unwrap_or_default();
                    let reason = position.paused_reason.map(|r| format!(" ({r})")).unwrap_or_default();
                    writeln!(out, "{} {}{}{}", color::context("status:"), color::status(run.status), reason, step)?;
                }
                Some(_) => {}
            }
            self.position = Some(position);
        }

        if self.logs {
            for line in view.logs_since(self.next_log) {
                writeln!(out, "{}", format_log_line(&line))?;
                self.next_log = line.seq + 1;
            }
        }

        if view.last_fetch_error != self.fetch_error {
            if let Some(error) = &view.last_fetch_error {
                writeln!(out, "{}", color::muted(&format!("refresh failed: {error}")))?;
            }
            self.fetch_error = view.last_fetch_error.clone();
        }

        let connection = Some(view.connection);
        if connection != self.connection {
            if matches!(view.connection, ConnectionState::Reconnecting | ConnectionState::Disconnected) {
                writeln!(out, "{}", color::muted(&format!("event channel {}", view.connection)))?;
            }
            self.connection = connection;
        }

        if view.is_final {
            if let Some(run) = &view.run {
                writeln!(out, "{} {} {}", color::header("Run"), run.id, color::status(run.status))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
