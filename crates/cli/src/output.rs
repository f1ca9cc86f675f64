// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use chrono::{DateTime, Utc};
use rw_core::{LogLine, WorkflowRun};
use serde::Serialize;

use crate::color;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

/// Format a duration in seconds as a short age (e.g., "5s", "2m", "1h", "3d")
pub fn format_elapsed(secs: u64) -> String {
    match secs {
        s if s < 60 => format!("{s}s"),
        s if s < 3600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h", s / 3600),
        s => format!("{}d", s / 86_400),
    }
}

/// Format a timestamp as time before `now`.
pub fn format_time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds().max(0) as u64;
    format!("{} ago", format_elapsed(secs))
}

/// Format-branch helper: JSON when `json` is set, otherwise calls `text_fn`.
pub fn format_or_json<T: Serialize>(
    json: bool,
    data: &T,
    text_fn: impl FnOnce() -> std::io::Result<()>,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(data)?);
    } else {
        text_fn()?;
    }
    Ok(())
}

/// Render a snapshot for `rw show` and friends.
pub fn render_run(out: &mut dyn Write, run: &WorkflowRun, now: DateTime<Utc>) -> std::io::Result<()> {
    writeln!(out, "{} {}", color::header("Run:"), run.id)?;
    writeln!(out, "  {} {}", color::context("Workflow:"), run.spec_snapshot.name)?;
    match run.paused_reason {
        Some(reason) => {
            writeln!(out, "  {} {} ({})", color::context("Status:"), color::status(run.status), reason)?
        }
        None => writeln!(out, "  {} {}", color::context("Status:"), color::status(run.status))?,
    }
    if let Some((spec, _)) = run.current_step() {
        writeln!(
            out,
            "  {} {}/{} {}",
            color::context("Step:"),
            run.current_step_index + 1,
            run.step_count(),
            spec.name
        )?;
    }
    writeln!(
        out,
        "  {} {}",
        color::context("Activity:"),
        format_time_ago(run.last_activity_at, now)
    )?;

    if run.step_count() == 0 {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "  {}", color::header("Steps:"))?;
    for (spec, state) in run.steps() {
        let attempts = match state.attempts {
            0 | 1 => String::new(),
            n => color::muted(&format!("{n} attempts")),
        };
        let line = format!("    {:<12} {:<10} {}", spec.name, state.status.to_string(), attempts);
        writeln!(out, "{}", line.trim_end())?;
        if let Some(error) = &state.error_message {
            writeln!(out, "      {} {}", color::context("error:"), error)?;
        }
    }
    Ok(())
}

/// One `tool.log` line as streamed by `rw watch`.
pub fn format_log_line(line: &LogLine) -> String {
    match line.step_index {
        Some(step) => format!("{} {}", color::muted(&format!("[{}]", step + 1)), line.text),
        None => line.text.clone(),
    }
}
