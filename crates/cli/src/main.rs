// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rw - watch and control workflow runs from the terminal

mod color;
mod commands;
mod env;
mod exit_error;
mod logging;
mod output;
mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rw_core::{RunCommand, RunId};

use crate::exit_error::{ExitError, FAILURE};
use crate::settings::{Flags, Settings};

#[derive(Parser)]
#[command(name = "rw", version, about = "Watch and control workflow runs", styles = color::styles())]
struct Cli {
    /// Backend base URL (overrides RW_BASE_URL and the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Bearer token for the backend (overrides RW_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a run's current snapshot
    Show {
        run_id: String,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Follow a run live until it finishes
    Watch {
        run_id: String,

        /// Do not stream tool log lines
        #[arg(long)]
        no_logs: bool,
    },
    /// Resume a paused run
    Resume {
        run_id: String,

        #[arg(long)]
        json: bool,

        /// Return once the backend accepts, without waiting for the refresh
        #[arg(long)]
        no_wait: bool,
    },
    /// Cancel a running or paused run
    Cancel {
        run_id: String,

        #[arg(long)]
        json: bool,

        /// Return once the backend accepts, without waiting for the refresh
        #[arg(long)]
        no_wait: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_dir = env::log_dir();
    let _guard = match logging::init(&env::log_filter(), log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("warning: file logging unavailable: {e}");
            None
        }
    };

    if let Err(e) = run(cli).await {
        let code = match e.downcast_ref::<ExitError>() {
            Some(exit) => exit.code,
            None => FAILURE,
        };
        eprintln!("error: {e:#}");
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(Flags { base_url: cli.base_url, token: cli.token })?;
    tracing::debug!(base_url = %settings.backend.base_url, "settings loaded");

    match cli.command {
        Command::Show { run_id, json } => {
            commands::show::handle(&settings, RunId::new(run_id), json).await
        }
        Command::Watch { run_id, no_logs } => {
            commands::watch::handle(&settings, RunId::new(run_id), !no_logs).await
        }
        Command::Resume { run_id, json, no_wait } => {
            let run_id = RunId::new(run_id);
            commands::control::handle(&settings, run_id, RunCommand::Resume, json, no_wait).await
        }
        Command::Cancel { run_id, json, no_wait } => {
            let run_id = RunId::new(run_id);
            commands::control::handle(&settings, run_id, RunCommand::Cancel, json, no_wait).await
        }
    }
}
