// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rw-engine: keeps one workflow run's view in sync with the backend.
//!
//! [`RunReconciler`] holds the rules and performs no I/O; [`monitor`]
//! runs it on a tokio task against a [`rw_adapters::RunBackend`].

mod config;
mod dispatcher;
mod error;
pub mod monitor;
mod reconciler;
mod view;

pub use config::{MonitorConfig, DEFAULT_RETRY_BASE, DEFAULT_RETRY_MAX};
pub use dispatcher::{check as check_command, CommandAck, Dispatcher};
pub use error::{CommandError, OpenError};
pub use monitor::{open, MonitorHandle};
pub use reconciler::{Phase, RunReconciler};
pub use view::{ConnectionState, MonitorView};
