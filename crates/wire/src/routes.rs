// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! REST routes for one workflow run.

use rw_core::{RunCommand, RunId};

pub const API_PREFIX: &str = "/api/workflow-runs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

rw_core::simple_display! {
    Method {
        Get => "GET",
        Post => "POST",
    }
}

/// Endpoints the monitor talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Full run snapshot
    Snapshot,
    /// `text/event-stream` scoped to the run
    Events,
    Resume,
    Cancel,
}

impl From<RunCommand> for Route {
    fn from(command: RunCommand) -> Self {
        match command {
            RunCommand::Resume => Route::Resume,
            RunCommand::Cancel => Route::Cancel,
        }
    }
}

impl Route {
    pub fn method(self) -> Method {
        match self {
            Route::Snapshot | Route::Events => Method::Get,
            Route::Resume | Route::Cancel => Method::Post,
        }
    }

    /// Path for `run_id`, with the id percent-encoded as one segment.
    pub fn path(self, run_id: &RunId) -> String {
        let base = format!("{}/{}", API_PREFIX, urlencoding::encode(run_id.as_str()));
        match self {
            Route::Snapshot => base,
            Route::Events => format!("{}/events", base),
            Route::Resume => format!("{}/resume", base),
            Route::Cancel => format!("{}/cancel", base),
        }
    }

    /// Absolute URL under `base_url`, tolerating a trailing slash.
    pub fn url(self, base_url: &str, run_id: &RunId) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path(run_id))
    }

    /// Match a request line back to a route. Query strings are ignored.
    pub fn parse(method: &str, path: &str) -> Option<(Route, RunId)> {
        let path = path.split('?').next().unwrap_or(path);
        let rest = path.strip_prefix(API_PREFIX)?.strip_prefix('/')?;
        let (raw_id, tail) = match rest.split_once('/') {
            Some((id, tail)) => (id, Some(tail)),
            None => (rest, None),
        };
        if raw_id.is_empty() {
            return None;
        }
        let route = match (method, tail) {
            ("GET", None) => Route::Snapshot,
            ("GET", Some("events")) => Route::Events,
            ("POST", Some("resume")) => Route::Resume,
            ("POST", Some("cancel")) => Route::Cancel,
            _ => return None,
        };
        let run_id = urlencoding::decode(raw_id).ok()?;
        Some((route, RunId::new(run_id.into_owned())))
    }
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
