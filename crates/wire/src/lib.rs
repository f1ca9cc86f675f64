// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire shapes for the workflow run backend.
//!
//! REST routes, `text/event-stream` framing and the `run.event` envelope.
//! Nothing here performs I/O.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod envelope;
mod routes;
mod sse;

pub use envelope::{decode_run_event, encode_run_event, ProtocolError, KEEP_ALIVE, RUN_EVENT};
pub use routes::{Method, Route, API_PREFIX};
pub use sse::{SseDecoder, SseFrame};

#[cfg(test)]
mod property_tests;
