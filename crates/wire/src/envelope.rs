// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `run.event` envelope carried on the event stream.

use crate::sse::SseFrame;
use rw_core::RunEvent;
use thiserror::Error;

/// Frame name carrying a JSON [`RunEvent`].
pub const RUN_EVENT: &str = "run.event";

/// Comment frame a server sends to keep an idle stream open.
pub const KEEP_ALIVE: &str = ": keep-alive\n\n";

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed run.event payload: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
        /// Leading part of the offending payload
        preview: String,
    },

    #[error("failed to encode run.event: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Decode a frame into a [`RunEvent`].
///
/// Frames named anything other than `run.event` are not ours and decode to
/// `None`. Unnamed frames are treated as `run.event`.
pub fn decode_run_event(frame: &SseFrame) -> Result<Option<RunEvent>, ProtocolError> {
    if let Some(name) = frame.event.as_deref() {
        if name != RUN_EVENT {
            tracing::trace!(event = name, "skipping foreign sse frame");
            return Ok(None);
        }
    }
    serde_json::from_str(&frame.data).map(Some).map_err(|source| ProtocolError::Json {
        source,
        preview: rw_core::short(&frame.data, 80).to_string(),
    })
}

/// Encode an event as one complete `run.event` frame.
pub fn encode_run_event(event: &RunEvent) -> Result<String, ProtocolError> {
    let data = serde_json::to_string(event).map_err(ProtocolError::Encode)?;
    Ok(format!("event: {}\ndata: {}\n\n", RUN_EVENT, data))
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
