// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Incremental `text/event-stream` decoder.
//!
//! Lines are decoded as they complete and a blank line dispatches the frame,
//! so chunks may split lines or multi-byte characters anywhere.

use std::collections::VecDeque;

/// One dispatched server-sent event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// Value of the `event:` field, if the server named the frame.
    pub event: Option<String>,
    /// `data:` lines joined with `\n`.
    pub data: String,
    pub id: Option<String>,
    /// Reconnection hint in milliseconds.
    pub retry: Option<u64>,
}

/// Largest frame the decoder holds before giving up on it.
pub const MAX_FRAME_BYTES: usize = 1 << 20;

#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Bytes of the line being received.
    line: Vec<u8>,
    /// The previous chunk ended in `\r`; a leading `\n` belongs to it.
    skip_lf: bool,
    /// Part of the current line was discarded with an oversized frame.
    line_dropped: bool,
    frame: PendingFrame,
    ready: VecDeque<SseFrame>,
}

/// Fields collected since the last blank line.
#[derive(Debug, Default)]
struct PendingFrame {
    event: Option<String>,
    data: Vec<String>,
    id: Option<String>,
    retry: Option<u64>,
    /// Raw bytes of the completed lines, terminators included.
    bytes: usize,
    /// Over `MAX_FRAME_BYTES`; dropped at the next blank line.
    oversized: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk. Every byte is examined once; lines may end in `\n`,
    /// `\r\n` or a bare `\r`.
    pub fn push(&mut self, mut chunk: &[u8]) {
        if self.skip_lf {
            self.skip_lf = false;
            if let Some(rest) = chunk.strip_prefix(b"\n") {
                chunk = rest;
            }
        }

        while let Some(pos) = chunk.iter().position(|b| matches!(b, b'\n' | b'\r')) {
            let terminator = match &chunk[pos..] {
                [b'\r', b'\n', ..] => 2,
                [b'\r'] => {
                    self.skip_lf = true;
                    1
                }
                _ => 1,
            };
            self.extend_line(&chunk[..pos]);
            self.end_line(terminator);
            chunk = &chunk[pos + terminator..];
        }
        self.extend_line(chunk);
    }

    /// Bytes received but not yet closed by a blank line.
    pub fn buffered(&self) -> usize {
        if self.frame.oversized {
            return 0;
        }
        self.frame.bytes + self.line.len()
    }

    /// Pop the next complete frame.
    ///
    /// Comment-only blocks (keep-alives) and blocks without `data:` are
    /// consumed and skipped.
    pub fn next_frame(&mut self) -> Option<SseFrame> {
        self.ready.pop_front()
    }

    fn extend_line(&mut self, bytes: &[u8]) {
        if self.frame.oversized {
            self.line_dropped |= !bytes.is_empty();
            return;
        }
        if self.frame.bytes + self.line.len() + bytes.len() > MAX_FRAME_BYTES {
            tracing::warn!(limit = MAX_FRAME_BYTES, "dropping oversized sse frame");
            self.frame.oversized = true;
            self.line.clear();
            self.line_dropped = true;
            return;
        }
        self.line.extend_from_slice(bytes);
    }

    fn end_line(&mut self, terminator: usize) {
        let dropped = std::mem::take(&mut self.line_dropped);
        if self.frame.oversized {
            if !dropped {
                // Blank line closes the frame being dropped
                self.frame = PendingFrame::default();
            }
            return;
        }
        if self.line.is_empty() {
            let frame = std::mem::take(&mut self.frame);
            if let Some(frame) = frame.finish() {
                self.ready.push_back(frame);
            }
            return;
        }
        let line = std::mem::take(&mut self.line);
        self.frame.bytes += line.len() + terminator;
        self.frame.field(&String::from_utf8_lossy(&line));
    }
}

impl PendingFrame {
    fn field(&mut self, line: &str) {
        if line.starts_with(':') {
            return;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" => self.id = Some(value.to_string()),
            "retry" => self.retry = value.parse().ok(),
            other => tracing::trace!(field = other, "ignoring unknown sse field"),
        }
    }

    fn finish(self) -> Option<SseFrame> {
        if self.oversized || self.data.is_empty() {
            return None;
        }
        Some(SseFrame { event: self.event, data: self.data.join("\n"), id: self.id, retry: self.retry })
    }
}

#[cfg(test)]
#[path = "sse_tests.rs"]
mod tests;
