// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only buffer of `tool.log` lines for one monitored run.

use crate::event::RunEvent;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;

/// One log line as delivered by a `tool.log` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// Position in delivery order, counting lines evicted by a capacity limit.
    pub seq: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_index: Option<usize>,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Lines are kept in delivery order. With a capacity set, the oldest lines
/// are evicted; `seq` keeps counting so readers can detect the gap.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    lines: VecDeque<LogLine>,
    capacity: Option<usize>,
    appended: u64,
}

impl LogBuffer {
    pub fn new(capacity: Option<usize>) -> Self {
        Self { lines: VecDeque::new(), capacity, appended: 0 }
    }

    /// Append the payload of a `tool.log` event. Events without a `log`
    /// payload are ignored; returns whether a line was appended.
    pub fn push_event(&mut self, event: &RunEvent) -> bool {
        let Some(text) = event.log.as_ref() else {
            return false;
        };
        self.push(event.step_index, text.clone(), event.timestamp);
        true
    }

    pub fn push(&mut self, step_index: Option<usize>, text: String, timestamp: DateTime<Utc>) {
        let line = LogLine { seq: self.appended, step_index, text, timestamp };
        self.appended += 1;
        self.lines.push_back(line);
        if let Some(capacity) = self.capacity {
            while self.lines.len() > capacity {
                self.lines.pop_front();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total lines ever appended, including evicted ones.
    pub fn appended(&self) -> u64 {
        self.appended
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter()
    }

    /// Lines with `seq >= from`, for incremental readers.
    pub fn since(&self, from: u64) -> impl Iterator<Item = &LogLine> {
        // Held lines are contiguous and end at `appended`
        let first = self.appended - self.lines.len() as u64;
        let skip = from.saturating_sub(first).min(self.lines.len() as u64) as usize;
        self.lines.range(skip..)
    }

    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|line| line.text.as_str()).collect()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// A [`LogBuffer`] shared between its writer and the views handed to
/// readers. Clones share the same lines, so publishing a view never copies
/// them; readers pull only the lines they have not seen.
#[derive(Debug, Clone, Default)]
pub struct SharedLogBuffer {
    inner: Arc<RwLock<LogBuffer>>,
}

impl SharedLogBuffer {
    pub fn new(capacity: Option<usize>) -> Self {
        Self { inner: Arc::new(RwLock::new(LogBuffer::new(capacity))) }
    }

    pub fn push_event(&self, event: &RunEvent) -> bool {
        self.inner.write().push_event(event)
    }

    pub fn push(&self, step_index: Option<usize>, text: String, timestamp: DateTime<Utc>) {
        self.inner.write().push(step_index, text, timestamp);
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn appended(&self) -> u64 {
        self.inner.read().appended()
    }

    /// Held lines with `from <= seq < until`.
    pub fn range(&self, from: u64, until: u64) -> Vec<LogLine> {
        self.inner.read().since(from).take_while(|line| line.seq < until).cloned().collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.inner.read().iter().map(|line| line.text.clone()).collect()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

/// Two handles are equal when they share the same buffer.
impl PartialEq for SharedLogBuffer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
