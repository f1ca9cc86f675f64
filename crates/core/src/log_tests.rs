// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{log_event, step_event};
use crate::RunEventType;

#[test]
fn appends_in_delivery_order() {
    let mut buffer = LogBuffer::new(None);
    assert!(buffer.push_event(&log_event("run-1", "line1")));
    assert!(buffer.push_event(&log_event("run-1", "line2")));
    assert_eq!(buffer.texts(), vec!["line1", "line2"]);
    assert_eq!(buffer.iter().map(|l| l.seq).collect::<Vec<_>>(), vec![0, 1]);
}

#[test]
fn ignores_events_without_payload() {
    let mut buffer = LogBuffer::new(None);
    assert!(!buffer.push_event(&step_event("run-1", RunEventType::StepStarted, 0)));
    assert!(buffer.is_empty());
    assert_eq!(buffer.appended(), 0);
}

#[test]
fn capacity_evicts_oldest_but_keeps_counting() {
    let mut buffer = LogBuffer::new(Some(2));
    for text in ["a", "b", "c"] {
        buffer.push_event(&log_event("run-1", text));
    }
    assert_eq!(buffer.texts(), vec!["b", "c"]);
    assert_eq!(buffer.appended(), 3);
    assert_eq!(buffer.since(2).map(|l| l.text.as_str()).collect::<Vec<_>>(), vec!["c"]);
}

#[test]
fn clear_keeps_sequence() {
    let mut buffer = LogBuffer::new(None);
    buffer.push_event(&log_event("run-1", "a"));
    buffer.clear();
    buffer.push_event(&log_event("run-1", "b"));
    assert_eq!(buffer.iter().next().map(|l| l.seq), Some(1));
}

#[test]
fn since_skips_evicted_and_seen_lines() {
    let mut buffer = LogBuffer::new(Some(3));
    for text in ["a", "b", "c", "d", "e"] {
        buffer.push_event(&log_event("run-1", text));
    }
    assert_eq!(texts_since(&buffer, 0), vec!["c", "d", "e"]);
    assert_eq!(texts_since(&buffer, 3), vec!["d", "e"]);
    assert!(texts_since(&buffer, 5).is_empty());
    assert!(texts_since(&buffer, 9).is_empty());
}

fn texts_since(buffer: &LogBuffer, from: u64) -> Vec<&str> {
    buffer.since(from).map(|l| l.text.as_str()).collect()
}

#[test]
fn shared_clones_see_the_same_lines() {
    let writer = SharedLogBuffer::new(None);
    let reader = writer.clone();
    writer.push_event(&log_event("run-1", "one"));
    writer.push_event(&log_event("run-1", "two"));

    assert_eq!(reader.texts(), vec!["one", "two"]);
    assert_eq!(reader, writer);
    assert_ne!(reader, SharedLogBuffer::default());
}

#[test]
fn shared_range_stops_at_the_bound() {
    let logs = SharedLogBuffer::new(None);
    for text in ["a", "b", "c"] {
        logs.push_event(&log_event("run-1", text));
    }
    let texts: Vec<_> = logs.range(1, 2).into_iter().map(|l| l.text).collect();
    assert_eq!(texts, vec!["b"]);
    assert_eq!(logs.range(0, u64::MAX).len(), 3);
}
