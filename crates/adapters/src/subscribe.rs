// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-run event channel.
//!
//! A subscription is a bounded receiver plus a handle that releases the
//! underlying connection. The channel never reconnects on its own: after an
//! [`ChannelMessage::Error`] it is dead and the sender is dropped.

use rw_core::{RunEvent, RunId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Messages buffered per subscription before the producer waits.
pub const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscribeError {
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("server returned {0}")]
    Status(u16),
    #[error("stream error: {0}")]
    Stream(String),
    #[error("stream closed by server")]
    Closed,
}

/// What the channel delivers.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelMessage {
    /// The server accepted the subscription.
    Connected,
    Event(RunEvent),
    /// A frame that could not be decoded. The channel stays open.
    Malformed(String),
    /// The connection is lost. Nothing follows this message.
    Error(SubscribeError),
}

/// Releases a subscription's connection.
///
/// Cloneable; every clone releases the same connection and only the first
/// call has an effect.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionHandle {
    cancel: CancellationToken,
    released: Arc<AtomicBool>,
}

impl SubscriptionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release the connection. Returns whether this call released it.
    pub fn unsubscribe(&self) -> bool {
        let first = !self.released.swap(true, Ordering::SeqCst);
        if first {
            self.cancel.cancel();
        }
        first
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Resolves once the subscription is released.
    pub async fn released(&self) {
        self.cancel.cancelled().await
    }
}

#[derive(Debug)]
pub struct Subscription {
    pub messages: mpsc::Receiver<ChannelMessage>,
    pub handle: SubscriptionHandle,
}

/// Opens event channels.
///
/// `subscribe` returns immediately; connection progress and failure arrive
/// as messages. It must be called from within a tokio runtime.
pub trait EventSubscriber: Clone + Send + Sync + 'static {
    fn subscribe(&self, run_id: &RunId) -> Subscription;
}

#[cfg(test)]
#[path = "subscribe_tests.rs"]
mod tests;
