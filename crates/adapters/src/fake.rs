// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scriptable in-memory backend for tests.

use crate::command::{RunCommander, TransportError};
use crate::fetch::{FetchError, SnapshotFetcher};
use crate::subscribe::{
    ChannelMessage, EventSubscriber, SubscribeError, Subscription, SubscriptionHandle,
    CHANNEL_CAPACITY,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use rw_core::{RunCommand, RunEvent, RunId, WorkflowRun};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

type FetchResult = Result<WorkflowRun, FetchError>;
type CommandResult = Result<Option<WorkflowRun>, TransportError>;

enum Reply<T> {
    Ready(T),
    Held(oneshot::Receiver<T>),
}

/// Resolves one held fetch.
pub struct FetchGate(oneshot::Sender<FetchResult>);

impl FetchGate {
    pub fn resolve(self, result: FetchResult) {
        let _ = self.0.send(result);
    }
}

/// Resolves one held command.
pub struct CommandGate(oneshot::Sender<CommandResult>);

impl CommandGate {
    pub fn resolve(self, result: CommandResult) {
        let _ = self.0.send(result);
    }
}

struct FakeChannel {
    run_id: RunId,
    tx: mpsc::Sender<ChannelMessage>,
    handle: SubscriptionHandle,
}

#[derive(Default)]
struct FakeState {
    snapshot: Option<WorkflowRun>,
    fetch_script: VecDeque<Reply<FetchResult>>,
    fetch_calls: Vec<RunId>,
    channels: Vec<FakeChannel>,
    command_script: VecDeque<Reply<CommandResult>>,
    command_calls: Vec<(RunId, RunCommand)>,
}

/// Fake backend for testing.
///
/// Fetches pop the script first and fall back to the current snapshot.
/// Commands pop their own script and default to `Ok(None)`. Channel
/// helpers act on the most recent subscription.
#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(run: WorkflowRun) -> Self {
        let backend = Self::new();
        backend.set_snapshot(run);
        backend
    }

    // -- Fetch --

    /// Snapshot served once the fetch script is empty.
    pub fn set_snapshot(&self, run: WorkflowRun) {
        self.inner.lock().snapshot = Some(run);
    }

    pub fn push_fetch(&self, result: FetchResult) {
        self.inner.lock().fetch_script.push_back(Reply::Ready(result));
    }

    /// Queue a fetch that stays pending until the gate resolves it.
    pub fn hold_fetch(&self) -> FetchGate {
        let (tx, rx) = oneshot::channel();
        self.inner.lock().fetch_script.push_back(Reply::Held(rx));
        FetchGate(tx)
    }

    pub fn fetch_count(&self) -> usize {
        self.inner.lock().fetch_calls.len()
    }

    pub fn fetch_calls(&self) -> Vec<RunId> {
        self.inner.lock().fetch_calls.clone()
    }

    // -- Channel --

    pub fn subscription_count(&self) -> usize {
        self.inner.lock().channels.len()
    }

    /// Run id of every subscription, in order.
    pub fn subscribed_runs(&self) -> Vec<RunId> {
        self.inner.lock().channels.iter().map(|c| c.run_id.clone()).collect()
    }

    /// Subscriptions released by their owner.
    pub fn released_count(&self) -> usize {
        self.inner.lock().channels.iter().filter(|c| c.handle.is_released()).count()
    }

    pub fn is_released(&self, index: usize) -> bool {
        self.inner.lock().channels.get(index).is_some_and(|c| c.handle.is_released())
    }

    /// Deliver on the latest subscription. Returns false if there is none
    /// or its receiver is gone.
    pub fn deliver(&self, message: ChannelMessage) -> bool {
        let inner = self.inner.lock();
        match inner.channels.last() {
            Some(channel) if !channel.handle.is_released() => channel.tx.try_send(message).is_ok(),
            _ => false,
        }
    }

    pub fn connect(&self) -> bool {
        self.deliver(ChannelMessage::Connected)
    }

    pub fn push_event(&self, event: RunEvent) -> bool {
        self.deliver(ChannelMessage::Event(event))
    }

    /// Fail the latest subscription; the fake drops its sender afterwards.
    pub fn fail(&self, error: SubscribeError) -> bool {
        let sent = self.deliver(ChannelMessage::Error(error));
        if let Some(channel) = self.inner.lock().channels.last_mut() {
            let (closed, _) = mpsc::channel(1);
            channel.tx = closed;
        }
        sent
    }

    // -- Commands --

    pub fn push_command(&self, result: CommandResult) {
        self.inner.lock().command_script.push_back(Reply::Ready(result));
    }

    pub fn hold_command(&self) -> CommandGate {
        let (tx, rx) = oneshot::channel();
        self.inner.lock().command_script.push_back(Reply::Held(rx));
        CommandGate(tx)
    }

    pub fn command_calls(&self) -> Vec<(RunId, RunCommand)> {
        self.inner.lock().command_calls.clone()
    }
}

#[async_trait]
impl SnapshotFetcher for FakeBackend {
    async fn fetch(&self, run_id: &RunId) -> FetchResult {
        let reply = {
            let mut inner = self.inner.lock();
            inner.fetch_calls.push(run_id.clone());
            match inner.fetch_script.pop_front() {
                Some(reply) => reply,
                None => Reply::Ready(
                    inner.snapshot.clone().ok_or_else(|| FetchError::NotFound(run_id.clone())),
                ),
            }
        };
        match reply {
            Reply::Ready(result) => result,
            Reply::Held(rx) => {
                rx.await.unwrap_or_else(|_| Err(FetchError::Network("gate dropped".to_string())))
            }
        }
    }
}

#[async_trait]
impl RunCommander for FakeBackend {
    async fn send(&self, run_id: &RunId, command: RunCommand) -> CommandResult {
        let reply = {
            let mut inner = self.inner.lock();
            inner.command_calls.push((run_id.clone(), command));
            inner.command_script.pop_front().unwrap_or(Reply::Ready(Ok(None)))
        };
        match reply {
            Reply::Ready(result) => result,
            Reply::Held(rx) => rx
                .await
                .unwrap_or_else(|_| Err(TransportError::Network("gate dropped".to_string()))),
        }
    }
}

impl EventSubscriber for FakeBackend {
    fn subscribe(&self, run_id: &RunId) -> Subscription {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let handle = SubscriptionHandle::new();
        self.inner.lock().channels.push(FakeChannel {
            run_id: run_id.clone(),
            tx,
            handle: handle.clone(),
        });
        Subscription { messages: rx, handle }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
