// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run monitor runtime.
//!
//! Drives one [`RunReconciler`] on a tokio task: executes the effects it
//! returns against a [`RunBackend`] and feeds every result back in. The
//! presentation layer talks to the task through a cloneable
//! [`MonitorHandle`] and reads state from a watch channel.

use crate::config::MonitorConfig;
use crate::dispatcher::CommandAck;
use crate::error::{CommandError, OpenError};
use crate::reconciler::RunReconciler;
use crate::view::MonitorView;
use rw_adapters::{
    ChannelMessage, FetchError, RunBackend, SubscribeError, SubscriptionHandle, TransportError,
};
use rw_core::{Clock, Effect, RunCommand, RunId, WorkflowRun};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::Instrument;

/// Control messages buffered before `MonitorHandle` callers wait.
const CONTROL_CAPACITY: usize = 16;

enum Control {
    Command { command: RunCommand, reply: oneshot::Sender<Result<CommandAck, CommandError>> },
    Reconnect,
    Close { reply: oneshot::Sender<()> },
}

/// Work finished by a spawned task.
enum Completion {
    Fetch {
        seq: u64,
        result: Result<WorkflowRun, FetchError>,
        elapsed_ms: u64,
    },
    Command {
        command: RunCommand,
        result: Result<(), TransportError>,
        reply: oneshot::Sender<Result<CommandAck, CommandError>>,
    },
}

struct ActiveChannel {
    epoch: u64,
    messages: mpsc::Receiver<ChannelMessage>,
    handle: SubscriptionHandle,
}

/// Open a monitor for `run_id`.
///
/// The baseline snapshot is fetched before this returns; if that fails,
/// nothing is subscribed and the error is returned. A run that is already
/// terminal is displayed without ever subscribing.
pub async fn open<B, C>(
    backend: B,
    clock: C,
    run_id: RunId,
    config: MonitorConfig,
) -> Result<MonitorHandle, OpenError>
where
    B: RunBackend,
    C: Clock,
{
    let span = tracing::info_span!("monitor", run_id = %run_id);
    let mut reconciler = RunReconciler::new(run_id.clone(), config);

    let mut effects = Vec::new();
    for effect in reconciler.open() {
        match effect {
            Effect::Fetch { seq, .. } => {
                let result = backend.fetch(&run_id).instrument(span.clone()).await;
                let now = clock.utc_now();
                effects.extend(span.in_scope(|| reconciler.on_fetch_result(seq, result, now)));
            }
            other => effects.push(other),
        }
    }
    if let Some(error) = reconciler.open_error() {
        return Err(OpenError::Fetch(error.clone()));
    }

    let (view_tx, view_rx) = watch::channel(reconciler.view());
    let (control_tx, control_rx) = mpsc::channel(CONTROL_CAPACITY);
    let mut task = MonitorTask {
        backend,
        clock,
        reconciler,
        control: control_rx,
        view: view_tx,
        tasks: JoinSet::new(),
        channel: None,
        retry_at: None,
    };
    span.in_scope(|| task.execute_all(effects));
    task.publish();
    tokio::spawn(task.run().instrument(span));

    Ok(MonitorHandle { run_id, control: control_tx, view: view_rx })
}

/// Cloneable access to a running monitor.
#[derive(Clone)]
pub struct MonitorHandle {
    run_id: RunId,
    control: mpsc::Sender<Control>,
    view: watch::Receiver<MonitorView>,
}

impl MonitorHandle {
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Current state.
    pub fn view(&self) -> MonitorView {
        self.view.borrow().clone()
    }

    /// Receiver notified on every change to the view.
    pub fn watch(&self) -> watch::Receiver<MonitorView> {
        self.view.clone()
    }

    pub async fn resume(&self) -> Result<CommandAck, CommandError> {
        self.command(RunCommand::Resume).await
    }

    pub async fn cancel(&self) -> Result<CommandAck, CommandError> {
        self.command(RunCommand::Cancel).await
    }

    /// Send `command` and wait for the backend's answer.
    ///
    /// An accepted command does not change the displayed status; the
    /// refresh it triggers does.
    pub async fn command(&self, command: RunCommand) -> Result<CommandAck, CommandError> {
        let (reply, rx) = oneshot::channel();
        self.control
            .send(Control::Command { command, reply })
            .await
            .map_err(|_| CommandError::Closed)?;
        rx.await.unwrap_or(Err(CommandError::Closed))
    }

    /// Retry the event channel after the monitor reported itself
    /// disconnected. Ignored in any other state.
    pub async fn reconnect(&self) {
        let _ = self.control.send(Control::Reconnect).await;
    }

    /// Tear the monitor down. Idempotent; returns once the channel is
    /// released.
    pub async fn close(&self) {
        let (reply, rx) = oneshot::channel();
        if self.control.send(Control::Close { reply }).await.is_ok() {
            let _ = rx.await;
        }
    }

    /// Wait until `predicate` holds for the view. Returns `None` if the
    /// monitor stopped first.
    pub async fn wait_until(
        &self,
        predicate: impl FnMut(&MonitorView) -> bool,
    ) -> Option<MonitorView> {
        let mut rx = self.view.clone();
        let view = rx.wait_for(predicate).await.ok()?;
        Some(view.clone())
    }
}

struct MonitorTask<B, C> {
    backend: B,
    clock: C,
    reconciler: RunReconciler,
    control: mpsc::Receiver<Control>,
    view: watch::Sender<MonitorView>,
    /// In-flight fetches and commands; aborted when the task ends.
    tasks: JoinSet<Completion>,
    channel: Option<ActiveChannel>,
    retry_at: Option<Instant>,
}

impl<B, C> MonitorTask<B, C>
where
    B: RunBackend,
    C: Clock,
{
    async fn run(mut self) {
        loop {
            tokio::select! {
                control = self.control.recv() => {
                    match control {
                        Some(Control::Command { command, reply }) => self.begin_command(command, reply),
                        Some(Control::Reconnect) => {
                            let effects = self.reconciler.reconnect();
                            self.execute_all(effects);
                        }
                        Some(Control::Close { reply }) => {
                            self.shutdown();
                            let _ = reply.send(());
                            break;
                        }
                        None => {
                            tracing::debug!("all handles dropped");
                            self.shutdown();
                            break;
                        }
                    }
                }
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    match joined {
                        Ok(completion) => self.complete(completion),
                        Err(e) => tracing::error!(error = %e, "monitor task failed"),
                    }
                }
                (epoch, message) = next_message(&mut self.channel) => {
                    self.on_channel_message(epoch, message);
                }
                _ = sleep_until(self.retry_at) => {
                    self.retry_at = None;
                    let effects = self.reconciler.on_retry_timer();
                    self.execute_all(effects);
                }
            }
            self.publish();
        }
        tracing::debug!("monitor stopped");
    }

    fn shutdown(&mut self) {
        let effects = self.reconciler.close();
        self.execute_all(effects);
        self.tasks.abort_all();
        self.publish();
    }

    fn begin_command(
        &mut self,
        command: RunCommand,
        reply: oneshot::Sender<Result<CommandAck, CommandError>>,
    ) {
        if let Err(e) = self.reconciler.begin_command(command) {
            tracing::info!(%command, error = %e, "command rejected");
            let _ = reply.send(Err(e));
            return;
        }
        let backend = self.backend.clone();
        let run_id = self.reconciler.run_id().clone();
        self.tasks.spawn(async move {
            let result = backend.send(&run_id, command).await.map(|returned| {
                if let Some(run) = returned {
                    tracing::debug!(%command, status = %run.status, "ignoring run returned by command");
                }
            });
            Completion::Command { command, result, reply }
        });
    }

    fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::Fetch { seq, result, elapsed_ms } => {
                match &result {
                    Ok(run) => tracing::debug!(seq, elapsed_ms, status = %run.status, "fetch completed"),
                    Err(e) => tracing::debug!(seq, elapsed_ms, error = %e, "fetch failed"),
                }
                let now = self.clock.utc_now();
                let effects = self.reconciler.on_fetch_result(seq, result, now);
                self.execute_all(effects);
            }
            Completion::Command { command, result, reply } => {
                let (outcome, effects) = self.reconciler.finish_command(command, result);
                self.execute_all(effects);
                // Publish before replying so callers see the cleared marker
                self.publish();
                let _ = reply.send(outcome);
            }
        }
    }

    fn on_channel_message(&mut self, epoch: u64, message: Option<ChannelMessage>) {
        let dead = matches!(message, None | Some(ChannelMessage::Error(_)));
        let effects = match message {
            Some(ChannelMessage::Connected) => {
                self.reconciler.on_channel_connected(epoch);
                Vec::new()
            }
            Some(ChannelMessage::Event(event)) => self.reconciler.on_event(epoch, &event),
            Some(ChannelMessage::Malformed(reason)) => {
                tracing::warn!(epoch, %reason, "dropping malformed event");
                Vec::new()
            }
            Some(ChannelMessage::Error(error)) => self.reconciler.on_channel_error(epoch, &error),
            None => self.reconciler.on_channel_error(epoch, &SubscribeError::Closed),
        };
        self.execute_all(effects);

        // A failed channel is dead whether or not the reconciler still held it
        if dead {
            self.release_channel(epoch);
        }
    }

    fn execute_all(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.execute(effect);
        }
    }

    /// Execute a single effect with tracing.
    fn execute(&mut self, effect: Effect) {
        let info = effect
            .fields()
            .into_iter()
            .map(|(key, val)| format!("{key}={val}"))
            .collect::<Vec<_>>()
            .join(" ");
        let op = effect.name();
        if effect.verbose() {
            tracing::info!("executing effect={} {}", op, info);
        } else {
            tracing::debug!("executing effect={} {}", op, info);
        }

        match effect {
            Effect::Fetch { run_id, seq, .. } => {
                let backend = self.backend.clone();
                self.tasks.spawn(async move {
                    let start = std::time::Instant::now();
                    let result = backend.fetch(&run_id).await;
                    let elapsed_ms = start.elapsed().as_millis() as u64;
                    Completion::Fetch { seq, result, elapsed_ms }
                });
            }
            Effect::Subscribe { run_id, epoch } => {
                if let Some(old) = self.channel.take() {
                    old.handle.unsubscribe();
                }
                let subscription = self.backend.subscribe(&run_id);
                self.channel = Some(ActiveChannel {
                    epoch,
                    messages: subscription.messages,
                    handle: subscription.handle,
                });
            }
            Effect::Unsubscribe { epoch } => self.release_channel(epoch),
            Effect::ArmRetry { delay } => {
                self.retry_at = Some(Instant::now() + delay);
            }
            Effect::DisarmRetry => {
                self.retry_at = None;
            }
        }
    }

    fn release_channel(&mut self, epoch: u64) {
        if self.channel.as_ref().is_some_and(|c| c.epoch == epoch) {
            if let Some(channel) = self.channel.take() {
                channel.handle.unsubscribe();
            }
        }
    }

    fn publish(&self) {
        let next = self.reconciler.view();
        self.view.send_if_modified(|view| {
            if *view == next {
                false
            } else {
                *view = next;
                true
            }
        });
    }
}

/// Next message from the held channel, tagged with its epoch. Pending
/// forever while no channel is held.
async fn next_message(channel: &mut Option<ActiveChannel>) -> (u64, Option<ChannelMessage>) {
    match channel {
        Some(channel) => (channel.epoch, channel.messages.recv().await),
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
