// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run state reconciler.
//!
//! Owns the canonical view of one run and decides when to fetch, subscribe
//! and release. It performs no I/O: every operation returns the [`Effect`]s
//! the runtime must execute, and results come back through the `on_*`
//! methods tagged with the sequence number or channel epoch they belong to.
//!
//! Events are dirty signals. Apart from `tool.log` lines, nothing from the
//! event channel is applied to the snapshot; it only schedules a re-fetch.
//! Fetches are applied in issue order, never completion order.

use crate::config::MonitorConfig;
use crate::dispatcher::{CommandAck, Dispatcher};
use crate::error::CommandError;
use crate::view::{ConnectionState, MonitorView};
use chrono::{DateTime, Utc};
use rw_adapters::{FetchError, SubscribeError, TransportError};
use rw_core::{Effect, RunCommand, RunEvent, RunId, SharedLogBuffer, WorkflowRun};
use std::collections::BTreeSet;

/// Lifecycle of a reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created, `open` not called yet.
    Idle,
    /// Waiting for the baseline snapshot.
    Opening,
    /// Subscribed and refreshing.
    Live,
    /// A terminal snapshot was applied; the view is frozen.
    Final,
    /// Torn down by `close`.
    Closed,
    /// The baseline fetch failed; nothing was subscribed.
    OpenFailed,
}

rw_core::simple_display! {
    Phase {
        Idle => "idle",
        Opening => "opening",
        Live => "live",
        Final => "final",
        Closed => "closed",
        OpenFailed => "open_failed",
    }
}

pub struct RunReconciler {
    run_id: RunId,
    config: MonitorConfig,
    phase: Phase,
    run: Option<WorkflowRun>,
    logs: SharedLogBuffer,
    dispatcher: Dispatcher,
    open_error: Option<FetchError>,

    // -- Sequence gate --
    last_issued: u64,
    /// Results with a sequence number at or below this are stale.
    applied_seq: u64,
    in_flight: BTreeSet<u64>,
    /// The run changed after the newest in-flight fetch was issued.
    queued: bool,
    retry_armed: bool,
    fetch_failures: u32,
    last_fetch_error: Option<String>,
    last_synced_at: Option<DateTime<Utc>>,

    // -- Event channel --
    epoch: u64,
    /// Epoch of the subscription currently held, if any.
    subscription: Option<u64>,
    connection: ConnectionState,
    resubscribes_left: u32,
}

impl RunReconciler {
    pub fn new(run_id: RunId, config: MonitorConfig) -> Self {
        Self {
            logs: SharedLogBuffer::new(config.log_capacity),
            resubscribes_left: config.resubscribe_attempts,
            run_id,
            config,
            phase: Phase::Idle,
            run: None,
            dispatcher: Dispatcher::default(),
            open_error: None,
            last_issued: 0,
            applied_seq: 0,
            in_flight: BTreeSet::new(),
            queued: false,
            retry_armed: false,
            fetch_failures: 0,
            last_fetch_error: None,
            last_synced_at: None,
            epoch: 0,
            subscription: None,
            connection: ConnectionState::Connecting,
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn run(&self) -> Option<&WorkflowRun> {
        self.run.as_ref()
    }

    pub fn logs(&self) -> &SharedLogBuffer {
        &self.logs
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn pending_command(&self) -> Option<RunCommand> {
        self.dispatcher.pending()
    }

    /// Why the baseline fetch failed, once `phase()` is `OpenFailed`.
    pub fn open_error(&self) -> Option<&FetchError> {
        self.open_error.as_ref()
    }

    pub fn applied_seq(&self) -> u64 {
        self.applied_seq
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_queued(&self) -> bool {
        self.queued
    }

    pub fn is_retry_armed(&self) -> bool {
        self.retry_armed
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn view(&self) -> MonitorView {
        MonitorView {
            run: self.run.clone(),
            connection: self.connection,
            logs: self.logs.clone(),
            log_count: self.logs.appended(),
            applied_seq: self.applied_seq,
            pending_command: self.dispatcher.pending(),
            last_synced_at: self.last_synced_at,
            last_fetch_error: self.last_fetch_error.clone(),
            fetch_failures: self.fetch_failures,
            is_final: self.phase == Phase::Final,
        }
    }

    // -- Lifecycle --

    /// Begin opening: issue the baseline fetch. Subscription waits for it.
    pub fn open(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.phase != Phase::Idle {
            tracing::debug!(run_id = %self.run_id, phase = %self.phase, "open ignored");
            return effects;
        }
        self.phase = Phase::Opening;
        self.issue_fetch(true, &mut effects);
        effects
    }

    /// Tear down: release the channel, disarm the retry timer and forget
    /// every outstanding fetch. Safe to call in any phase, any number of times.
    pub fn close(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.phase == Phase::Closed {
            return effects;
        }
        tracing::info!(run_id = %self.run_id, phase = %self.phase, "closing monitor");
        self.release_subscription(&mut effects);
        self.disarm_retry(&mut effects);
        self.phase = Phase::Closed;
        self.run = None;
        self.logs.clear();
        self.in_flight.clear();
        self.queued = false;
        self.dispatcher.clear();
        self.last_fetch_error = None;
        self.connection = ConnectionState::Closed;
        effects
    }

    // -- Snapshots --

    /// A fetch completed.
    pub fn on_fetch_result(
        &mut self,
        seq: u64,
        result: Result<WorkflowRun, FetchError>,
        now: DateTime<Utc>,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !self.in_flight.remove(&seq) {
            tracing::debug!(run_id = %self.run_id, seq, phase = %self.phase, "discarding untracked fetch result");
            return effects;
        }

        let expected = &self.run_id;
        let result = result.and_then(|run| match run.validate(expected) {
            Ok(()) => Ok(run),
            Err(violation) => Err(FetchError::from(violation)),
        });

        match self.phase {
            Phase::Opening => {
                self.apply_baseline(seq, result, now, &mut effects);
                return effects;
            }
            Phase::Live => {}
            _ => {
                tracing::debug!(run_id = %self.run_id, seq, phase = %self.phase, "discarding fetch result");
                return effects;
            }
        }

        if seq <= self.applied_seq {
            tracing::debug!(
                run_id = %self.run_id,
                seq,
                applied_seq = self.applied_seq,
                "discarding fetch issued before the applied one"
            );
            self.pump(&mut effects);
            return effects;
        }

        match result {
            Ok(run) => self.apply_snapshot(seq, run, now, &mut effects),
            Err(error) if self.in_flight.last().is_some_and(|newest| *newest > seq) => {
                tracing::debug!(run_id = %self.run_id, seq, %error, "fetch failed, a newer one is in flight");
            }
            Err(error) => self.fetch_failed(error, &mut effects),
        }
        effects
    }

    /// The retry timer fired.
    pub fn on_retry_timer(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !self.retry_armed {
            return effects;
        }
        self.retry_armed = false;
        tracing::debug!(run_id = %self.run_id, failures = self.fetch_failures, "retrying refresh");
        self.pump(&mut effects);
        effects
    }

    // -- Event channel --

    /// An event arrived on the channel tagged `epoch`.
    pub fn on_event(&mut self, epoch: u64, event: &RunEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.phase != Phase::Live {
            tracing::trace!(run_id = %self.run_id, phase = %self.phase, event = %event.log_summary(), "ignoring event");
            return effects;
        }
        if self.subscription != Some(epoch) {
            tracing::debug!(run_id = %self.run_id, epoch, "ignoring event from released channel");
            return effects;
        }
        if event.run_id != self.run_id {
            tracing::warn!(run_id = %self.run_id, event = %event.log_summary(), "ignoring event for another run");
            return effects;
        }

        self.mark_connected();
        // Data flowed, so the channel proved healthy
        self.resubscribes_left = self.config.resubscribe_attempts;
        if event.is_log() {
            self.logs.push_event(event);
            return effects;
        }

        tracing::debug!(run_id = %self.run_id, event = %event.log_summary(), "run marked dirty");
        self.request_refresh(&mut effects);
        effects
    }

    /// The channel tagged `epoch` connected. The resubscribe budget is only
    /// restored once it delivers an event.
    pub fn on_channel_connected(&mut self, epoch: u64) {
        if self.phase == Phase::Live && self.subscription == Some(epoch) {
            self.mark_connected();
        }
    }

    /// The channel tagged `epoch` failed. It is dead either way; while the
    /// resubscribe budget lasts it is answered with one fresh subscription
    /// and a refresh, forced unless a fetch is already in flight.
    pub fn on_channel_error(&mut self, epoch: u64, error: &SubscribeError) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.phase != Phase::Live || self.subscription != Some(epoch) {
            return effects;
        }
        self.release_subscription(&mut effects);

        if self.resubscribes_left > 0 {
            self.resubscribes_left -= 1;
            tracing::warn!(run_id = %self.run_id, epoch, %error, "event channel failed, resubscribing");
            self.connection = ConnectionState::Reconnecting;
            self.subscribe(&mut effects);
            if self.in_flight.is_empty() {
                self.issue_fetch(true, &mut effects);
            } else {
                self.queued = true;
            }
        } else {
            tracing::warn!(run_id = %self.run_id, epoch, %error, "event channel failed, disconnected");
            self.connection = ConnectionState::Disconnected;
        }
        effects
    }

    /// Manual retry after the monitor reported itself disconnected.
    pub fn reconnect(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.phase != Phase::Live || self.connection != ConnectionState::Disconnected {
            tracing::debug!(run_id = %self.run_id, connection = %self.connection, "reconnect ignored");
            return effects;
        }
        tracing::info!(run_id = %self.run_id, "reconnecting");
        self.resubscribes_left = self.config.resubscribe_attempts;
        self.connection = ConnectionState::Connecting;
        self.subscribe(&mut effects);
        self.issue_fetch(true, &mut effects);
        effects
    }

    // -- Commands --

    /// Gate a command before anything is sent.
    pub fn begin_command(&mut self, command: RunCommand) -> Result<(), CommandError> {
        if matches!(self.phase, Phase::Closed | Phase::OpenFailed) {
            return Err(CommandError::Closed);
        }
        self.dispatcher.begin(command, self.run.as_ref())?;
        tracing::info!(run_id = %self.run_id, %command, "command dispatched");
        Ok(())
    }

    /// A command finished. Success forces an immediate refresh; failure
    /// leaves the view untouched.
    pub fn finish_command(
        &mut self,
        command: RunCommand,
        result: Result<(), TransportError>,
    ) -> (Result<CommandAck, CommandError>, Vec<Effect>) {
        let mut effects = Vec::new();
        self.dispatcher.finish(command);
        match result {
            Err(source) => {
                tracing::warn!(run_id = %self.run_id, %command, error = %source, "command failed");
                (Err(CommandError::Transport { command, source }), effects)
            }
            Ok(()) => {
                let refresh_seq = match self.phase {
                    Phase::Live => Some(self.issue_fetch(true, &mut effects)),
                    _ => None,
                };
                tracing::info!(run_id = %self.run_id, %command, ?refresh_seq, "command accepted");
                (Ok(CommandAck { command, refresh_seq }), effects)
            }
        }
    }

    // -- Internals --

    fn apply_baseline(
        &mut self,
        seq: u64,
        result: Result<WorkflowRun, FetchError>,
        now: DateTime<Utc>,
        effects: &mut Vec<Effect>,
    ) {
        match result {
            Err(error) => {
                tracing::warn!(run_id = %self.run_id, %error, "initial fetch failed");
                self.phase = Phase::OpenFailed;
                self.connection = ConnectionState::Closed;
                self.open_error = Some(error);
            }
            Ok(run) => {
                let terminal = run.is_terminal();
                tracing::info!(run_id = %self.run_id, status = %run.status, "baseline snapshot");
                self.applied_seq = seq;
                self.run = Some(run);
                self.last_synced_at = Some(now);
                if terminal {
                    self.phase = Phase::Final;
                    self.connection = ConnectionState::Closed;
                } else {
                    self.phase = Phase::Live;
                    self.subscribe(effects);
                }
            }
        }
    }

    fn apply_snapshot(
        &mut self,
        seq: u64,
        run: WorkflowRun,
        now: DateTime<Utc>,
        effects: &mut Vec<Effect>,
    ) {
        self.applied_seq = seq;
        self.fetch_failures = 0;
        self.last_fetch_error = None;
        self.disarm_retry(effects);

        let displayed_at = self.run.as_ref().map(|current| current.last_activity_at);
        if let Some(displayed_at) = displayed_at.filter(|at| run.last_activity_at < *at) {
            tracing::debug!(
                run_id = %self.run_id,
                seq,
                fetched = %run.last_activity_at,
                displayed = %displayed_at,
                "skipping snapshot older than the displayed one"
            );
            self.pump(effects);
            return;
        }

        let terminal = run.is_terminal();
        tracing::debug!(run_id = %self.run_id, seq, status = %run.status, "applied snapshot");
        self.run = Some(run);
        self.last_synced_at = Some(now);

        if terminal {
            self.finalize(effects);
        } else {
            self.pump(effects);
        }
    }

    fn finalize(&mut self, effects: &mut Vec<Effect>) {
        tracing::info!(
            run_id = %self.run_id,
            status = %self.run.as_ref().map(|r| r.status.to_string()).unwrap_or_default(),
            "run reached terminal status"
        );
        self.phase = Phase::Final;
        self.queued = false;
        self.disarm_retry(effects);
        self.release_subscription(effects);
        self.connection = ConnectionState::Closed;
    }

    fn fetch_failed(&mut self, error: FetchError, effects: &mut Vec<Effect>) {
        self.fetch_failures += 1;
        self.last_fetch_error = Some(error.to_string());
        self.queued = true;
        tracing::warn!(run_id = %self.run_id, failures = self.fetch_failures, %error, "refresh failed");
        if !self.retry_armed {
            self.retry_armed = true;
            effects.push(Effect::ArmRetry { delay: self.config.retry_delay(self.fetch_failures) });
        }
    }

    /// Fetch now if idle, otherwise remember to fetch once idle.
    fn request_refresh(&mut self, effects: &mut Vec<Effect>) {
        if self.in_flight.is_empty() && !self.retry_armed {
            self.issue_fetch(false, effects);
        } else {
            self.queued = true;
        }
    }

    /// Fire the trailing fetch once nothing is in flight.
    fn pump(&mut self, effects: &mut Vec<Effect>) {
        if self.phase == Phase::Live
            && self.queued
            && self.in_flight.is_empty()
            && !self.retry_armed
        {
            self.issue_fetch(false, effects);
        }
    }

    /// Any fetch issued now observes every change signalled so far.
    fn issue_fetch(&mut self, forced: bool, effects: &mut Vec<Effect>) -> u64 {
        self.last_issued += 1;
        let seq = self.last_issued;
        self.in_flight.insert(seq);
        self.queued = false;
        self.disarm_retry(effects);
        effects.push(Effect::Fetch { run_id: self.run_id.clone(), seq, forced });
        seq
    }

    fn subscribe(&mut self, effects: &mut Vec<Effect>) {
        self.epoch += 1;
        self.subscription = Some(self.epoch);
        effects.push(Effect::Subscribe { run_id: self.run_id.clone(), epoch: self.epoch });
    }

    fn release_subscription(&mut self, effects: &mut Vec<Effect>) {
        if let Some(epoch) = self.subscription.take() {
            effects.push(Effect::Unsubscribe { epoch });
        }
    }

    fn disarm_retry(&mut self, effects: &mut Vec<Effect>) {
        if self.retry_armed {
            self.retry_armed = false;
            effects.push(Effect::DisarmRetry);
        }
    }

    fn mark_connected(&mut self) {
        if self.connection != ConnectionState::Connected {
            tracing::info!(run_id = %self.run_id, epoch = self.epoch, "event channel connected");
            self.connection = ConnectionState::Connected;
        }
    }
}

#[cfg(test)]
#[path = "reconciler_tests/mod.rs"]
mod tests;
