// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rw_core::test_support::{event_time, log_event, step_event};
use rw_core::{PausedReason, RunEventType, RunStatus};

mod channel;
mod coalesce;
mod commands;
mod properties;
mod sequence;
mod teardown;
mod terminal;

const RUN: &str = "run-1";

fn now() -> DateTime<Utc> {
    event_time()
}

/// Snapshot of `run-1` whose activity timestamp advances with `tick`.
fn snapshot(status: RunStatus, tick: i64) -> WorkflowRun {
    let builder = WorkflowRun::builder().id(RUN).activity_offset_secs(tick);
    match status {
        RunStatus::Paused => builder.paused(PausedReason::AwaitingApproval).build(),
        RunStatus::Completed => builder.status(status).current_step_index(3).build(),
        other => builder.status(other).build(),
    }
}

fn reconciler() -> RunReconciler {
    RunReconciler::new(RunId::new(RUN), MonitorConfig::default())
}

/// A reconciler that loaded a running baseline and subscribed on epoch 1.
fn live() -> RunReconciler {
    live_with(MonitorConfig::default())
}

fn live_with(config: MonitorConfig) -> RunReconciler {
    let mut rec = RunReconciler::new(RunId::new(RUN), config);
    assert_eq!(fetch_seqs(&rec.open()), vec![1]);
    let effects = rec.on_fetch_result(1, Ok(snapshot(RunStatus::Running, 0)), now());
    assert_eq!(effects, vec![Effect::Subscribe { run_id: RunId::new(RUN), epoch: 1 }]);
    assert_eq!(rec.phase(), Phase::Live);
    rec
}

fn state_event(event_type: RunEventType) -> RunEvent {
    step_event(RUN, event_type, 0)
}

fn fetch_seqs(effects: &[Effect]) -> Vec<u64> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Fetch { seq, .. } => Some(*seq),
            _ => None,
        })
        .collect()
}

fn forced_seqs(effects: &[Effect]) -> Vec<u64> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Fetch { seq, forced: true, .. } => Some(*seq),
            _ => None,
        })
        .collect()
}

fn count(effects: &[Effect], name: &str) -> usize {
    effects.iter().filter(|e| e.name() == name).count()
}

fn status(rec: &RunReconciler) -> Option<RunStatus> {
    rec.run().map(|r| r.status)
}
