// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Random interleavings of events and fetch completions.

use super::*;
use proptest::prelude::*;
use rw_core::test_support::strategies::arb_state_event_type;

#[derive(Debug, Clone)]
enum Op {
    Event(RunEventType),
    Log,
    /// Resolve the outstanding fetch at `index % len`; `ok` picks success.
    Resolve { index: usize, ok: bool },
    RetryTimer,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => arb_state_event_type().prop_map(Op::Event),
        1 => Just(Op::Log),
        3 => (any::<usize>(), prop::bool::weighted(0.8))
            .prop_map(|(index, ok)| Op::Resolve { index, ok }),
        1 => Just(Op::RetryTimer),
    ]
}

/// Snapshots carry their sequence number as activity time, so the
/// displayed run reveals which fetch produced it.
fn snapshot_for(seq: u64) -> WorkflowRun {
    snapshot(RunStatus::Running, seq as i64)
}

struct Model {
    rec: RunReconciler,
    outstanding: Vec<u64>,
    /// Highest seq issued when the last dirty signal arrived.
    issued_at_last_signal: Option<u64>,
    max_issued: u64,
}

impl Model {
    fn new() -> Self {
        Self { rec: live(), outstanding: Vec::new(), issued_at_last_signal: None, max_issued: 1 }
    }

    fn absorb(&mut self, effects: Vec<Effect>) {
        for seq in fetch_seqs(&effects) {
            self.outstanding.push(seq);
            self.max_issued = self.max_issued.max(seq);
        }
    }

    fn apply(&mut self, op: Op) {
        match op {
            Op::Event(event_type) => {
                self.issued_at_last_signal = Some(self.max_issued);
                let effects = self.rec.on_event(1, &state_event(event_type));
                self.absorb(effects);
            }
            Op::Log => {
                let effects = self.rec.on_event(1, &log_event(RUN, "line"));
                assert!(fetch_seqs(&effects).is_empty());
            }
            Op::Resolve { index, ok } => {
                if self.outstanding.is_empty() {
                    return;
                }
                let seq = self.outstanding.remove(index % self.outstanding.len());
                let result = if ok {
                    Ok(snapshot_for(seq))
                } else {
                    Err(FetchError::Network("flaky".into()))
                };
                let effects = self.rec.on_fetch_result(seq, result, now());
                self.absorb(effects);
            }
            Op::RetryTimer => {
                let effects = self.rec.on_retry_timer();
                self.absorb(effects);
            }
        }
    }
}

proptest! {
    #[test]
    fn coalescing_and_ordering_hold(ops in prop::collection::vec(arb_op(), 1..60)) {
        let mut model = Model::new();
        let mut last_applied = model.rec.applied_seq();

        for op in ops {
            model.apply(op);

            // Without forced fetches, at most one fetch is ever in flight
            prop_assert!(model.rec.in_flight() <= 1);
            prop_assert_eq!(model.rec.in_flight(), model.outstanding.len());

            // The gate only moves forward
            prop_assert!(model.rec.applied_seq() >= last_applied);
            last_applied = model.rec.applied_seq();

            // The displayed run came from the newest applied fetch
            let displayed = model.rec.run().map(|r| r.last_activity_at);
            let expected = snapshot_for(model.rec.applied_seq()).last_activity_at;
            if model.rec.applied_seq() > 1 {
                prop_assert_eq!(displayed, Some(expected));
            }
        }

        // Drain: every outstanding fetch succeeds, retries fire when due
        for _ in 0..200 {
            if !model.outstanding.is_empty() {
                model.apply(Op::Resolve { index: 0, ok: true });
            } else if model.rec.is_retry_armed() {
                model.apply(Op::RetryTimer);
            } else {
                break;
            }
        }

        prop_assert_eq!(model.rec.in_flight(), 0);
        prop_assert!(!model.rec.is_queued());
        // The last dirty signal was followed by a fetch issued after it
        if let Some(issued_before) = model.issued_at_last_signal {
            prop_assert!(model.max_issued > issued_before);
        }
    }
}
