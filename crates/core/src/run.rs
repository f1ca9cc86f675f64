// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow run snapshot model.
//!
//! A [`WorkflowRun`] is always a complete point-in-time read from the
//! backend. Nothing in this crate mutates one field-by-field; the engine
//! replaces snapshots wholesale.

use crate::id::RunId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Status of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    /// Terminal statuses are absorbing: no transition leaves them.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled)
    }

    /// Whether `current_step_index` carries meaning in this status.
    pub fn has_current_step(self) -> bool {
        matches!(self, RunStatus::Running | RunStatus::Paused)
    }
}

crate::simple_display! {
    RunStatus {
        Pending => "pending",
        Running => "running",
        Paused => "paused",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

/// Why a run is paused. Only present while the run status is `paused`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PausedReason {
    AwaitingApproval,
    StepFailed,
    EngineInterrupted,
}

crate::simple_display! {
    PausedReason {
        AwaitingApproval => "awaiting approval",
        StepFailed => "step failed",
        EngineInterrupted => "engine interrupted",
    }
}

/// Status of a single step within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Paused,
}

crate::simple_display! {
    StepStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Paused => "paused",
    }
}

/// One step of the workflow definition captured at run creation.
///
/// Only `name` is interpreted; everything else the backend sends is kept
/// verbatim for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StepSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), description: None, extra: Map::new() }
    }
}

/// Immutable workflow definition as it was when the run was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecSnapshot {
    pub name: String,
    pub steps: Vec<StepSpec>,
}

/// Observed state of one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepState {
    /// Position in `spec_snapshot.steps`; the stable identity of the step.
    pub step_index: usize,
    pub status: StepStatus,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub log_preview: Option<String>,
    /// Opaque result payload, displayed but never parsed.
    #[serde(default)]
    pub result_summary: Option<Value>,
}

crate::builder! {
    pub struct StepStateBuilder => StepState {
        set {
            step_index: usize = 0,
            status: StepStatus = StepStatus::Pending,
            attempts: u32 = 0,
        }
        option {
            started_at: DateTime<Utc> = None,
            completed_at: DateTime<Utc> = None,
            error_message: String = None,
            log_preview: String = None,
            result_summary: Value = None,
        }
    }
}

/// Ways a snapshot can contradict the run model's invariants.
///
/// A snapshot failing validation is treated as a malformed payload and
/// never replaces the displayed state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("snapshot is for run `{found}`, expected `{expected}`")]
    RunIdMismatch { expected: RunId, found: RunId },
    #[error("{states} step states for {steps} spec steps")]
    StepCountMismatch { steps: usize, states: usize },
    #[error("step state at position {position} has step_index {found}")]
    StepIndexOutOfOrder { position: usize, found: usize },
    #[error("current_step_index {index} is out of range for {count} steps in status `{status}`")]
    CurrentStepOutOfRange { index: usize, count: usize, status: RunStatus },
    #[error("paused_reason `{reason}` present while status is `{status}`")]
    UnexpectedPausedReason { status: RunStatus, reason: PausedReason },
}

/// A complete snapshot of one workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: RunId,
    pub status: RunStatus,
    #[serde(default)]
    pub current_step_index: usize,
    #[serde(default)]
    pub paused_reason: Option<PausedReason>,
    pub steps_state: Vec<StepState>,
    pub spec_snapshot: SpecSnapshot,
    /// Supplied by the backend; never decreases for a given run.
    pub last_activity_at: DateTime<Utc>,
}

impl WorkflowRun {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn step_count(&self) -> usize {
        self.spec_snapshot.steps.len()
    }

    /// The step the run is positioned on, while running or paused.
    pub fn current_step(&self) -> Option<(&StepSpec, &StepState)> {
        if !self.status.has_current_step() {
            return None;
        }
        let spec = self.spec_snapshot.steps.get(self.current_step_index)?;
        let state = self.steps_state.get(self.current_step_index)?;
        Some((spec, state))
    }

    /// Pair each spec step with its observed state, in definition order.
    pub fn steps(&self) -> impl Iterator<Item = (&StepSpec, &StepState)> {
        self.spec_snapshot.steps.iter().zip(self.steps_state.iter())
    }

    /// Check the structural invariants of a freshly fetched snapshot.
    pub fn validate(&self, expected: &RunId) -> Result<(), InvariantViolation> {
        if self.id != *expected {
            return Err(InvariantViolation::RunIdMismatch {
                expected: expected.clone(),
                found: self.id.clone(),
            });
        }

        let steps = self.step_count();
        if self.steps_state.len() != steps {
            return Err(InvariantViolation::StepCountMismatch {
                steps,
                states: self.steps_state.len(),
            });
        }

        if let Some((position, state)) =
            self.steps_state.iter().enumerate().find(|(i, s)| s.step_index != *i)
        {
            return Err(InvariantViolation::StepIndexOutOfOrder {
                position,
                found: state.step_index,
            });
        }

        // One past the end is how the backend reports a finished run
        let past_end_allowed = self.is_terminal() || steps == 0;
        let in_range = self.current_step_index < steps
            || (self.current_step_index == steps && past_end_allowed);
        if !in_range {
            return Err(InvariantViolation::CurrentStepOutOfRange {
                index: self.current_step_index,
                count: steps,
                status: self.status,
            });
        }

        if let Some(reason) = self.paused_reason {
            if self.status != RunStatus::Paused {
                return Err(InvariantViolation::UnexpectedPausedReason {
                    status: self.status,
                    reason,
                });
            }
        }

        Ok(())
    }
}

/// Test builder producing structurally valid runs.
#[cfg(any(test, feature = "test-support"))]
pub struct WorkflowRunBuilder {
    id: RunId,
    status: RunStatus,
    current_step_index: usize,
    paused_reason: Option<PausedReason>,
    workflow_name: String,
    step_names: Vec<String>,
    step_overrides: Vec<StepState>,
    last_activity_at: DateTime<Utc>,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for WorkflowRunBuilder {
    fn default() -> Self {
        use chrono::TimeZone;
        Self {
            id: RunId::new("run-1"),
            status: RunStatus::Running,
            current_step_index: 0,
            paused_reason: None,
            workflow_name: "deploy".to_string(),
            step_names: vec!["build".to_string(), "test".to_string(), "release".to_string()],
            step_overrides: Vec::new(),
            last_activity_at: Utc.timestamp_opt(1_700_000_000, 0).single().unwrap_or_default(),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl WorkflowRunBuilder {
    pub fn id(mut self, id: impl Into<RunId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn status(mut self, status: RunStatus) -> Self {
        self.status = status;
        self
    }

    /// Set status `paused` with the given reason.
    pub fn paused(mut self, reason: PausedReason) -> Self {
        self.status = RunStatus::Paused;
        self.paused_reason = Some(reason);
        self
    }

    pub fn current_step_index(mut self, index: usize) -> Self {
        self.current_step_index = index;
        self
    }

    pub fn workflow_name(mut self, name: impl Into<String>) -> Self {
        self.workflow_name = name.into();
        self
    }

    pub fn steps<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.step_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the generated state for the step at `state.step_index`.
    pub fn step_state(mut self, state: StepState) -> Self {
        self.step_overrides.push(state);
        self
    }

    pub fn last_activity_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_activity_at = at;
        self
    }

    /// Shift `last_activity_at` forward by whole seconds.
    pub fn activity_offset_secs(mut self, secs: i64) -> Self {
        self.last_activity_at += chrono::Duration::seconds(secs);
        self
    }

    pub fn build(self) -> WorkflowRun {
        let current = self.current_step_index;
        let status = self.status;
        let mut steps_state: Vec<StepState> = (0..self.step_names.len())
            .map(|i| {
                let step_status = match status {
                    RunStatus::Completed => StepStatus::Completed,
                    _ if i < current => StepStatus::Completed,
                    RunStatus::Running if i == current => StepStatus::Running,
                    RunStatus::Paused if i == current => StepStatus::Paused,
                    RunStatus::Failed if i == current => StepStatus::Failed,
                    _ => StepStatus::Pending,
                };
                StepState::builder().step_index(i).status(step_status).build()
            })
            .collect();
        for state in self.step_overrides {
            if let Some(slot) = steps_state.get_mut(state.step_index) {
                *slot = state;
            }
        }
        WorkflowRun {
            id: self.id,
            status,
            current_step_index: current,
            paused_reason: self.paused_reason,
            steps_state,
            spec_snapshot: SpecSnapshot {
                name: self.workflow_name,
                steps: self.step_names.into_iter().map(StepSpec::named).collect(),
            },
            last_activity_at: self.last_activity_at,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl WorkflowRun {
    /// Create a builder with test defaults: run `run-1`, three steps, running step 0.
    pub fn builder() -> WorkflowRunBuilder {
        WorkflowRunBuilder::default()
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
