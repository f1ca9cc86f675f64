// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rw-core: Data model for the Runwatch workflow run monitor

pub mod macros;

pub mod clock;
pub mod command;
pub mod effect;
pub mod event;
pub mod id;
pub mod log;
pub mod run;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use command::RunCommand;
pub use effect::Effect;
pub use event::{RunEvent, RunEventType};
pub use id::{short, RunId};
pub use log::{LogBuffer, LogLine, SharedLogBuffer};
#[cfg(any(test, feature = "test-support"))]
pub use run::{StepStateBuilder, WorkflowRunBuilder};
pub use run::{
    InvariantViolation, PausedReason, RunStatus, SpecSnapshot, StepSpec, StepState, StepStatus,
    WorkflowRun,
};
