// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for the workflow run backend: snapshot reads, the event
//! channel and control commands.

mod bridge;
pub mod command;
pub mod fetch;
pub mod http;
pub mod subscribe;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use command::{RunCommander, TransportError};
pub use fetch::{FetchError, SnapshotFetcher};
pub use http::{HttpBackend, HttpBackendConfig};
pub use subscribe::{ChannelMessage, EventSubscriber, SubscribeError, Subscription, SubscriptionHandle};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{CommandGate, FakeBackend, FetchGate};

/// Everything a run monitor needs from the backend.
pub trait RunBackend: SnapshotFetcher + EventSubscriber + RunCommander {}

impl<T: SnapshotFetcher + EventSubscriber + RunCommander> RunBackend for T {}
