// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP backend: REST snapshot and command calls, SSE event channel.

use crate::bridge::event_bridge;
use crate::command::{RunCommander, TransportError};
use crate::fetch::{FetchError, SnapshotFetcher};
use crate::subscribe::{EventSubscriber, Subscription, SubscriptionHandle, CHANNEL_CAPACITY};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use rw_core::{RunCommand, RunId, WorkflowRun};
use rw_wire::Route;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Default timeout for snapshot and command requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    pub base_url: String,
    pub token: Option<String>,
    /// Applies to snapshot and command calls, never to the event stream.
    pub request_timeout: Duration,
}

impl HttpBackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), token: None, request_timeout: DEFAULT_REQUEST_TIMEOUT }
    }

    rw_core::setters! {
        set { request_timeout: Duration }
        option { token: String }
    }
}

/// Backend adapter speaking HTTP to the workflow service.
///
/// Requests use a client with a per-request timeout; the event stream uses a
/// separate long-lived client without one.
#[derive(Clone)]
pub struct HttpBackend {
    config: Arc<HttpBackendConfig>,
    http_client: Client,
    stream_client: Client,
}

impl HttpBackend {
    pub fn new(config: HttpBackendConfig) -> Result<Self, reqwest::Error> {
        let headers = auth_headers(config.token.as_deref());
        let http_client = Client::builder()
            .default_headers(headers.clone())
            .timeout(config.request_timeout)
            .build()?;
        let stream_client = Client::builder()
            .default_headers(headers)
            .http1_only()
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;
        Ok(Self { config: Arc::new(config), http_client, stream_client })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

fn auth_headers(token: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => tracing::warn!("token contains invalid header characters, sending without auth"),
        }
    }
    headers
}

/// Body text of a failed response, trimmed for error messages.
async fn error_message(response: Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(body) if !body.trim().is_empty() => rw_core::short(body.trim(), 200).to_string(),
        _ => status.canonical_reason().unwrap_or("").to_string(),
    }
}

#[async_trait]
impl SnapshotFetcher for HttpBackend {
    async fn fetch(&self, run_id: &RunId) -> Result<WorkflowRun, FetchError> {
        let url = Route::Snapshot.url(&self.config.base_url, run_id);
        let start = Instant::now();
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(run_id.clone()));
        }
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(FetchError::Status { status: status.as_u16(), message });
        }

        let body = response.bytes().await.map_err(|e| FetchError::Network(e.to_string()))?;
        let run: WorkflowRun =
            serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))?;
        tracing::debug!(
            %run_id,
            status = %run.status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "fetched snapshot"
        );
        Ok(run)
    }
}

#[async_trait]
impl RunCommander for HttpBackend {
    async fn send(
        &self,
        run_id: &RunId,
        command: RunCommand,
    ) -> Result<Option<WorkflowRun>, TransportError> {
        let url = Route::from(command).url(&self.config.base_url, run_id);
        tracing::info!(%run_id, %command, "sending command");
        let response = self
            .http_client
            .post(&url)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(TransportError::Status { status: status.as_u16(), message });
        }

        // The body is informational; an unreadable one is not a failure.
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(%run_id, %command, error = %e, "command response body unreadable");
                return Ok(None);
            }
        };
        match serde_json::from_slice::<WorkflowRun>(&body) {
            Ok(run) => Ok(Some(run)),
            Err(e) => {
                tracing::debug!(%run_id, %command, error = %e, "command response is not a run");
                Ok(None)
            }
        }
    }
}

impl EventSubscriber for HttpBackend {
    fn subscribe(&self, run_id: &RunId) -> Subscription {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let handle = SubscriptionHandle::new();
        let request = self
            .stream_client
            .get(Route::Events.url(&self.config.base_url, run_id))
            .header(reqwest::header::ACCEPT, "text/event-stream");
        tokio::spawn(event_bridge(request, run_id.clone(), tx, handle.clone()));
        Subscription { messages: rx, handle }
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
