// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SSE event bridge: reads one run's event stream and forwards decoded
//! events to the subscription channel.

use crate::subscribe::{ChannelMessage, SubscribeError, SubscriptionHandle};
use futures_util::StreamExt;
use reqwest::RequestBuilder;
use rw_core::RunId;
use rw_wire::{decode_run_event, SseDecoder};
use tokio::sync::mpsc;

/// Background task owning one SSE connection.
///
/// Ends when the handle is released, the receiver is dropped, or the
/// connection fails. A failure is reported once as `ChannelMessage::Error`.
pub(crate) async fn event_bridge(
    request: RequestBuilder,
    run_id: RunId,
    tx: mpsc::Sender<ChannelMessage>,
    handle: SubscriptionHandle,
) {
    let response = tokio::select! {
        biased;
        _ = handle.released() => {
            tracing::debug!(%run_id, "sse bridge: released before connect");
            return;
        }
        response = request.send() => response,
    };

    let response = match response {
        Ok(response) if response.status().is_success() => response,
        Ok(response) => {
            let status = response.status().as_u16();
            tracing::warn!(%run_id, status, "sse bridge: subscription refused");
            let _ = tx.send(ChannelMessage::Error(SubscribeError::Status(status))).await;
            return;
        }
        Err(e) => {
            tracing::warn!(%run_id, error = %e, "sse bridge: connection failed");
            let _ = tx.send(ChannelMessage::Error(SubscribeError::Connect(e.to_string()))).await;
            return;
        }
    };

    tracing::info!(%run_id, "sse bridge connected");
    if tx.send(ChannelMessage::Connected).await.is_err() {
        return;
    }

    let mut stream = response.bytes_stream();
    let mut decoder = SseDecoder::new();

    loop {
        tokio::select! {
            biased;
            _ = handle.released() => {
                tracing::debug!(%run_id, "sse bridge: released");
                break;
            }
            chunk = stream.next() => {
                let outcome = match chunk {
                    Some(Ok(bytes)) => {
                        decoder.push(&bytes);
                        None
                    }
                    Some(Err(e)) => Some(SubscribeError::Stream(e.to_string())),
                    None => Some(SubscribeError::Closed),
                };

                while let Some(frame) = decoder.next_frame() {
                    let message = match decode_run_event(&frame) {
                        Ok(Some(event)) => {
                            tracing::trace!(%run_id, event = %event.log_summary(), "sse bridge: event");
                            ChannelMessage::Event(event)
                        }
                        Ok(None) => continue,
                        Err(e) => {
                            tracing::warn!(%run_id, error = %e, "sse bridge: dropping malformed frame");
                            ChannelMessage::Malformed(e.to_string())
                        }
                    };
                    if tx.send(message).await.is_err() {
                        return;
                    }
                }

                if let Some(error) = outcome {
                    if !handle.is_released() {
                        tracing::warn!(%run_id, %error, "sse bridge: stream ended");
                        let _ = tx.send(ChannelMessage::Error(error)).await;
                    }
                    break;
                }
            }
        }
    }
}
