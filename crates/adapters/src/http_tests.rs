// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::subscribe::{ChannelMessage, SubscribeError};
use parking_lot::Mutex;
use rw_core::test_support::log_event;
use rw_core::RunStatus;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve one canned response per connection and record each request head.
async fn serve(responses: Vec<String>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);
    tokio::spawn(async move {
        for response in responses {
            let Ok((mut stream, _)) = listener.accept().await else { return };
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => head.extend_from_slice(&buf[..n]),
                }
            }
            recorded.lock().push(String::from_utf8_lossy(&head).to_string());
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });
    (format!("http://{}", addr), requests)
}

fn json_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
}

fn sse_response(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n{}",
        body
    )
}

fn backend(base_url: &str) -> HttpBackend {
    HttpBackend::new(HttpBackendConfig::new(base_url).token("secret")).unwrap()
}

#[tokio::test]
async fn fetch_decodes_snapshot_with_bearer_token() {
    let run = WorkflowRun::builder().id("run-9").status(RunStatus::Running).build();
    let body = serde_json::to_string(&run).unwrap();
    let (base, requests) = serve(vec![json_response("200 OK", &body)]).await;

    let fetched = backend(&base).fetch(&RunId::new("run-9")).await.unwrap();
    assert_eq!(fetched, run);

    let head = requests.lock()[0].clone();
    assert!(head.starts_with("GET /api/workflow-runs/run-9 HTTP/1.1"), "{head}");
    assert!(head.to_ascii_lowercase().contains("authorization: bearer secret"), "{head}");
}

#[tokio::test]
async fn fetch_maps_not_found() {
    let (base, _) = serve(vec![json_response("404 Not Found", "")]).await;
    let run_id = RunId::new("gone");
    assert_eq!(backend(&base).fetch(&run_id).await, Err(FetchError::NotFound(run_id)));
}

#[tokio::test]
async fn fetch_maps_server_error_with_body() {
    let (base, _) = serve(vec![json_response("503 Service Unavailable", "engine restarting")]).await;
    let err = backend(&base).fetch(&RunId::new("r")).await.unwrap_err();
    assert_eq!(err, FetchError::Status { status: 503, message: "engine restarting".to_string() });
}

#[tokio::test]
async fn fetch_reports_decode_errors() {
    let (base, _) = serve(vec![json_response("200 OK", "{\"id\":\"r\"}")]).await;
    let err = backend(&base).fetch(&RunId::new("r")).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn command_posts_and_reads_informational_body() {
    let run = WorkflowRun::builder().build();
    let body = serde_json::to_string(&run).unwrap();
    let (base, requests) =
        serve(vec![json_response("200 OK", &body), json_response("202 Accepted", "queued")]).await;
    let backend = backend(&base);
    let run_id = RunId::new("run-1");

    assert_eq!(backend.send(&run_id, RunCommand::Resume).await, Ok(Some(run)));
    assert_eq!(backend.send(&run_id, RunCommand::Cancel).await, Ok(None));

    let heads = requests.lock().clone();
    assert!(heads[0].starts_with("POST /api/workflow-runs/run-1/resume "), "{}", heads[0]);
    assert!(heads[1].starts_with("POST /api/workflow-runs/run-1/cancel "), "{}", heads[1]);
}

#[tokio::test]
async fn command_failure_is_surfaced() {
    let (base, _) = serve(vec![json_response("409 Conflict", "run is not paused")]).await;
    let err = backend(&base).send(&RunId::new("r"), RunCommand::Resume).await.unwrap_err();
    assert_eq!(err, TransportError::Status { status: 409, message: "run is not paused".into() });
}

#[tokio::test]
async fn subscribe_streams_events_until_server_closes() {
    let event = log_event("run-1", "compiling");
    let body = format!(
        "{}{}event: run.event\ndata: not-json\n\n",
        rw_wire::KEEP_ALIVE,
        rw_wire::encode_run_event(&event).unwrap()
    );
    let (base, requests) = serve(vec![sse_response(&body)]).await;

    let mut sub = backend(&base).subscribe(&RunId::new("run-1"));
    assert_eq!(sub.messages.recv().await, Some(ChannelMessage::Connected));
    assert_eq!(sub.messages.recv().await, Some(ChannelMessage::Event(event)));
    assert!(matches!(sub.messages.recv().await, Some(ChannelMessage::Malformed(_))));
    assert_eq!(sub.messages.recv().await, Some(ChannelMessage::Error(SubscribeError::Closed)));
    assert_eq!(sub.messages.recv().await, None);

    let head = requests.lock()[0].to_ascii_lowercase();
    assert!(head.starts_with("get /api/workflow-runs/run-1/events"), "{head}");
    assert!(head.contains("accept: text/event-stream"), "{head}");
}

#[tokio::test]
async fn subscribe_refused_reports_status() {
    let (base, _) = serve(vec![json_response("503 Service Unavailable", "")]).await;
    let mut sub = backend(&base).subscribe(&RunId::new("run-1"));
    assert_eq!(sub.messages.recv().await, Some(ChannelMessage::Error(SubscribeError::Status(503))));
    assert_eq!(sub.messages.recv().await, None);
}

#[tokio::test]
async fn unsubscribe_before_connect_sends_nothing() {
    let backend = backend("http://127.0.0.1:9");
    let mut sub = backend.subscribe(&RunId::new("run-1"));
    assert!(sub.handle.unsubscribe());
    // The bridge either exits on release or reports the refused connection;
    // it never reports a connect.
    while let Some(message) = sub.messages.recv().await {
        assert_ne!(message, ChannelMessage::Connected);
    }
}
