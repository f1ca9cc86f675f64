// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process workflow backend speaking just enough HTTP and SSE for the
//! `rw` binary.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::Runtime;

const PREFIX: &str = "/api/workflow-runs/";

/// One step of the scripted event stream served to the first subscriber.
#[derive(Debug, Clone)]
pub enum StreamStep {
    /// Emit a `run.event` frame carrying this `RunEvent`.
    Event(Value),
    /// Replace the snapshot served by later fetches.
    SetRun(Value),
    Sleep(Duration),
}

#[derive(Default)]
struct State {
    run: Option<Value>,
    after_command: HashMap<String, Value>,
    refuse_commands: Option<u16>,
    stream: Vec<StreamStep>,
    requests: Vec<String>,
}

pub struct FakeServer {
    base_url: String,
    state: Arc<Mutex<State>>,
    _runtime: Runtime,
}

impl FakeServer {
    pub fn start() -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        let listener = runtime.block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let state = Arc::new(Mutex::new(State::default()));

        let shared = Arc::clone(&state);
        runtime.spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, Arc::clone(&shared)));
            }
        });
        Self { base_url, state, _runtime: runtime }
    }

    pub fn with_run(self, run: Value) -> Self {
        self.state.lock().unwrap().run = Some(run);
        self
    }

    /// Serve `run` once `command` ("resume" or "cancel") is accepted.
    pub fn after_command(self, command: &str, run: Value) -> Self {
        self.state.lock().unwrap().after_command.insert(command.to_string(), run);
        self
    }

    /// Answer every command with `status`.
    pub fn refuse_commands(self, status: u16) -> Self {
        self.state.lock().unwrap().refuse_commands = Some(status);
        self
    }

    pub fn stream(self, steps: Vec<StreamStep>) -> Self {
        self.state.lock().unwrap().stream = steps;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `"<METHOD> <path>"` of every request, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn posts(&self) -> Vec<String> {
        self.requests().into_iter().filter(|r| r.starts_with("POST ")).collect()
    }
}

/// A `WorkflowRun` for `run-1` with three steps, positioned on `step`.
pub fn run_json(status: &str, step: usize) -> Value {
    let names = ["build", "test", "release"];
    let states: Vec<Value> = (0..names.len())
        .map(|i| {
            let step_status = match status {
                "completed" => "completed",
                _ if i < step => "completed",
                "paused" if i == step => "paused",
                "failed" if i == step => "failed",
                "running" if i == step => "running",
                _ => "pending",
            };
            json!({ "step_index": i, "status": step_status })
        })
        .collect();
    let mut run = json!({
        "id": "run-1",
        "status": status,
        "current_step_index": step,
        "steps_state": states,
        "spec_snapshot": {
            "name": "deploy",
            "steps": names.iter().map(|n| json!({ "name": n })).collect::<Vec<_>>(),
        },
        "last_activity_at": "2026-01-01T00:00:00Z",
    });
    if status == "paused" {
        run["paused_reason"] = json!("awaiting_approval");
    }
    run
}

async fn serve(mut stream: TcpStream, state: Arc<Mutex<State>>) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    let head = String::from_utf8_lossy(&head).to_string();
    let mut parts = head.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();
    state.lock().unwrap().requests.push(format!("{method} {path}"));

    let Some(rest) = path.strip_prefix(PREFIX) else {
        respond(&mut stream, 404, &json!({ "error": "no route" })).await;
        return;
    };
    let segments: Vec<&str> = rest.split('/').collect();
    match (method.as_str(), segments.as_slice()) {
        ("GET", [run_id]) => {
            let run = state.lock().unwrap().run.clone();
            match run.filter(|r| r["id"] == *run_id) {
                Some(run) => respond(&mut stream, 200, &run).await,
                None => respond(&mut stream, 404, &json!({ "error": "run not found" })).await,
            }
        }
        ("GET", [_, "events"]) => stream_events(stream, state).await,
        ("POST", [_, command @ ("resume" | "cancel")]) => {
            let (refused, run) = {
                let mut state = state.lock().unwrap();
                if let Some(next) = state.after_command.remove(*command) {
                    state.run = Some(next);
                }
                (state.refuse_commands, state.run.clone())
            };
            match refused {
                Some(status) => {
                    respond(&mut stream, status, &json!({ "error": "command refused" })).await
                }
                None => respond(&mut stream, 200, &run.unwrap_or(Value::Null)).await,
            }
        }
        _ => respond(&mut stream, 404, &json!({ "error": "no route" })).await,
    }
}

async fn respond(stream: &mut TcpStream, status: u16, body: &Value) {
    let body = body.to_string();
    let response = format!(
        "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn stream_events(mut stream: TcpStream, state: Arc<Mutex<State>>) {
    let head = "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nCache-Control: no-cache\r\nConnection: close\r\n\r\n: keep-alive\n\n";
    if stream.write_all(head.as_bytes()).await.is_err() {
        return;
    }

    let steps = std::mem::take(&mut state.lock().unwrap().stream);
    for step in steps {
        match step {
            StreamStep::Event(event) => {
                let frame = format!("event: run.event\ndata: {event}\n\n");
                if stream.write_all(frame.as_bytes()).await.is_err() {
                    return;
                }
            }
            StreamStep::SetRun(run) => {
                state.lock().unwrap().run = Some(run);
            }
            StreamStep::Sleep(duration) => tokio::time::sleep(duration).await,
        }
    }

    // Hold the stream open until the client goes away
    let mut buf = [0u8; 64];
    let _ = tokio::time::timeout(Duration::from_secs(30), async {
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
        }
    })
    .await;
}
