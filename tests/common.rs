// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides a scripted mock upstream, relay configuration and SSE body parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `chat_relay`
//!
//! The mock upstream speaks just enough of the completions API to drive the
//! relay: it records every request and answers with a scripted reply.

use std::io;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chat_relay::{
    config::{RelayConfig, ServerConfig, UpstreamConfig},
    server::{build_router, ServerResources},
};
use chat_relay_core::models::StreamEvent;
use futures_util::{stream, Stream, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

// ============================================================================
// Mock Upstream
// ============================================================================

/// API key the test relay sends upstream
pub const TEST_API_KEY: &str = "test-key";

/// Upstream end-of-stream frame
pub const SSE_DONE: &str = "data: [DONE]\n\n";

/// One upstream content frame
pub fn sse_chunk(content: &str) -> String {
    format!(
        "data: {}\n\n",
        json!({ "choices": [{ "delta": { "content": content }, "finish_reason": null }] })
    )
}

/// What the mock answers to every completions request
#[derive(Debug, Clone)]
pub enum UpstreamReply {
    /// Stream these raw body chunks, then close normally
    Stream(Vec<String>),
    /// Stream these chunks, then abort the connection
    StreamThenDrop(Vec<String>),
    /// Stream these chunks, then go silent forever
    StreamThenStall(Vec<String>),
    /// Reply with a status and plain body
    Status(u16, String),
    /// Reply 200 with a JSON body
    Json(Value),
}

/// A request as seen by the mock upstream
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub body: Value,
    pub authorization: Option<String>,
    pub referer: Option<String>,
    pub title: Option<String>,
}

struct MockState {
    reply: UpstreamReply,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Completions API stand-in listening on an ephemeral port
pub struct MockUpstream {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockUpstream {
    pub async fn start(reply: UpstreamReply) -> Self {
        init_test_logging();

        let state = Arc::new(MockState {
            reply,
            requests: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .route("/chat/completions", post(handle_completion))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// The only request received
    pub fn single_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one upstream request");
        requests.into_iter().next().unwrap()
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(ToOwned::to_owned)
}

fn frames(chunks: Vec<String>) -> impl Stream<Item = io::Result<String>> + Send + 'static {
    stream::iter(chunks.into_iter().map(Ok))
}

fn event_stream(body: Body) -> Response {
    ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}

async fn handle_completion(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.requests.lock().unwrap().push(RecordedRequest {
        body,
        authorization: header_value(&headers, "authorization"),
        referer: header_value(&headers, "http-referer"),
        title: header_value(&headers, "x-title"),
    });

    match state.reply.clone() {
        UpstreamReply::Stream(chunks) => event_stream(Body::from_stream(frames(chunks))),
        UpstreamReply::StreamThenDrop(chunks) => {
            let abort = stream::once(async {
                // Let the preceding frames reach the relay first
                tokio::time::sleep(Duration::from_millis(50)).await;
                Err(io::Error::other("upstream connection dropped"))
            });
            event_stream(Body::from_stream(frames(chunks).chain(abort)))
        }
        UpstreamReply::StreamThenStall(chunks) => {
            event_stream(Body::from_stream(frames(chunks).chain(stream::pending())))
        }
        UpstreamReply::Status(code, body) => {
            (StatusCode::from_u16(code).unwrap(), body).into_response()
        }
        UpstreamReply::Json(value) => Json(value).into_response(),
    }
}

// ============================================================================
// Relay Setup
// ============================================================================

/// Relay configuration pointing at `upstream_url` with a test API key
pub fn test_config(upstream_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_owned(),
        http_port: 0,
        upstream: UpstreamConfig {
            base_url: upstream_url.to_owned(),
            api_key: Some(TEST_API_KEY.to_owned()),
            connect_timeout: Duration::from_secs(5),
            ..UpstreamConfig::default()
        },
        relay: RelayConfig {
            idle_timeout: Duration::from_secs(5),
            ..RelayConfig::default()
        },
        ..ServerConfig::default()
    }
}

/// Full relay router for `config`
pub fn create_test_router(config: &ServerConfig) -> Router {
    let resources = Arc::new(ServerResources::from_config(config).unwrap());
    build_router(resources, config)
}

/// Serve the relay on an ephemeral port; returns its base URL
pub async fn spawn_relay(config: &ServerConfig) -> String {
    let app = create_test_router(config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Events carried by an SSE response body, in order
pub fn parse_sse_events(body: &str) -> Vec<StreamEvent> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .filter_map(|data| StreamEvent::from_data(data.trim_start()))
        .collect()
}

/// Request body for one user message
pub fn chat_body(text: &str, model: Option<&str>) -> Value {
    let mut body = json!({ "messages": [{ "role": "user", "content": text }] });
    if let Some(model) = model {
        body["model"] = json!(model);
    }
    body
}
