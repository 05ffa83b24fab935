// ABOUTME: HTTP client for the relay's chat endpoint, reading the SSE reply as relay events
// ABOUTME: Maps non-success responses from their {"error"} body to AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::pin::Pin;
use std::time::Duration;

use futures_util::{pin_mut, Stream, StreamExt};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::constants::{routes, upstream};
use crate::errors::{AppError, AppResult, ErrorResponse};
use crate::llm::sse_parser::{SseEvent, SseLineBuffer};
use chat_relay_core::models::{ChatMessage, StreamEvent};

/// Relay events for one turn; always ends with a terminal event
pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// One entry of `GET /api/models`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelEntry {
    /// Short key sent as `model`
    pub key: String,
    /// Provider model identifier
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    models: Vec<ModelEntry>,
}

/// Client for a running relay server
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    base_url: String,
}

impl RelayClient {
    /// Create a client for the relay at `base_url` (for example `http://127.0.0.1:3000`)
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(upstream::CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send one turn and stream the reply
    ///
    /// # Errors
    ///
    /// Returns an error if the relay cannot be reached or answers with an
    /// error status; the error carries the relay's `error` message.
    pub async fn stream_chat(&self, messages: &[ChatMessage], model: &str) -> AppResult<EventStream> {
        let response = self
            .client
            .post(self.url(routes::CHAT))
            .json(&json!({ "messages": messages, "model": model, "stream": true }))
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Ok(Self::read_events(response))
    }

    /// Send one turn and wait for the whole reply
    ///
    /// # Errors
    ///
    /// Returns an error if the relay cannot be reached or answers with an error status.
    pub async fn complete_chat(&self, messages: &[ChatMessage], model: &str) -> AppResult<String> {
        #[derive(Deserialize)]
        struct TextReply {
            text: String,
        }

        let response = self
            .client
            .post(self.url(routes::CHAT))
            .json(&json!({ "messages": messages, "model": model, "stream": false }))
            .send()
            .await?;

        let reply: TextReply = Self::check_status(response).await?.json().await?;
        Ok(reply.text)
    }

    /// Fetch the relay's model catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the relay cannot be reached or answers with an error status.
    pub async fn list_models(&self) -> AppResult<Vec<ModelEntry>> {
        let response = self.client.get(self.url(routes::MODELS)).send().await?;
        let list: ModelList = Self::check_status(response).await?.json().await?;
        Ok(list.models)
    }

    async fn check_status(response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or_else(|_| format!("Relay returned HTTP {}", status.as_u16()));

        Err(AppError::upstream_status(status.as_u16(), message))
    }

    /// Parse the relay's SSE body; the connection closing counts as completion
    fn read_events(response: Response) -> EventStream {
        let byte_stream = response.bytes_stream();

        Box::pin(async_stream::stream! {
            let mut parser = SseLineBuffer::new();
            pin_mut!(byte_stream);

            while let Some(next) = byte_stream.next().await {
                let bytes = match next {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        yield StreamEvent::Error(format!("Connection to relay lost: {e}"));
                        return;
                    }
                };

                for event in parser.feed(&bytes) {
                    let event = match event {
                        SseEvent::Done => StreamEvent::Done,
                        SseEvent::Data(data) => match StreamEvent::from_data(&data) {
                            Some(event) => event,
                            None => {
                                debug!("Skipping unrecognized relay frame");
                                continue;
                            }
                        },
                    };
                    let terminal = event.is_terminal();
                    yield event;
                    if terminal {
                        return;
                    }
                }
            }

            yield StreamEvent::Done;
        })
    }
}
