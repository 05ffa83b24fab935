// ABOUTME: OpenRouter chat completions client (OpenAI-compatible wire format)
// ABOUTME: Sends bearer-authenticated requests and turns the SSE response into a chunk stream
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # `OpenRouter` Provider
//!
//! Posts `{model, messages, stream}` to `{base_url}/chat/completions` with
//! the attribution headers `OpenRouter` expects (`HTTP-Referer`, `X-Title`).
//! The base URL is configurable so tests can point it at a local server.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::sse_parser::create_sse_stream;
use super::{ChatRequest, ChatResponse, ChatStream, LlmProvider, StreamChunk};
use crate::config::UpstreamConfig;
use crate::constants::upstream::{CHAT_COMPLETIONS_PATH, PROVIDER_NAME};
use crate::errors::AppError;
use chat_relay_core::models::ChatMessage;

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamFrame {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Option<StreamDelta>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

// ============================================================================
// Provider
// ============================================================================

/// `OpenRouter` completions client
pub struct OpenRouterProvider {
    client: Client,
    config: UpstreamConfig,
}

impl OpenRouterProvider {
    /// Create a provider with the given upstream settings
    ///
    /// No overall request timeout is set: streamed responses are bounded by
    /// the relay's idle timeout instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: UpstreamConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            CHAT_COMPLETIONS_PATH
        )
    }

    fn build_request(&self, request: &ChatRequest) -> Result<RequestBuilder, AppError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::config_missing("API key not configured"))?;

        let referer = request.referer.as_deref().unwrap_or(&self.config.referer);

        Ok(self
            .client
            .post(self.api_url())
            .bearer_auth(api_key)
            .header("HTTP-Referer", referer)
            .header("X-Title", &self.config.title)
            .json(&CompletionRequest {
                model: &request.model,
                messages: &request.messages,
                stream: request.stream,
            }))
    }

    async fn send(&self, request: &ChatRequest) -> Result<Response, AppError> {
        let response = self.build_request(request)?.send().await.map_err(|e| {
            error!("Failed to send request to {PROVIDER_NAME}: {e}");
            AppError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                status = status.as_u16(),
                body = %body.chars().take(500).collect::<String>(),
                "{PROVIDER_NAME} returned an error status"
            );
            return Err(AppError::upstream_status(
                status.as_u16(),
                format!("API Error: {}", status.as_u16()),
            ));
        }

        Ok(response)
    }

    /// Parse one upstream `data:` payload
    ///
    /// Malformed JSON is dropped. An in-band `error` object ends the stream.
    fn parse_stream_data(json_str: &str) -> Option<Result<StreamChunk, AppError>> {
        let frame = match serde_json::from_str::<StreamFrame>(json_str) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("Dropping unparseable stream frame: {e}");
                return None;
            }
        };

        if let Some(detail) = frame.error {
            let message = if detail.message.is_empty() {
                "Upstream reported an error".to_owned()
            } else {
                detail.message
            };
            return Some(Err(AppError::external_service(PROVIDER_NAME, message)));
        }

        let choice = frame.choices.into_iter().next()?;
        Some(Ok(StreamChunk {
            delta: choice.delta.and_then(|d| d.content).unwrap_or_default(),
            is_final: false,
            finish_reason: choice.finish_reason,
        }))
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let mut request = request.clone();
        request.stream = false;

        let body = self.send(&request).await?.text().await.map_err(|e| {
            AppError::external_service(PROVIDER_NAME, format!("Failed to read response: {e}"))
        })?;

        let parsed: CompletionResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse API response: {e}");
            AppError::external_service(PROVIDER_NAME, format!("Failed to parse response: {e}"))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::external_service(PROVIDER_NAME, "API returned no choices"))?;

        Ok(ChatResponse {
            content: choice.message.content.unwrap_or_default(),
            model: parsed.model,
            finish_reason: choice.finish_reason,
        })
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete_stream(&self, request: &ChatRequest) -> Result<ChatStream, AppError> {
        let mut request = request.clone();
        request.stream = true;

        let response = self.send(&request).await?;
        debug!("Upstream accepted streaming request");

        Ok(create_sse_stream(
            response.bytes_stream(),
            Self::parse_stream_data,
            PROVIDER_NAME,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_delta() {
        let chunk = OpenRouterProvider::parse_stream_data(
            r#"{"choices":[{"delta":{"content":"Hel"},"finish_reason":null}]}"#,
        );
        assert_eq!(chunk.unwrap().unwrap().delta, "Hel");
    }

    #[test]
    fn test_malformed_and_empty_frames() {
        assert!(OpenRouterProvider::parse_stream_data("{not json").is_none());
        assert!(OpenRouterProvider::parse_stream_data(r#"{"choices":[]}"#).is_none());
        let role_only =
            OpenRouterProvider::parse_stream_data(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#);
        assert_eq!(role_only.unwrap().unwrap().delta, "");
    }

    #[test]
    fn test_in_band_error_payload() {
        let item = OpenRouterProvider::parse_stream_data(
            r#"{"error":{"message":"Provider returned error","code":502}}"#,
        );
        let err = item.unwrap().unwrap_err();
        assert!(err.message.contains("Provider returned error"));
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let provider = OpenRouterProvider::new(UpstreamConfig::default()).unwrap();
        let request = ChatRequest::new(vec![ChatMessage::user("Hi")], "m");
        let err = provider.build_request(&request).unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::ConfigMissing);
        assert_eq!(err.message, "API key not configured");
    }
}
