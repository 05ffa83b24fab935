// ABOUTME: Upstream LLM provider abstraction for the chat relay
// ABOUTME: Defines the completion contract (single response or chunk stream) and shared types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Upstream Provider Interface
//!
//! The relay talks to exactly one hosted completions provider per turn. This
//! module defines the contract that provider client implements:
//!
//! - **`LlmProvider`**: async trait with a non-streaming and a streaming call
//! - **`ChatRequest`**: resolved upstream model id, messages and stream flag
//! - **`StreamChunk`** / **`ChatStream`**: incremental deltas as they arrive
//!
//! ## Example
//!
//! ```rust,no_run
//! use chat_relay::llm::{ChatRequest, LlmProvider};
//! use chat_relay_core::models::ChatMessage;
//!
//! async fn example(provider: &dyn LlmProvider) {
//!     let request = ChatRequest::new(
//!         vec![ChatMessage::user("Hi")],
//!         "meta-llama/llama-3.3-70b-instruct:free",
//!     )
//!     .with_streaming();
//!     let stream = provider.complete_stream(&request).await;
//! }
//! ```

mod catalog;
mod openrouter;
pub mod sse_parser;

pub use catalog::{ModelCatalog, ResolvedModel};
pub use openrouter::OpenRouterProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;

use crate::errors::AppError;
use chat_relay_core::models::ChatMessage;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Configuration for one upstream completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation messages in order
    pub messages: Vec<ChatMessage>,
    /// Upstream model identifier (already resolved from the short key)
    pub model: String,
    /// Whether to stream the response
    pub stream: bool,
    /// Referer forwarded to the provider, when the caller sent one
    pub referer: Option<String>,
}

impl ChatRequest {
    /// Create a new non-streaming request
    #[must_use]
    pub fn new(messages: Vec<ChatMessage>, model: impl Into<String>) -> Self {
        Self {
            messages,
            model: model.into(),
            stream: false,
            referer: None,
        }
    }

    /// Enable streaming
    #[must_use]
    pub const fn with_streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    /// Forward the caller's referer
    #[must_use]
    pub fn with_referer(mut self, referer: Option<String>) -> Self {
        self.referer = referer;
        self
    }
}

/// Response from a non-streaming completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated message content
    pub content: String,
    /// Model reported by the provider
    pub model: String,
    /// Finish reason (stop, length, etc.)
    pub finish_reason: Option<String>,
}

/// A chunk of a streaming response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Content delta for this chunk
    pub delta: String,
    /// Whether this chunk is the provider's end-of-stream marker
    pub is_final: bool,
    /// Finish reason reported by the provider, if any
    pub finish_reason: Option<String>,
}

impl StreamChunk {
    /// A content delta
    #[must_use]
    pub fn delta(delta: impl Into<String>) -> Self {
        Self {
            delta: delta.into(),
            is_final: false,
            finish_reason: None,
        }
    }

    /// The provider's end-of-stream marker
    #[must_use]
    pub fn done() -> Self {
        Self {
            delta: String::new(),
            is_final: true,
            finish_reason: Some("stop".to_owned()),
        }
    }

    /// Upstream bytes arrived but completed no content frame
    ///
    /// Keep-alive comments and empty deltas surface as heartbeats; they restart
    /// the relay's idle timer and are never relayed.
    #[must_use]
    pub const fn heartbeat() -> Self {
        Self {
            delta: String::new(),
            is_final: false,
            finish_reason: None,
        }
    }

    /// Whether this chunk carries neither content nor end-of-stream
    #[must_use]
    pub fn is_heartbeat(&self) -> bool {
        self.delta.is_empty() && !self.is_final
    }
}

/// Stream type for chat completion responses
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, AppError>> + Send>>;

// ============================================================================
// Provider Trait
// ============================================================================

/// Upstream completion provider
///
/// `complete_stream` resolves once the provider has answered with response
/// headers. A non-success status is an `Err` here, before any chunk exists;
/// failures after that arrive as `Err` items inside the stream.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logs and error messages
    fn name(&self) -> &'static str;

    /// Perform a chat completion (non-streaming)
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError>;

    /// Perform a streaming chat completion
    async fn complete_stream(&self, request: &ChatRequest) -> Result<ChatStream, AppError>;
}
