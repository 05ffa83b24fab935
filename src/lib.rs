// ABOUTME: Main library entry point for the streaming chat relay
// ABOUTME: Provides the SSE relay server and the chat client half (renderer and history)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Chat Relay
//!
//! A thin relay between a chat UI and a hosted completions provider
//! (`OpenRouter`), plus the client half that renders the relayed stream and
//! keeps conversation history.
//!
//! ## Architecture
//!
//! - **`llm`**: upstream provider trait, `OpenRouter` client, SSE line parser, model catalog
//! - **`relay`**: upstream chunks to downstream events, idle timeout, single terminal event
//! - **`routes`** / **`server`**: axum endpoints (`POST /api/chat`, `GET /api/models`, `GET /health`)
//! - **`client`**: formatter, session state machine, history store and relay client
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use chat_relay::config::ServerConfig;
//! use chat_relay::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Chat relay configured on {}", config.bind_address());
//!     Ok(())
//! }
//! ```

/// Chat client half: formatter, renderer, session store, relay client
pub mod client;

/// Configuration management
pub mod config;

/// Application constants
pub mod constants;

/// Unified error handling
pub mod errors;

/// Upstream completions provider
pub mod llm;

/// Logging configuration
pub mod logging;

/// HTTP middleware (request IDs, tracing spans, CORS)
pub mod middleware;

/// Stream relay
pub mod relay;

/// HTTP routes
pub mod routes;

/// Server assembly and lifecycle
pub mod server;
