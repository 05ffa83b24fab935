// ABOUTME: Configuration management module for the relay server
// ABOUTME: Environment-only configuration read once at process start
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! - **Environment**: Server configuration from environment variables

/// Environment and server configuration
pub mod environment;

pub use environment::{CorsConfig, RelayConfig, ServerConfig, UpstreamConfig};
