// ABOUTME: Core types for the streaming chat relay
// ABOUTME: Foundation crate with error handling, the conversation model and wire events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Chat Relay Core
//!
//! Shared types for the chat relay server and the chat client. This crate is
//! designed to change infrequently, enabling incremental compilation benefits
//! in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **models**: `ChatMessage`, `Conversation` and the relay `StreamEvent`

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Conversation data model and relay wire events
pub mod models;
