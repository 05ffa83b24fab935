// ABOUTME: Error handling entry point for the relay crate
// ABOUTME: Re-exports the unified AppError system from chat-relay-core
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! See [`chat_relay_core::errors`]. `AppError` implements axum's
//! `IntoResponse`, rendering `{"error": ..., "code": ...}` with the mapped
//! HTTP status.

pub use chat_relay_core::errors::{AppError, AppResult, ErrorCode, ErrorContext, ErrorResponse};
