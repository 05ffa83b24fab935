// ABOUTME: Route module organization for the chat relay HTTP endpoints
// ABOUTME: Groups the chat, model catalog and health routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the chat relay
//!
//! Each domain module contains route definitions and thin handlers.

/// Chat relay route (`POST /api/chat`)
pub mod chat;
/// Health check route
pub mod health;
/// Model catalog route
pub mod models;

pub use chat::ChatRoutes;
pub use health::HealthRoutes;
pub use models::{ModelListResponse, ModelRoutes};
