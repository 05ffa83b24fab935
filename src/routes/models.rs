// ABOUTME: Model catalog route listing the short keys the chat UI may select
// ABOUTME: Serves GET /api/models with the configured default model key
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::{constants::routes, llm::ResolvedModel, server::ServerResources};

/// `GET /api/models` response body
///
/// Not a bare array of keys: each entry pairs the short key with its upstream
/// id, and the default key is reported alongside. Clients that only need the
/// keys read `models[].key`, which keeps catalog order.
#[derive(Debug, Serialize)]
pub struct ModelListResponse {
    /// Catalog entries in display order
    pub models: Vec<ResolvedModel>,
    /// Key used when a request names no known model
    pub default: &'static str,
}

/// Model catalog routes
pub struct ModelRoutes;

impl ModelRoutes {
    /// Create the model listing route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(routes::MODELS, get(Self::list_models))
            .with_state(resources)
    }

    async fn list_models(State(resources): State<Arc<ServerResources>>) -> Json<ModelListResponse> {
        Json(ModelListResponse {
            models: resources.catalog.models().collect(),
            default: resources.catalog.default_model().key,
        })
    }
}
