// ABOUTME: HTTP server assembly for the chat relay
// ABOUTME: Builds shared resources, the layered axum router, and runs with graceful shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Relay Server
//!
//! [`ServerResources`] holds everything a handler needs, shared behind an
//! `Arc`. [`build_router`] merges the route groups and applies the request-id,
//! tracing and CORS layers. [`run_server`] binds and serves until Ctrl-C or
//! SIGTERM, letting in-flight streams finish.

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    config::ServerConfig,
    errors::AppResult,
    llm::{LlmProvider, ModelCatalog, OpenRouterProvider},
    middleware::{make_request_span, setup_cors, MakeRelayRequestId, REQUEST_ID_HEADER},
    relay::RelayOptions,
    routes::{ChatRoutes, HealthRoutes, ModelRoutes},
};

/// Shared state for all handlers
pub struct ServerResources {
    /// Upstream completions provider
    pub provider: Arc<dyn LlmProvider>,
    /// Model key resolution
    pub catalog: ModelCatalog,
    /// Per-turn relay settings
    pub relay: RelayOptions,
}

impl ServerResources {
    /// Assemble resources around an existing provider
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, catalog: ModelCatalog, relay: RelayOptions) -> Self {
        Self {
            provider,
            catalog,
            relay,
        }
    }

    /// Build resources from configuration, using the `OpenRouter` provider
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &ServerConfig) -> AppResult<Self> {
        let provider = OpenRouterProvider::new(config.upstream.clone())?;
        Ok(Self::new(
            Arc::new(provider),
            ModelCatalog::new(&config.relay.default_model),
            RelayOptions::from(&config.relay),
        ))
    }
}

/// Build the complete router with all routes and layers
pub fn build_router(resources: Arc<ServerResources>, config: &ServerConfig) -> Router {
    let request_id_header = axum::http::HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(ChatRoutes::routes(Arc::clone(&resources)))
        .merge(ModelRoutes::routes(resources))
        .merge(HealthRoutes::routes())
        .layer(setup_cors(&config.cors))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRelayRequestId))
}

/// Bind and serve until a shutdown signal arrives
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run_server(config: ServerConfig) -> Result<()> {
    let resources = Arc::new(ServerResources::from_config(&config)?);
    let app = build_router(resources, &config);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("Chat relay listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Chat relay stopped");
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received; draining connections");
}
