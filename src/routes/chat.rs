// ABOUTME: Chat relay route handlers: validates a turn and streams the completion back
// ABOUTME: Serves POST /api/chat as Server-Sent Events (or a single JSON body when stream=false)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Chat relay routes
//!
//! `POST /api/chat` accepts `{messages, model?, stream?}`. Errors detected
//! before the upstream starts streaming are ordinary JSON responses
//! (`{"error": ...}`) with a matching status. Once streaming starts the status
//! is 200 and failures arrive in-band as a `{"error": ...}` frame.

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_stream::StreamExt;

use crate::{
    constants::routes,
    errors::AppError,
    llm::ChatRequest,
    logging::RelayLogger,
    middleware::REQUEST_ID_HEADER,
    relay::relay_events,
    server::ServerResources,
};
use chat_relay_core::models::ChatMessage;

/// Required-messages validation message, shown verbatim by the chat UI
const MESSAGES_REQUIRED: &str = "Messages array is required";

/// Parsed and validated chat request body
#[derive(Debug)]
struct ChatTurn {
    messages: Vec<ChatMessage>,
    model: Option<String>,
    stream: bool,
}

impl ChatTurn {
    /// Validate a raw JSON body
    ///
    /// `messages` must be a non-empty array of `{role, content}` objects with
    /// role `user` or `assistant`. `stream` defaults to `true`.
    fn from_body(body: &Value) -> Result<Self, AppError> {
        let items = match body.get("messages") {
            Some(Value::Array(items)) if !items.is_empty() => items,
            _ => return Err(AppError::invalid_input(MESSAGES_REQUIRED)),
        };

        let messages = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                ChatMessage::deserialize(item).map_err(|e| {
                    AppError::invalid_input(format!("messages[{index}] is invalid: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            messages,
            model: body
                .get("model")
                .and_then(Value::as_str)
                .map(ToOwned::to_owned),
            stream: body.get("stream").and_then(Value::as_bool).unwrap_or(true),
        })
    }
}

/// Chat routes handler
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create the chat relay route
    ///
    /// Methods other than POST (and CORS preflight) get `405 {"error": "Method not allowed"}`.
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                routes::CHAT,
                post(Self::relay_chat)
                    .options(Self::preflight)
                    .fallback(Self::method_not_allowed),
            )
            .with_state(resources)
    }

    async fn preflight() -> StatusCode {
        StatusCode::OK
    }

    async fn method_not_allowed() -> AppError {
        AppError::method_not_allowed()
    }

    /// Relay one chat turn to the upstream provider
    ///
    /// Error bodies carry the turn's `x-request-id`.
    async fn relay_chat(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Result<Json<Value>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);

        Self::start_turn(&resources, &headers, body)
            .await
            .map_err(|mut error| {
                if let Some(id) = request_id {
                    error = error.with_request_id(id);
                }
                error
            })
    }

    async fn start_turn(
        resources: &ServerResources,
        headers: &HeaderMap,
        body: Result<Json<Value>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let Json(body) = body.map_err(|rejection| {
            AppError::invalid_input(format!("Invalid request body: {}", rejection.body_text()))
        })?;
        let turn = ChatTurn::from_body(&body)?;

        let model = resources.catalog.resolve(turn.model.as_deref());
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);

        RelayLogger::log_turn_started(model.key, turn.messages.len(), turn.stream);

        let request = ChatRequest::new(turn.messages, model.id).with_referer(referer);

        if !turn.stream {
            let response = resources.provider.complete(&request).await?;
            return Ok(Json(json!({ "text": response.content })).into_response());
        }

        // Awaited before any byte is sent so an upstream status error is a plain JSON response
        let upstream = resources
            .provider
            .complete_stream(&request.with_streaming())
            .await?;

        let events = relay_events(upstream, resources.relay)
            .map(|event| Ok::<_, Infallible>(Event::default().data(event.to_data())));

        Ok((
            [
                (header::CACHE_CONTROL, "no-cache, no-transform"),
                (HeaderName::from_static("x-accel-buffering"), "no"),
            ],
            Sse::new(events).keep_alive(KeepAlive::default()),
        )
            .into_response())
    }
}
