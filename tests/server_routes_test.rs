// ABOUTME: Integration tests for the model catalog and health routes
// ABOUTME: Checks the JSON shapes served next to the chat relay
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use common::{create_test_router, test_config};
use helpers::axum_test::AxumTestRequest;
use serde_json::Value;

#[tokio::test]
async fn test_models_lists_catalog_in_order() {
    let config = test_config("http://127.0.0.1:9");

    let response = AxumTestRequest::get("/api/models")
        .send(create_test_router(&config))
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["default"], "dolphin-mistral");

    let models = body["models"].as_array().unwrap();
    assert_eq!(models.len(), 5);
    assert_eq!(models[0]["key"], "dolphin-mistral");
    assert_eq!(
        models[1]["id"],
        "meta-llama/llama-3.3-70b-instruct:free"
    );
}

#[tokio::test]
async fn test_models_default_follows_configuration() {
    let mut config = test_config("http://127.0.0.1:9");
    config.relay.default_model = "qwen-2.5".to_owned();

    let body: Value = AxumTestRequest::get("/api/models")
        .send(create_test_router(&config))
        .await
        .json();

    assert_eq!(body["default"], "qwen-2.5");
}

#[tokio::test]
async fn test_health_reports_service() {
    let config = test_config("http://127.0.0.1:9");

    let response = AxumTestRequest::get("/health")
        .send(create_test_router(&config))
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "chat-relay-server");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let config = test_config("http://127.0.0.1:9");

    let response = AxumTestRequest::get("/api/unknown")
        .send(create_test_router(&config))
        .await;

    assert_eq!(response.status(), 404);
}
