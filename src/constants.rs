// ABOUTME: System-wide constants for the chat relay
// ABOUTME: Model table, upstream defaults, route paths and history limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Hardcoded defaults. Anything that can be overridden at start-up is read in
//! [`crate::config::environment`]; the values here are the fallbacks.

/// Service identity used in logs and the health endpoint
pub mod service_names {
    /// Name of the relay server binary
    pub const CHAT_RELAY_SERVER: &str = "chat-relay-server";
    /// Server version from Cargo.toml
    pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Network defaults
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 3000;
    /// Default bind address
    pub const DEFAULT_HOST: &str = "0.0.0.0";
}

/// HTTP route paths
pub mod routes {
    /// Chat relay endpoint
    pub const CHAT: &str = "/api/chat";
    /// Model key listing
    pub const MODELS: &str = "/api/models";
    /// Liveness check
    pub const HEALTH: &str = "/health";
}

/// Upstream provider defaults
pub mod upstream {
    /// Provider name used in error messages and logs
    pub const PROVIDER_NAME: &str = "OpenRouter";
    /// Default provider base URL
    pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
    /// Completions endpoint, relative to the base URL
    pub const CHAT_COMPLETIONS_PATH: &str = "chat/completions";
    /// `HTTP-Referer` sent when the caller did not send one
    pub const DEFAULT_REFERER: &str = "https://chat-gratis.vercel.app";
    /// `X-Title` sent to the provider
    pub const DEFAULT_TITLE: &str = "Super Chat GPT";
    /// Connection timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 30;
    /// Maximum silence between upstream chunks before the relay gives up
    pub const IDLE_TIMEOUT_SECS: u64 = 60;
}

/// Model catalog
pub mod models {
    /// Short model key to upstream model identifier, in display order
    pub const MODELS: &[(&str, &str)] = &[
        (
            "dolphin-mistral",
            "cognitivecomputations/dolphin-mistral-24b-venice-edition:free",
        ),
        ("llama-3.3", "meta-llama/llama-3.3-70b-instruct:free"),
        ("qwen-2.5", "qwen/qwen-2.5-72b-instruct:free"),
        ("gemini-flash", "google/gemini-2.0-flash-exp:free"),
        ("deepseek-chat", "deepseek/deepseek-chat:free"),
    ];

    /// Key used when the requested key is unknown or missing
    pub const DEFAULT_MODEL_KEY: &str = "dolphin-mistral";
}

/// Client-side history defaults
pub mod history {
    /// Storage key of the serialized history blob
    pub const STORAGE_KEY: &str = "chatHistory";
    /// Maximum number of conversations kept
    pub const CAPACITY: usize = 20;
    /// Directory name under the platform data dir for file-backed history
    pub const DATA_DIR_NAME: &str = "chat-relay";
}
