// ABOUTME: Environment-based configuration for the relay server
// ABOUTME: Reads the provider secret, port and upstream overrides once at start-up
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Server configuration loaded from environment variables
//!
//! | Variable | Default |
//! |---|---|
//! | `OPENROUTER_API_KEY` | unset (chat requests fail with `CONFIG_MISSING`) |
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `3000` |
//! | `UPSTREAM_BASE_URL` | `https://openrouter.ai/api/v1` |
//! | `DEFAULT_MODEL` | `dolphin-mistral` |
//! | `UPSTREAM_REFERER` | `https://chat-gratis.vercel.app` |
//! | `UPSTREAM_TITLE` | `Super Chat GPT` |
//! | `UPSTREAM_CONNECT_TIMEOUT_SECS` | `30` |
//! | `RELAY_IDLE_TIMEOUT_SECS` | `60` |
//! | `CORS_ALLOWED_ORIGINS` | `*` |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

use crate::constants::{models, ports, upstream};
use crate::errors::{AppError, AppResult};

/// Environment variable holding the provider API key
const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Upstream provider settings
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Provider base URL, without the endpoint path
    pub base_url: String,
    /// Bearer token; `None` when not configured
    pub api_key: Option<String>,
    /// `HTTP-Referer` used when the caller sent none
    pub referer: String,
    /// `X-Title` header value
    pub title: String,
    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: upstream::DEFAULT_BASE_URL.to_owned(),
            api_key: None,
            referer: upstream::DEFAULT_REFERER.to_owned(),
            title: upstream::DEFAULT_TITLE.to_owned(),
            connect_timeout: Duration::from_secs(upstream::CONNECT_TIMEOUT_SECS),
        }
    }
}

/// Relay behavior settings
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Model key used when the request names an unknown one
    pub default_model: String,
    /// Maximum wait for the next upstream chunk
    pub idle_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            default_model: models::DEFAULT_MODEL_KEY.to_owned(),
            idle_timeout: Duration::from_secs(upstream::IDLE_TIMEOUT_SECS),
        }
    }
}

/// CORS settings
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// `*` or a comma separated origin list
    pub allowed_origins: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: "*".to_owned(),
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Upstream provider settings
    pub upstream: UpstreamConfig,
    /// Relay settings
    pub relay: RelayConfig,
    /// CORS settings
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: ports::DEFAULT_HOST.to_owned(),
            http_port: ports::DEFAULT_HTTP_PORT,
            upstream: UpstreamConfig::default(),
            relay: RelayConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_INVALID` when a numeric variable cannot be parsed.
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let api_key = env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            warn!("{API_KEY_ENV} is not set; chat requests will be rejected");
        }

        let config = Self {
            host: env_var_or("HOST", ports::DEFAULT_HOST),
            http_port: parse_env_or("PORT", ports::DEFAULT_HTTP_PORT)?,
            upstream: UpstreamConfig {
                base_url: env_var_or("UPSTREAM_BASE_URL", upstream::DEFAULT_BASE_URL),
                api_key,
                referer: env_var_or("UPSTREAM_REFERER", upstream::DEFAULT_REFERER),
                title: env_var_or("UPSTREAM_TITLE", upstream::DEFAULT_TITLE),
                connect_timeout: Duration::from_secs(parse_env_or(
                    "UPSTREAM_CONNECT_TIMEOUT_SECS",
                    upstream::CONNECT_TIMEOUT_SECS,
                )?),
            },
            relay: RelayConfig {
                default_model: env_var_or("DEFAULT_MODEL", models::DEFAULT_MODEL_KEY),
                idle_timeout: Duration::from_secs(parse_env_or(
                    "RELAY_IDLE_TIMEOUT_SECS",
                    upstream::IDLE_TIMEOUT_SECS,
                )?),
            },
            cors: CorsConfig {
                allowed_origins: env_var_or("CORS_ALLOWED_ORIGINS", "*"),
            },
        };

        if config.relay.idle_timeout.is_zero() {
            return Err(AppError::config_invalid(
                "RELAY_IDLE_TIMEOUT_SECS must be greater than zero",
            ));
        }

        Ok(config)
    }

    /// Socket address string to bind
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    /// Log-safe configuration summary (the API key is never printed)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Chat Relay Configuration:\n\
             - Listen: {}\n\
             - Upstream: {}\n\
             - API Key: {}\n\
             - Default Model: {}\n\
             - Idle Timeout: {}s\n\
             - CORS Origins: {}",
            self.bind_address(),
            self.upstream.base_url,
            if self.upstream.api_key.is_some() {
                "Configured"
            } else {
                "Missing"
            },
            self.relay.default_model,
            self.relay.idle_timeout.as_secs(),
            self.cors.allowed_origins,
        )
    }
}

/// Read an environment variable, falling back to `default` when unset
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Read and parse an environment variable, falling back to `default` when unset
fn parse_env_or<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config_invalid(format!("{key}={raw:?} is invalid: {e}"))),
        Err(_) => Ok(default),
    }
}
