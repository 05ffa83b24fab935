// ABOUTME: Unified error type, error codes and the JSON error body for the chat relay
// ABOUTME: Maps every failure class (validation, upstream, config, storage) to an HTTP status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling
//!
//! Every fallible operation in the relay and the chat client returns [`AppResult`].
//! An [`AppError`] carries a stable [`ErrorCode`], a human readable message and
//! optional context. When the error is produced by the upstream provider before
//! any byte was streamed, the upstream HTTP status is kept in the context so the
//! relay can answer with the same status.

#[cfg(feature = "http-response")]
mod http;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Request body or parameter is invalid
    InvalidInput = 3000,
    /// Data could not be read in the expected format
    InvalidFormat = 3002,
    /// HTTP method is not supported on the route
    MethodNotAllowed = 3005,

    // Resources (4000-4999)
    /// Requested resource does not exist
    ResourceNotFound = 4000,

    // External services (5000-5999)
    /// Upstream provider answered with an error
    ExternalServiceError = 5000,
    /// Upstream provider could not be reached
    ExternalServiceUnavailable = 5001,
    /// Upstream provider rejected our credentials
    ExternalAuthFailed = 5002,
    /// Upstream provider is rate limiting us
    ExternalRateLimited = 5003,
    /// Upstream provider went silent for too long
    ExternalTimeout = 5004,

    // Configuration (6000-6999)
    /// Required configuration is absent
    ConfigMissing = 6001,
    /// Configuration value could not be parsed
    ConfigInvalid = 6002,

    // Internal (9000-9999)
    /// Unexpected internal failure
    InternalError = 9000,
    /// Local storage read or write failed
    StorageError = 9002,
    /// JSON encoding or decoding failed
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput | Self::InvalidFormat => 400,
            Self::ResourceNotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::ExternalServiceError | Self::ExternalServiceUnavailable => 502,
            Self::ExternalAuthFailed | Self::ExternalRateLimited => 503,
            Self::ExternalTimeout => 504,
            Self::ConfigMissing
            | Self::ConfigInvalid
            | Self::InternalError
            | Self::StorageError
            | Self::SerializationError => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::InvalidFormat => "The data format is invalid",
            Self::MethodNotAllowed => "The HTTP method is not allowed on this route",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ExternalServiceError => "An external service encountered an error",
            Self::ExternalServiceUnavailable => "An external service is currently unavailable",
            Self::ExternalAuthFailed => "Authentication with external service failed",
            Self::ExternalRateLimited => "External service rate limit exceeded",
            Self::ExternalTimeout => "External service stopped responding",
            Self::ConfigMissing => "Required configuration is missing",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal server error occurred",
            Self::StorageError => "Storage operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }
}

/// Additional context that can be attached to errors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Request ID for tracing
    pub request_id: Option<String>,
    /// HTTP status returned by the upstream provider, when the error came from it
    pub upstream_status: Option<u16>,
}

/// Unified error type
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    pub context: ErrorContext,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add a request ID to the error context
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.context.request_id = Some(request_id.into());
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// HTTP status for this error
    ///
    /// Upstream failures keep the provider's status when it is a valid error
    /// status, otherwise the code's default is used.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        self.context
            .upstream_status
            .filter(|status| (400..=599).contains(status))
            .unwrap_or_else(|| self.code.http_status())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// JSON error body returned by every non-streamed error response
///
/// `error` is the contract the chat UI reads; `code` is informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Stable error code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    /// Request ID echoed in the `x-request-id` header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        Self {
            error: error.message.clone(),
            code: Some(error.code),
            request_id: error.context.request_id.clone(),
        }
    }
}

/// Convenience functions for creating common errors
impl AppError {
    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Method not allowed on a route
    pub fn method_not_allowed() -> Self {
        Self::new(ErrorCode::MethodNotAllowed, "Method not allowed")
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Required configuration missing
    pub fn config_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigMissing, message)
    }

    /// Configuration value invalid
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Local storage failure
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Serialization failure
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message)
    }

    /// External service error
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// External service stopped sending data
    pub fn external_timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExternalTimeout, message)
    }

    /// Upstream provider answered with a non-success status before streaming
    pub fn upstream_status(status: u16, message: impl Into<String>) -> Self {
        let code = match status {
            401 | 403 => ErrorCode::ExternalAuthFailed,
            429 => ErrorCode::ExternalRateLimited,
            502..=504 => ErrorCode::ExternalServiceUnavailable,
            _ => ErrorCode::ExternalServiceError,
        };
        let mut error = Self::new(code, message);
        error.context.upstream_status = Some(status);
        error
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string()).with_source(error)
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::storage(error.to_string()).with_source(error)
    }
}

#[cfg(feature = "provider-errors")]
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return Self::external_timeout(error.to_string()).with_source(error);
        }
        if error.is_connect() {
            return Self::new(ErrorCode::ExternalServiceUnavailable, error.to_string())
                .with_source(error);
        }
        let message = error.to_string();
        match error.status() {
            Some(status) => Self::upstream_status(status.as_u16(), message),
            None => Self::new(ErrorCode::ExternalServiceError, message),
        }
        .with_source(error)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(format!("{error:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::InvalidInput.http_status(), 400);
        assert_eq!(ErrorCode::MethodNotAllowed.http_status(), 405);
        assert_eq!(ErrorCode::ResourceNotFound.http_status(), 404);
        assert_eq!(ErrorCode::ExternalServiceError.http_status(), 502);
        assert_eq!(ErrorCode::ConfigMissing.http_status(), 500);
    }

    #[test]
    fn test_upstream_status_is_preserved() {
        let error = AppError::upstream_status(500, "API Error: 500");
        assert_eq!(error.code, ErrorCode::ExternalServiceError);
        assert_eq!(error.http_status(), 500);

        let limited = AppError::upstream_status(429, "slow down");
        assert_eq!(limited.code, ErrorCode::ExternalRateLimited);
        assert_eq!(limited.http_status(), 429);
    }

    #[test]
    fn test_non_error_upstream_status_falls_back_to_code() {
        let error = AppError::upstream_status(302, "redirected");
        assert_eq!(error.http_status(), 502);
    }

    #[test]
    fn test_error_response_serialization() {
        let error = AppError::invalid_input("Messages array is required");
        let json = serde_json::to_value(ErrorResponse::from(&error)).unwrap();
        assert_eq!(json["error"], "Messages array is required");
        assert_eq!(json["code"], "INVALID_INPUT");
        assert!(json.get("request_id").is_none());
    }

    #[test]
    fn test_request_id_reaches_error_body() {
        let error = AppError::upstream_status(429, "slow down").with_request_id("req_abc");
        assert_eq!(error.context.request_id.as_deref(), Some("req_abc"));
        assert_eq!(error.http_status(), 429);

        let json = serde_json::to_value(ErrorResponse::from(&error)).unwrap();
        assert_eq!(json["request_id"], "req_abc");
    }

    #[test]
    fn test_display_includes_description() {
        let error = AppError::not_found("Conversation 42");
        assert_eq!(
            error.to_string(),
            "The requested resource was not found: Conversation 42 not found"
        );
    }
}
