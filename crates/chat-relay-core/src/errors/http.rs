// ABOUTME: axum IntoResponse integration for AppError
// ABOUTME: Renders errors as {"error": ..., "code": ...} JSON with the mapped status and request ID
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use tracing::{error, warn};

use super::{AppError, ErrorResponse};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let request_id = self.context.request_id.as_deref().unwrap_or("-");
        if status.is_server_error() {
            error!(code = ?self.code, status = status.as_u16(), request_id, "{}", self.message);
        } else {
            warn!(code = ?self.code, status = status.as_u16(), request_id, "{}", self.message);
        }

        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
