// ABOUTME: Unified error type for the assistant backend with HTTP status mapping
// ABOUTME: Provides AppError, ErrorCode and the AppResult alias used across all modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Unified error handling
//!
//! Every fallible operation in the crate returns [`AppResult`]. Route handlers
//! can return `Result<Response, AppError>` directly: the error renders as a
//! `{"error": "<message>"}` body with the status implied by its [`ErrorCode`].

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Convenience alias for results carrying an [`AppError`]
pub type AppResult<T> = Result<T, AppError>;

/// Stable error classification used for logging and HTTP mapping
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Caller supplied invalid or missing input
    InvalidInput,
    /// Requested resource does not exist
    ResourceNotFound,
    /// Configuration is missing or malformed
    ConfigError,
    /// An upstream service failed in a way the caller must see
    ExternalServiceError,
    /// Unexpected internal failure
    InternalError,
}

impl ErrorCode {
    /// HTTP status returned for this error code
    #[must_use]
    pub const fn http_status(self) -> StatusCode {
        match self {
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::ResourceNotFound => StatusCode::NOT_FOUND,
            Self::ExternalServiceError => StatusCode::BAD_GATEWAY,
            Self::ConfigError | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidInput => "invalid_input",
            Self::ResourceNotFound => "resource_not_found",
            Self::ConfigError => "config_error",
            Self::ExternalServiceError => "external_service_error",
            Self::InternalError => "internal_error",
        };
        f.write_str(name)
    }
}

/// Application error with a classification code and a human-readable message
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct AppError {
    /// Error classification
    pub code: ErrorCode,
    /// Message safe to show to API clients
    pub message: String,
}

impl AppError {
    /// Create an error with an explicit code
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Invalid or missing caller input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Resource lookup failed
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceNotFound, message)
    }

    /// Missing or malformed configuration
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Upstream service failure, prefixed with the service name
    pub fn external_service(service: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{service}: {message}"),
        )
    }

    /// Unexpected internal failure
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// HTTP status for this error
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if status.is_server_error() {
            error!(code = %self.code, "Request failed: {}", self.message);
        }
        (status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        Self::internal(format!("JSON serialization error: {e}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        Self::internal(format!("IO error: {e}"))
    }
}
