//! API error handling.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bronze_config::{ConfigError, ValidationIssue};
use serde_json::json;

use crate::store::StoreError;

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    /// Rejected by validation; carries every failing rule.
    Unprocessable {
        message: String,
        errors: Vec<ValidationIssue>,
    },
    Internal(String),
}

impl ApiError {
    pub fn invalid(errors: Vec<ValidationIssue>) -> Self {
        ApiError::Unprocessable {
            message: format!("source configuration has {} error(s)", errors.len()),
            errors,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            ApiError::Unprocessable { message, errors } => {
                (StatusCode::UNPROCESSABLE_ENTITY, message, Some(errors))
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
        };

        let body = match errors {
            Some(errors) => Json(json!({
                "error": message,
                "errors": errors,
            })),
            None => Json(json!({
                "error": message
            })),
        };

        (status, body).into_response()
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Registry(e) => e.into(),
            ConfigError::Io(e) => ApiError::Internal(e.to_string()),
            err => match err.path() {
                Some(path) => ApiError::invalid(vec![ValidationIssue {
                    path: path.to_string(),
                    message: err.to_string(),
                }]),
                None => ApiError::BadRequest(err.to_string()),
            },
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ApiError::NotFound(msg),
            StoreError::Duplicate(msg) => ApiError::Conflict(msg),
            _ => {
                tracing::error!(error = %err, "Source store failure");
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<bronze_core::Error> for ApiError {
    fn from(err: bronze_core::Error) -> Self {
        tracing::error!(error = %err, "Registry fault");
        ApiError::Internal(err.to_string())
    }
}
