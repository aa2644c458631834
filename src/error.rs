/*
 * Responsibility
 * - AppError for the HTTP boundary
 * - IntoResponse (HTTP status / JSON error body)
 * - Maps authorizer failures: bad/stale token -> 401, key outage -> 503
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::auth::AuthorizeError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("unauthorized")]
    Unauthorized,
    #[error("token expired")]
    TokenExpired,
    #[error("verification key unavailable")]
    KeyUnavailable,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::BadRequest { code, .. } => (StatusCode::BAD_REQUEST, *code),
            AppError::Unauthorized | AppError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
            }
            AppError::KeyUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "KEY_UNAVAILABLE"),
        };

        let message = match &self {
            AppError::BadRequest { message, .. } => message.clone(),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthorizeError> for AppError {
    fn from(e: AuthorizeError) -> Self {
        match e {
            AuthorizeError::MalformedToken(_) => AppError::Unauthorized,
            AuthorizeError::ExpiredToken => AppError::TokenExpired,
            AuthorizeError::KeyUnavailable(_) => AppError::KeyUnavailable,
        }
    }
}
