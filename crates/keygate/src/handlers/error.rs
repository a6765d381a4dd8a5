//! api error handling for http handlers.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// api error type for handler responses.
#[derive(Debug)]
pub enum ApiError {
    /// internal server error (500).
    Internal(String),
    /// unauthorized error (401).
    Unauthorized(String),
    /// not found error (404).
    NotFound(String),
    /// bad request error (400).
    BadRequest(String),
    /// conflict error (409).
    Conflict(String),
}

impl ApiError {
    /// create internal server error from any error type.
    pub fn internal(e: impl std::fmt::Display) -> Self {
        Self::Internal(e.to_string())
    }

    /// create unauthorized error.
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// create not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// create bad request error.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<keygate_store::Error> for ApiError {
    fn from(e: keygate_store::Error) -> Self {
        use keygate_store::Error;
        match e {
            Error::NotFound(_) => ApiError::NotFound(e.to_string()),
            Error::AlreadyExists(_) | Error::Conflict(_) | Error::AlreadyArchived(_) => {
                ApiError::Conflict(e.to_string())
            }
            Error::Validation(_) | Error::InvalidData(_) => ApiError::BadRequest(e.to_string()),
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<keygate_access::Error> for ApiError {
    fn from(e: keygate_access::Error) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}
