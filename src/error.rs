//! Error types for the badge server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Badge Error Enum ==
/// Unified error type for the badge server.
///
/// Cache operations never produce these; only request parsing and the
/// generation pipeline do.
#[derive(Error, Debug)]
pub enum BadgeError {
    /// Malformed request path
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown badge type in the request path
    #[error(
        "Invalid badge type '{0}'. Badge type can be 'open-pr-count', 'avg-pr-time', \
         'oldest-pr-time', or 'avg-pr-merge-time'"
    )]
    InvalidBadgeType(String),

    /// Pull-request data could not be fetched or decoded
    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    /// Badge image could not be rendered
    #[error("Rendering unavailable: {0}")]
    Render(String),

    /// Inconsistent server configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BadgeError {
    /// HTTP status reported to the client for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            BadgeError::InvalidRequest(_) | BadgeError::InvalidBadgeType(_) => {
                StatusCode::BAD_REQUEST
            }
            BadgeError::Upstream(_) | BadgeError::Render(_) => StatusCode::BAD_GATEWAY,
            BadgeError::Config(_) | BadgeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for BadgeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the badge server.
pub type Result<T> = std::result::Result<T, BadgeError>;
