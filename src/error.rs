//! Service error types with HTTP status code mapping.
//!
//! [`MonitorError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "unknown device: ESP32-042",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                  |
/// |-----------|-------------------|------------------------------|
/// | 1000–1999 | Validation        | 400 / 422                    |
/// | 2000–2999 | State / Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server            | 500 Internal Server Error    |
/// | 4000–4999 | Auth              | 401 / 403                    |
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Out-of-range values reached the threshold evaluator. The store
    /// schema bounds all percentages, so this indicates a data-integrity
    /// bug upstream rather than a runtime condition to tolerate.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Ingest referenced an unregistered device identifier.
    #[error("unknown device: {0}")]
    UnknownDevice(String),

    /// Operation referenced a nonexistent entity.
    #[error("{0} not found")]
    NotFound(String),

    /// Resolving or assigning an alert that is already terminal.
    #[error("alert {0} is already resolved")]
    AlreadyResolved(i64),

    /// Duplicate-alert race detected at the store layer. Recovered
    /// internally by the lifecycle manager (the loser is a no-op); only
    /// surfaces to callers for non-alert uniqueness violations.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Registration with an email that is already in use.
    #[error("email already registered: {0}")]
    EmailTaken(String),

    /// Missing, malformed, or expired bearer credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller role lacks the capability for this operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MonitorError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidInput(_) => 1002,
            Self::UnknownDevice(_) => 2001,
            Self::NotFound(_) => 2002,
            Self::AlreadyResolved(_) => 2003,
            Self::Conflict(_) => 2004,
            Self::EmailTaken(_) => 2005,
            Self::Persistence(_) => 3001,
            Self::Internal(_) => 3000,
            Self::Unauthorized(_) => 4001,
            Self::Forbidden(_) => 4003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UnknownDevice(_) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyResolved(_) | Self::Conflict(_) | Self::EmailTaken(_) => {
                StatusCode::CONFLICT
            }
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for MonitorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_categories() {
        assert_eq!(
            MonitorError::UnknownDevice("ESP32-042".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            MonitorError::AlreadyResolved(7).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            MonitorError::InvalidInput("fill=150".to_string()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            MonitorError::Forbidden("agents only".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            MonitorError::InvalidRequest(String::new()).error_code(),
            1001
        );
        assert_eq!(MonitorError::UnknownDevice(String::new()).error_code(), 2001);
        assert_eq!(MonitorError::AlreadyResolved(1).error_code(), 2003);
        assert_eq!(MonitorError::Unauthorized(String::new()).error_code(), 4001);
    }

    #[test]
    fn display_includes_context() {
        let err = MonitorError::NotFound("alert 12".to_string());
        assert_eq!(err.to_string(), "alert 12 not found");
    }
}
