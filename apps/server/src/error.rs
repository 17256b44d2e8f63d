//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Patungan                               │
//! │                                                                         │
//! │  Frontend                    Rust Backend                               │
//! │  ────────                    ────────────                               │
//! │                                                                         │
//! │  fetch('/api/bills')                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler Function                                                │  │
//! │  │  Result<Json<T>, ApiError>                                       │  │
//! │  │         │                                                        │  │
//! │  │  Database Error? ──── DbError::NotFound ─────────┐              │  │
//! │  │  Validation Error? ── CoreError::Validation ──── ApiError ─────►│  │
//! │  │  Engine Error? ────── CoreError::HostNotFound ───┘              │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄──── HTTP status + {"code": "NOT_FOUND", "message": "..."} ────────   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use patungan_core::CoreError;
use patungan_db::DbError;

/// API error returned from HTTP handlers.
///
/// ## Serialization
/// This is what the frontend receives when a request fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Bill not found: 550e8400-..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Missing or invalid credentials (401)
    Unauthorized,

    /// Business logic error (422)
    BusinessLogic,

    /// Database operation failed (500)
    DatabaseError,

    /// Upstream extraction service failed (502)
    UpstreamError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::BusinessLogic => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::UpstreamError => StatusCode::BAD_GATEWAY,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates an upstream (extraction) error.
    pub fn upstream(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::UpstreamError, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::CorruptAggregate {
                bill_id, column, ..
            } => {
                tracing::error!(bill_id = %bill_id, column = %column, "Corrupt bill payload");
                ApiError::new(ErrorCode::DatabaseError, "Stored bill is corrupt")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
///
/// Engine lookup failures (dangling references inside a stored bill) are
/// business-logic errors: the request was well-formed, the data wasn't.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ParticipantNotFound(id) => ApiError::not_found("Participant", &id),
            CoreError::ItemNotFound(id) => ApiError::not_found("Item", &id),
            CoreError::ExtraNotFound(id) => ApiError::not_found("Extra", &id),
            err @ CoreError::UnknownItemParticipant { .. }
            | err @ CoreError::HostNotFound { .. }
            | err @ CoreError::HostRemoval(_) => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            err @ CoreError::TooManyItems { .. } | err @ CoreError::QuantityTooLarge { .. } => {
                ApiError::new(ErrorCode::ValidationError, err.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use patungan_core::ValidationError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorCode::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ErrorCode::BusinessLogic.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ErrorCode::UpstreamError.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_db_not_found_maps_to_404() {
        let err: ApiError = patungan_db::DbError::not_found("Bill", "b-1").into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Bill not found: b-1");
    }

    #[test]
    fn test_engine_lookup_error_maps_to_business_logic() {
        let err: ApiError = CoreError::HostNotFound {
            host_id: "ghost".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[test]
    fn test_validation_error_maps_to_400() {
        let err: ApiError = CoreError::Validation(ValidationError::NotEnoughParticipants {
            min: 2,
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_error_serializes_with_screaming_code() {
        let json = serde_json::to_value(ApiError::not_found("Bill", "b-1")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
    }
}
