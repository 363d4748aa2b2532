// Error handling module for the Commerce API
// Provides the central error type and its HTTP response conversion

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use utoipa::ToSchema;

use crate::validation;

/// Main error type for the API
/// All handlers return `Result<T, ApiError>`
///
/// Each variant maps to one HTTP status code. Denials produced by the
/// access gate arrive here as `Unauthorized` or `Forbidden`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No credentials, or credentials that do not resolve to a principal
    /// Maps to HTTP 401 Unauthorized
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Principal lacks the role, or does not own the target
    /// Maps to HTTP 403 Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found by ID
    /// Maps to HTTP 404 Not Found
    #[error("{resource} with id {id} not found")]
    NotFound { resource: String, id: String },

    /// Operation blocked by a dependent resource (referential integrity)
    /// Maps to HTTP 400 Bad Request
    #[error("Integrity violation: {0}")]
    Conflict(String),

    /// Field constraint violations
    /// Maps to HTTP 422 Unprocessable Entity
    #[error("Validation failed on {} field(s)", .0.len())]
    ValidationFailed(Vec<FieldMessage>),

    /// Malformed query parameters
    /// Maps to HTTP 400 Bad Request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body could not be parsed into the expected JSON shape
    #[error("Malformed body: {message}")]
    MalformedBody { status: StatusCode, message: String },

    /// Database operation errors
    /// Maps to HTTP 500, details are never sent to clients
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal server errors
    /// Maps to HTTP 500, details are never sent to clients
    #[error("Internal error: {0}")]
    Internal(String),
}

/// One field-level validation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldMessage {
    #[schema(example = "price")]
    pub field_name: String,
    #[schema(example = "Price must be positive")]
    pub message: String,
}

impl FieldMessage {
    pub fn new(field_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            message: message.into(),
        }
    }
}

/// Consistent error response structure
///
/// Machine-readable `error_code` plus a human-readable `message`;
/// `errors` carries the field list of a validation failure.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "NOT_FOUND")]
    pub error_code: String,
    pub message: String,
    #[schema(example = 404)]
    pub status: u16,
    /// RFC 3339 timestamp of when the error occurred
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldMessage>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        ApiError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    /// Validation failure on a single field
    pub fn invalid_field(field_name: &str, message: impl Into<String>) -> Self {
        ApiError::ValidationFailed(vec![FieldMessage::new(field_name, message)])
    }

    /// Convert to status code and response body, logging by severity:
    /// error for 500s, warn for access denials and integrity conflicts,
    /// debug for expected client errors.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        let status = self.status_code();
        let (error_code, message, errors) = match self {
            ApiError::Unauthorized(message) => {
                warn!("Unauthorized access attempt: {}", message);
                ("UNAUTHORIZED", message.clone(), Vec::new())
            }
            ApiError::Forbidden(message) => {
                warn!("Forbidden access attempt: {}", message);
                ("FORBIDDEN", message.clone(), Vec::new())
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);
                ("NOT_FOUND", format!("{} with id {} not found", resource, id), Vec::new())
            }
            ApiError::Conflict(message) => {
                warn!("Integrity violation: {}", message);
                ("INTEGRITY_VIOLATION", message.clone(), Vec::new())
            }
            ApiError::ValidationFailed(fields) => {
                debug!("Validation error: {:?}", fields);
                ("VALIDATION_ERROR", "Request validation failed".to_string(), fields.clone())
            }
            ApiError::BadRequest(message) => {
                debug!("Bad request: {}", message);
                ("BAD_REQUEST", message.clone(), Vec::new())
            }
            ApiError::MalformedBody { message, .. } => {
                debug!("Malformed request body: {}", message);
                ("MALFORMED_BODY", message.clone(), Vec::new())
            }
            ApiError::Database(db_error) => {
                error!("Database error: {:?}", db_error);
                ("DATABASE_ERROR", "A database error occurred".to_string(), Vec::new())
            }
            ApiError::Internal(internal_msg) => {
                error!("Internal error: {}", internal_msg);
                ("INTERNAL_ERROR", "An internal server error occurred".to_string(), Vec::new())
            }
        };

        (
            status,
            ErrorResponse {
                error_code: error_code.to_string(),
                message,
                status: status.as_u16(),
                timestamp: Utc::now().to_rfc3339(),
                errors,
            },
        )
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MalformedBody { status, .. } => *status,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert validator errors to a field-level list
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationFailed(validation::field_messages(&errors))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}
