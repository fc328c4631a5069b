//! API Errors
//!
//! Every failure becomes a JSON body `{"error": ..}`; validation failures add
//! a `fields` list. Storage detail never leaves the process.

use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use student_core::{FieldError, StorageError, ValidationErrors};

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Handler errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Request body absent or whitespace only
    #[error("empty body")]
    EmptyBody,

    /// Request body could not be read (too large, aborted mid-stream)
    #[error("{message}")]
    UnreadableBody { status: StatusCode, message: String },

    /// Request body is not the expected JSON
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Path id is not a positive integer
    #[error("invalid student id: {0}")]
    InvalidId(String),

    /// One or more fields failed validation
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// No row for the id
    #[error("no student found with id {id}")]
    NotFound { id: i64 },

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Backend failure
    #[error("internal server error")]
    Storage(StorageError),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { id } => Self::NotFound { id },
            other => Self::Storage(other),
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        Self::UnreadableBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidId(rejection.body_text())
    }
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::EmptyBody
            | ApiError::InvalidBody(_)
            | ApiError::InvalidId(_)
            | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::UnreadableBody { status, .. } => *status,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Validation(errors) => Self {
                error: "validation failed".to_string(),
                fields: errors.into_fields(),
            },
            other => Self {
                error: other.to_string(),
                fields: Vec::new(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Storage(source) = &self {
            tracing::error!(error = %source, "storage failure");
        }

        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use student_core::StudentRequest;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = ApiError::from(StorageError::not_found(9));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "no student found with id 9");
    }

    #[test]
    fn test_backend_failure_is_opaque_500() {
        let err = ApiError::from(StorageError::read("disk I/O error at page 42"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = ErrorResponse::from(err);
        assert_eq!(body.error, "internal server error");
        assert!(body.fields.is_empty());
    }

    #[test]
    fn test_validation_body_lists_fields() {
        let errors = StudentRequest {
            name: Some("Ann".to_string()),
            email: Some("ann@x.com".to_string()),
            age: Some(-5),
        }
        .validate()
        .unwrap_err();

        let err = ApiError::from(errors);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let body = ErrorResponse::from(err);
        assert_eq!(body.error, "validation failed");
        assert_eq!(body.fields.len(), 1);
        assert_eq!(body.fields[0].field, "age");
    }

    #[test]
    fn test_empty_body_message() {
        let body = ErrorResponse::from(ApiError::EmptyBody);
        assert_eq!(body.error, "empty body");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"error": "empty body"})
        );
    }
}
