//! # API Errors
//!
//! Every failure a handler can produce, and the HTTP response each one maps to.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shared::{ErrorResponse, MissingField};
use thiserror::Error;
use tracing::{error, warn};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A required key was absent from the request body
    #[error("Invalid request: missing {0}")]
    MissingField(&'static str),

    /// The body, query string or path could not be read into the expected shape
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// The path id is not parseable as a record key
    #[error("{model} {id} invalid")]
    InvalidId { model: &'static str, id: String },

    /// No record has the requested id
    #[error("{model} {id} not found")]
    NotFound { model: &'static str, id: i64 },

    /// Storage failure; the cause is logged, never returned
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_) => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidId { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MissingField> for ApiError {
    fn from(err: MissingField) -> Self {
        ApiError::MissingField(err.0)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::Internal(cause) => error!("Request failed: {:?}", cause),
            other => warn!("Rejected request ({}): {}", status, other),
        }
        let body = Json(ErrorResponse {
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::MissingField("title").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InvalidId { model: "Book", id: "abc".to_string() }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound { model: "Book", id: 4 }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(anyhow::anyhow!("disk on fire")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ApiError::from(MissingField("description")).to_string(),
            "Invalid request: missing description"
        );
        assert_eq!(ApiError::NotFound { model: "Book", id: 4 }.to_string(), "Book 4 not found");
        assert_eq!(
            ApiError::InvalidId { model: "Book", id: "cat".to_string() }.to_string(),
            "Book cat invalid"
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let response = ApiError::from(anyhow::anyhow!("secret table name")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.message, "Internal server error");
    }
}
