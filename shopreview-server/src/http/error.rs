//! API error types with IntoResponse
//!
//! Errors are converted to failure envelopes with appropriate status codes.
//! Database failures never leak detail to the client; the detail rides along
//! in a response extension for [`report`](super::report) to log and alert.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::report::ErrorReport;
use super::response::fail;
use crate::db::repos::DbError;
use crate::models::{messages, ValidationError};

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Request input failed validation (400)
    Validation(ValidationError),

    /// Input was well-formed but refers to nothing usable (400)
    BadRequest(&'static str),

    /// No acting user, or the acting user does not exist (401)
    Unauthorized(&'static str),

    /// Resource not found (404)
    NotFound(&'static str),

    /// Database error (500, reported)
    Database(DbError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the failure envelope.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.message(),
            Self::BadRequest(msg) | Self::Unauthorized(msg) | Self::NotFound(msg) => msg,
            Self::Database(_) => messages::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = fail(self.status(), self.message());

        match self {
            Self::Validation(e) => {
                tracing::debug!(error = %e, "rejected request input");
            }
            Self::Database(e) => {
                response.extensions_mut().insert(ErrorReport(e.to_string()));
            }
            _ => {}
        }

        response
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        Self::Database(e)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(DbError::from(e))
    }
}
