//! Response envelope shared by every API route
//!
//! ```json
//! { "status": 200, "success": true, "message": "...", "data": { } }
//! { "status": 400, "success": false, "message": "..." }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
struct Envelope<T> {
    status: u16,
    success: bool,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

/// Successful response carrying a payload
#[derive(Debug)]
pub struct Success<T> {
    status: StatusCode,
    message: &'static str,
    data: T,
}

impl<T> Success<T> {
    /// 200 with `data`.
    pub fn ok(message: &'static str, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            message,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for Success<T> {
    fn into_response(self) -> Response {
        let body = Envelope {
            status: self.status.as_u16(),
            success: true,
            message: self.message,
            data: Some(self.data),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Failure response; never carries a payload.
pub fn fail(status: StatusCode, message: &'static str) -> Response {
    let body = Envelope::<()> {
        status: status.as_u16(),
        success: false,
        message,
        data: None,
    };
    (status, Json(body)).into_response()
}
