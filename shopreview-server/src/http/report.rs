//! Unhandled-error reporting.
//!
//! Handlers turn database failures into a sanitized 500 and attach the real
//! error as an [`ErrorReport`] response extension. This middleware sees the
//! request context (method, URI, acting user) and the report together, logs
//! them, and hands an alert to the [`Alerter`](crate::alert::Alerter).

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::auth::AuthUser;
use super::server::AppState;
use crate::alert::format_request_alert;

/// Error detail kept server-side for a failed request
#[derive(Debug, Clone)]
pub struct ErrorReport(pub String);

/// Middleware: log and alert on responses carrying an [`ErrorReport`].
pub async fn report_server_errors(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user_id = request.extensions().get::<AuthUser>().map(|user| user.id);

    let response = next.run(request).await;

    if let Some(ErrorReport(detail)) = response.extensions().get::<ErrorReport>() {
        tracing::error!(
            method = %method,
            uri = %uri,
            user_id = ?user_id,
            status = response.status().as_u16(),
            error = %detail,
            "request failed"
        );
        state.alerts.notify(format_request_alert(
            method.as_str(),
            &uri.to_string(),
            user_id,
            detail,
        ));
    }

    response
}
