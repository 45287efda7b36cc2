//! Acting-user identity.
//!
//! Authentication happens upstream: the gateway verifies the session and
//! forwards the user id in the `x-user-id` header. [`identify_user`] turns
//! that header into an [`AuthUser`] request extension; routes that need an
//! actor extract `AuthUser` (401 when absent) or `Option<AuthUser>`.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use super::error::ApiError;
use crate::models::{messages, parse_id};

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user on whose behalf the request runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i32,
}

/// Middleware: attach [`AuthUser`] when the gateway header holds a valid id.
///
/// A missing or malformed header leaves the request anonymous.
pub async fn identify_user(mut request: Request, next: Next) -> Response {
    if let Some(user) = user_from_headers(request.headers()) {
        request.extensions_mut().insert(user);
    }
    next.run(request).await
}

fn user_from_headers(headers: &HeaderMap) -> Option<AuthUser> {
    let raw = headers.get(USER_ID_HEADER)?.to_str().ok()?;
    parse_id(USER_ID_HEADER, raw).ok().map(|id| AuthUser { id })
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or(ApiError::Unauthorized(messages::NEED_LOGIN))
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<AuthUser>().copied())
    }
}
