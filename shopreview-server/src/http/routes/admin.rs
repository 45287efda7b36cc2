//! Admin endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::delete,
    Router,
};
use serde::Serialize;

use crate::db::repos::{ReviewRepo, UserRepo};
use crate::http::auth::AuthUser;
use crate::http::error::ApiError;
use crate::http::response::Success;
use crate::http::server::AppState;
use crate::models::{messages, parse_id, ValidationError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReviewResponse {
    pub review_id: i32,
    pub is_deleted: bool,
}

/// DELETE /admin/review/{reviewId} - hard delete a review and its children
async fn delete_review(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(raw_review_id): Path<String>,
) -> Result<Success<DeleteReviewResponse>, ApiError> {
    let review_id = parse_id("reviewId", &raw_review_id)?;

    let mut conn = state.pool.acquire().await?;

    if UserRepo::new(&mut conn).get_by_id(user.id).await?.is_none() {
        return Err(ApiError::Unauthorized(messages::NO_USER));
    }

    let mut reviews = ReviewRepo::new(&mut conn);
    if reviews.get_by_id(review_id).await?.is_none() {
        return Err(ApiError::BadRequest(messages::OUT_OF_VALUE));
    }

    let is_deleted = reviews.delete_by_id(review_id).await?;
    tracing::info!(review_id, user_id = user.id, is_deleted, "review deleted");

    Ok(Success::ok(
        messages::DELETE_REVIEW_SUCCESS,
        DeleteReviewResponse {
            review_id,
            is_deleted,
        },
    ))
}

/// DELETE /admin/review - no review id given
async fn delete_review_without_id(_user: AuthUser) -> ApiError {
    ApiError::Validation(ValidationError::Missing { field: "reviewId" })
}

/// Admin routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/review", delete(delete_review_without_id))
        .route("/admin/review/{review_id}", delete(delete_review))
}
