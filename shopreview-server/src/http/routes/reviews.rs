//! Review endpoints: shop listings, recent feed, detail, like and scrap

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::db::repos::{
    FeedRow, ReactionStatus, ReviewCard, ReviewImage, ReviewItem, ReviewRepo, ReviewTag, UserRepo,
};
use crate::http::auth::AuthUser;
use crate::http::error::ApiError;
use crate::http::extractors::{ValidJson, ValidQuery};
use crate::http::response::Success;
use crate::http::server::AppState;
use crate::models::{
    merge_duplicates, messages, parse_id, Merged, Pagination, PaginationParams, Reaction,
    ReviewOrder, ValidationError,
};

/// Sort query param for shop review listings
#[derive(Debug, Default, Deserialize)]
pub struct SortParams {
    pub sort: Option<String>,
}

/// Review card in a shop listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCardResponse {
    pub review_id: i32,
    pub shop_id: i32,
    pub image: String,
    pub writer_thumbnail: Option<String>,
    pub writer_name: String,
    pub like_count: i32,
    pub scrap_count: i32,
    pub content: String,
}

impl From<ReviewCard> for ReviewCardResponse {
    fn from(r: ReviewCard) -> Self {
        Self {
            review_id: r.review_id,
            shop_id: r.shop_id,
            image: r.image,
            writer_thumbnail: r.writer_thumbnail,
            writer_name: r.writer_name,
            like_count: r.like_count,
            scrap_count: r.scrap_count,
            content: r.content,
        }
    }
}

/// Recent feed entry; categories of the review's shop merged into a list
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItemResponse {
    pub review_id: i32,
    pub shop_id: i32,
    pub shop_name: String,
    pub image: String,
    pub writer_thumbnail: Option<String>,
    pub writer_name: String,
    pub content: String,
    pub like_count: i32,
    pub scrap_count: i32,
    pub created_at: String,
    pub category: Vec<String>,
}

impl From<Merged<FeedRow>> for FeedItemResponse {
    fn from(merged: Merged<FeedRow>) -> Self {
        let Merged { row, values } = merged;
        Self {
            review_id: row.review_id,
            shop_id: row.shop_id,
            shop_name: row.shop_name,
            image: row.image,
            writer_thumbnail: row.writer_thumbnail,
            writer_name: row.writer_name,
            content: row.content,
            like_count: row.like_count,
            scrap_count: row.scrap_count,
            created_at: row.created_at.to_rfc3339(),
            category: values,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub id: i32,
    pub image: String,
    pub is_preview: bool,
}

impl From<ReviewImage> for ImageResponse {
    fn from(i: ReviewImage) -> Self {
        Self {
            id: i.id,
            image: i.image,
            is_preview: i.is_preview,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: i32,
    pub name: String,
}

impl From<ReviewItem> for ItemResponse {
    fn from(i: ReviewItem) -> Self {
        Self {
            id: i.id,
            name: i.name,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub tag_id: i32,
    pub name: String,
}

impl From<ReviewTag> for TagResponse {
    fn from(t: ReviewTag) -> Self {
        Self {
            tag_id: t.tag_id,
            name: t.name,
        }
    }
}

/// Full review with children and the caller's reaction state
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetailResponse {
    pub review_id: i32,
    pub shop_id: i32,
    pub content: String,
    pub like_count: i32,
    pub scrap_count: i32,
    pub created_at: String,
    pub writer_name: Option<String>,
    pub writer_thumbnail: Option<String>,
    pub images: Vec<ImageResponse>,
    pub items: Vec<ItemResponse>,
    pub tags: Vec<TagResponse>,
    pub is_liked: bool,
    pub is_scraped: bool,
}

/// Like toggle request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub is_liked: Option<bool>,
}

/// Scrap toggle request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapRequest {
    pub is_scraped: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub review_id: i32,
    pub is_liked: bool,
    pub like_count: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapResponse {
    pub review_id: i32,
    pub is_scraped: bool,
    pub scrap_count: i32,
}

/// GET /shop/{shopId}/review?sort=like|scrap|recent&page=&perPage=
async fn list_shop_reviews(
    State(state): State<Arc<AppState>>,
    Path(raw_shop_id): Path<String>,
    ValidQuery(sort): ValidQuery<SortParams>,
    ValidQuery(params): ValidQuery<PaginationParams>,
) -> Result<Success<Vec<ReviewCardResponse>>, ApiError> {
    let shop_id = parse_id("shopId", &raw_shop_id)?;
    let order = ReviewOrder::from_param(sort.sort.as_deref())?;
    let page = Pagination::from(params);

    let mut conn = state.pool.acquire().await?;
    let reviews = ReviewRepo::new(&mut conn)
        .list_by_shop(shop_id, order, page)
        .await?;

    Ok(Success::ok(
        messages::GET_SHOP_REVIEWS_SUCCESS,
        reviews.into_iter().map(ReviewCardResponse::from).collect(),
    ))
}

/// GET /review/recent - latest reviews across all shops
async fn recent_reviews(
    State(state): State<Arc<AppState>>,
) -> Result<Success<Vec<FeedItemResponse>>, ApiError> {
    let mut conn = state.pool.acquire().await?;
    let rows = ReviewRepo::new(&mut conn).recent_feed().await?;

    Ok(Success::ok(
        messages::GET_RECENT_REVIEWS_SUCCESS,
        merge_duplicates(rows)
            .into_iter()
            .map(FeedItemResponse::from)
            .collect(),
    ))
}

/// GET /review/{reviewId} - review detail
async fn get_review(
    State(state): State<Arc<AppState>>,
    user: Option<AuthUser>,
    Path(raw_review_id): Path<String>,
) -> Result<Success<ReviewDetailResponse>, ApiError> {
    let review_id = parse_id("reviewId", &raw_review_id)?;

    let mut conn = state.pool.acquire().await?;
    let mut reviews = ReviewRepo::new(&mut conn);

    let review = reviews
        .get_by_id(review_id)
        .await?
        .filter(|review| !review.is_deleted)
        .ok_or(ApiError::NotFound(messages::NO_REVIEW))?;

    let images = reviews.images(review_id).await?;
    let items = reviews.items(review_id).await?;
    let tags = reviews.tags(review_id).await?;

    let (is_liked, is_scraped) = match user {
        Some(user) => (
            is_active(reviews.current_status(Reaction::Like, review_id, user.id).await?),
            is_active(reviews.current_status(Reaction::Scrap, review_id, user.id).await?),
        ),
        None => (false, false),
    };

    let writer = UserRepo::new(&mut conn).get_by_id(review.user_id).await?;

    Ok(Success::ok(
        messages::GET_REVIEW_SUCCESS,
        ReviewDetailResponse {
            review_id: review.id,
            shop_id: review.shop_id,
            content: review.content,
            like_count: review.like_count,
            scrap_count: review.scrap_count,
            created_at: review.created_at.to_rfc3339(),
            writer_name: writer.as_ref().map(|w| w.nickname.clone()),
            writer_thumbnail: writer.and_then(|w| w.image),
            images: images.into_iter().map(ImageResponse::from).collect(),
            items: items.into_iter().map(ItemResponse::from).collect(),
            tags: tags.into_iter().map(TagResponse::from).collect(),
            is_liked,
            is_scraped,
        },
    ))
}

/// POST /review/{reviewId}/like - body `{ "isLiked": bool }`
async fn like_review(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(raw_review_id): Path<String>,
    ValidJson(req): ValidJson<LikeRequest>,
) -> Result<Success<LikeResponse>, ApiError> {
    let review_id = parse_id("reviewId", &raw_review_id)?;
    let is_liked = req
        .is_liked
        .ok_or(ValidationError::Missing { field: "isLiked" })?;

    let (status, like_count) =
        apply_reaction(&state, Reaction::Like, user, review_id, is_liked).await?;

    Ok(Success::ok(
        messages::REVIEW_LIKE_SUCCESS,
        LikeResponse {
            review_id,
            is_liked: status.is_active(),
            like_count,
        },
    ))
}

/// POST /review/{reviewId}/scrap - body `{ "isScraped": bool }`
async fn scrap_review(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(raw_review_id): Path<String>,
    ValidJson(req): ValidJson<ScrapRequest>,
) -> Result<Success<ScrapResponse>, ApiError> {
    let review_id = parse_id("reviewId", &raw_review_id)?;
    let is_scraped = req
        .is_scraped
        .ok_or(ValidationError::Missing { field: "isScraped" })?;

    let (status, scrap_count) =
        apply_reaction(&state, Reaction::Scrap, user, review_id, is_scraped).await?;

    Ok(Success::ok(
        messages::REVIEW_SCRAP_SUCCESS,
        ScrapResponse {
            review_id,
            is_scraped: status.is_active(),
            scrap_count,
        },
    ))
}

/// Toggle a reaction and refresh the review's counter in one transaction.
///
/// The review row is locked first, so concurrent toggles on the same review
/// apply one after another and the counter always matches the active rows.
async fn apply_reaction(
    state: &AppState,
    reaction: Reaction,
    user: AuthUser,
    review_id: i32,
    active: bool,
) -> Result<(ReactionStatus, i32), ApiError> {
    let mut tx = state.pool.begin().await?;

    if UserRepo::new(&mut tx).get_by_id(user.id).await?.is_none() {
        return Err(ApiError::Unauthorized(messages::NO_USER));
    }

    let mut reviews = ReviewRepo::new(&mut tx);
    match reviews.lock_by_id(review_id).await? {
        Some(review) if !review.is_deleted => {}
        _ => return Err(ApiError::BadRequest(messages::OUT_OF_VALUE)),
    }

    let status = reviews.toggle(reaction, user.id, review_id, active).await?;
    let count = reviews
        .refresh_count(reaction, review_id)
        .await?
        .unwrap_or_default();

    tx.commit().await?;

    tracing::info!(
        reaction = reaction.as_str(),
        review_id,
        user_id = user.id,
        active = status.is_active(),
        count,
        "reaction updated"
    );

    Ok((status, count))
}

fn is_active(status: Option<ReactionStatus>) -> bool {
    status.is_some_and(|s| s.is_active())
}

/// Review routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/shop/{shop_id}/review", get(list_shop_reviews))
        .route("/review/recent", get(recent_reviews))
        .route("/review/{review_id}", get(get_review))
        .route("/review/{review_id}/like", post(like_review))
        .route("/review/{review_id}/scrap", post(scrap_review))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn never_reacted_is_inactive() {
        assert!(!is_active(None));
        assert!(!is_active(Some(ReactionStatus { is_deleted: true })));
        assert!(is_active(Some(ReactionStatus { is_deleted: false })));
    }

    #[test]
    fn feed_item_serializes_camel_case() {
        let row = FeedRow {
            review_id: 42,
            shop_id: 7,
            shop_name: "Ondo".into(),
            image: "preview.jpg".into(),
            writer_thumbnail: Some("me.png".into()),
            writer_name: "mina".into(),
            content: "lovely".into(),
            like_count: 3,
            scrap_count: 1,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
            category: None,
        };
        let item = FeedItemResponse::from(Merged {
            row,
            values: vec!["cafe".to_string()],
        });

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["reviewId"], 42);
        assert_eq!(json["writerThumbnail"], "me.png");
        assert_eq!(json["createdAt"], "2024-05-01T09:30:00+00:00");
        assert_eq!(json["category"][0], "cafe");
    }

    #[test]
    fn like_request_accepts_missing_flag() {
        let req: LikeRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_liked.is_none());

        let req: ScrapRequest = serde_json::from_str(r#"{"isScraped":true}"#).unwrap();
        assert_eq!(req.is_scraped, Some(true));
    }
}
