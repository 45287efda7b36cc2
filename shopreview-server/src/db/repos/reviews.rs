//! Review repository
//!
//! Reads and writes over `review` and its children:
//! - like/scrap toggles as a single upsert keyed on `(user_id, review_id)`
//! - denormalized counters overwritten explicitly (`update_count`) or
//!   recomputed from active rows (`refresh_count`)
//! - per-shop listings joined to the preview image and the writer

use chrono::{DateTime, Utc};
use sqlx::{Connection, FromRow, PgConnection};

use super::DbError;
use crate::models::{Mergeable, Pagination, Reaction, ReviewOrder};

/// Reviews in the global recent feed.
pub const RECENT_FEED_LIMIT: i64 = 15;

/// One live preview per review of alias `r`, exposed as `p.image`.
///
/// Nothing stops a review from carrying several live previews; the lowest id
/// wins so the review still yields a single row. No preview, no row.
const PREVIEW_JOIN: &str = r#"
            CROSS JOIN LATERAL (
                SELECT ri.image
                FROM review_image ri
                WHERE ri.review_id = r.id
                  AND ri.is_preview = TRUE
                  AND ri.is_deleted = FALSE
                ORDER BY ri.id
                LIMIT 1
            ) p"#;

/// Child tables removed along with a review on hard delete.
const REVIEW_CHILD_TABLES: [&str; 5] = [
    "review_like",
    "review_scrap",
    "review_image",
    "review_item",
    "review_tag",
];

/// Review record from database
#[derive(Debug, Clone, FromRow)]
pub struct ReviewRecord {
    pub id: i32,
    pub shop_id: i32,
    pub user_id: i32,
    pub content: String,
    pub like_count: i32,
    pub scrap_count: i32,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Per-user like/scrap state. A missing row means the user never reacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct ReactionStatus {
    pub is_deleted: bool,
}

impl ReactionStatus {
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

/// Review as shown in a shop's review list
#[derive(Debug, Clone, FromRow)]
pub struct ReviewCard {
    pub review_id: i32,
    pub shop_id: i32,
    pub image: String,
    pub writer_thumbnail: Option<String>,
    pub writer_name: String,
    pub like_count: i32,
    pub scrap_count: i32,
    pub content: String,
}

/// One row of the recent feed; a review repeats once per shop category.
///
/// `category` is `None` when the shop has no category.
#[derive(Debug, Clone, FromRow)]
pub struct FeedRow {
    pub review_id: i32,
    pub shop_id: i32,
    pub shop_name: String,
    pub image: String,
    pub writer_thumbnail: Option<String>,
    pub writer_name: String,
    pub content: String,
    pub like_count: i32,
    pub scrap_count: i32,
    pub created_at: DateTime<Utc>,
    pub category: Option<String>,
}

impl Mergeable for FeedRow {
    type Key = i32;
    type Value = String;

    fn key(&self) -> i32 {
        self.review_id
    }

    fn take_value(&mut self) -> Option<String> {
        self.category.take()
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ReviewImage {
    pub id: i32,
    pub image: String,
    pub is_preview: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct ReviewItem {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ReviewTag {
    pub tag_id: i32,
    pub name: String,
}

/// Review repository
pub struct ReviewRepo<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ReviewRepo<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Get a review by id, including soft-deleted ones.
    pub async fn get_by_id(&mut self, id: i32) -> Result<Option<ReviewRecord>, DbError> {
        let review = sqlx::query_as::<_, ReviewRecord>(
            r#"
            SELECT id, shop_id, user_id, content, like_count, scrap_count, is_deleted, created_at
            FROM review
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(review)
    }

    /// Like [`get_by_id`](Self::get_by_id) but takes a row lock.
    ///
    /// Only meaningful inside a transaction; serializes concurrent toggles and
    /// counter refreshes on the same review.
    pub async fn lock_by_id(&mut self, id: i32) -> Result<Option<ReviewRecord>, DbError> {
        let review = sqlx::query_as::<_, ReviewRecord>(
            r#"
            SELECT id, shop_id, user_id, content, like_count, scrap_count, is_deleted, created_at
            FROM review
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(review)
    }

    /// Read the cached like or scrap counter.
    pub async fn count(&mut self, reaction: Reaction, review_id: i32) -> Result<Option<i32>, DbError> {
        let sql = format!(
            "SELECT {column} FROM review WHERE id = $1",
            column = reaction.count_column()
        );

        let count = sqlx::query_scalar::<_, i32>(&sql)
            .bind(review_id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(count)
    }

    /// Current like/scrap state of a user on a review.
    ///
    /// `None` when the user never reacted; otherwise `is_deleted` tells
    /// active from retracted.
    pub async fn current_status(
        &mut self,
        reaction: Reaction,
        review_id: i32,
        user_id: i32,
    ) -> Result<Option<ReactionStatus>, DbError> {
        let sql = format!(
            "SELECT is_deleted FROM {table} WHERE review_id = $1 AND user_id = $2",
            table = reaction.table()
        );

        let status = sqlx::query_as::<_, ReactionStatus>(&sql)
            .bind(review_id)
            .bind(user_id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(status)
    }

    /// Set a user's like/scrap on a review.
    ///
    /// Inserts the row on first use, otherwise overwrites `is_deleted`.
    /// Idempotent, and never creates a second row for the same pair.
    pub async fn toggle(
        &mut self,
        reaction: Reaction,
        user_id: i32,
        review_id: i32,
        active: bool,
    ) -> Result<ReactionStatus, DbError> {
        let sql = format!(
            r#"
            INSERT INTO {table} (user_id, review_id, is_deleted)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, review_id)
            DO UPDATE SET is_deleted = EXCLUDED.is_deleted
            RETURNING is_deleted
            "#,
            table = reaction.table()
        );

        let status = sqlx::query_as::<_, ReactionStatus>(&sql)
            .bind(user_id)
            .bind(review_id)
            .bind(!active)
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(status)
    }

    /// Overwrite the cached counter. Does not check it against the rows.
    pub async fn update_count(
        &mut self,
        reaction: Reaction,
        review_id: i32,
        count: i32,
    ) -> Result<Option<i32>, DbError> {
        let sql = format!(
            "UPDATE review SET {column} = $1 WHERE id = $2 RETURNING {column}",
            column = reaction.count_column()
        );

        let count = sqlx::query_scalar::<_, i32>(&sql)
            .bind(count)
            .bind(review_id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(count)
    }

    /// Number of active (not retracted) like/scrap rows.
    pub async fn active_count(&mut self, reaction: Reaction, review_id: i32) -> Result<i64, DbError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {table} WHERE review_id = $1 AND is_deleted = FALSE",
            table = reaction.table()
        );

        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(review_id)
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(count)
    }

    /// Recompute the cached counter from active rows and store it.
    ///
    /// Run in the same transaction as the toggle it follows.
    pub async fn refresh_count(
        &mut self,
        reaction: Reaction,
        review_id: i32,
    ) -> Result<Option<i32>, DbError> {
        let active = self.active_count(reaction, review_id).await?;
        let count = i32::try_from(active).unwrap_or(i32::MAX);
        self.update_count(reaction, review_id, count).await
    }

    /// Paginated reviews of a shop.
    ///
    /// Only non-deleted reviews with a live preview image are listed; a review
    /// without one is left out. A review with several live previews still
    /// yields one card, showing the lowest-id preview.
    pub async fn list_by_shop(
        &mut self,
        shop_id: i32,
        order: ReviewOrder,
        page: Pagination,
    ) -> Result<Vec<ReviewCard>, DbError> {
        let sql = format!(
            r#"
            SELECT
                r.id AS review_id,
                r.shop_id,
                p.image,
                u.image AS writer_thumbnail,
                u.nickname AS writer_name,
                r.like_count,
                r.scrap_count,
                r.content
            FROM review r
            INNER JOIN "user" u ON u.id = r.user_id
            {preview}
            WHERE r.shop_id = $1
              AND r.is_deleted = FALSE
            ORDER BY {order}
            LIMIT $2 OFFSET $3
            "#,
            preview = PREVIEW_JOIN,
            order = order.order_by()
        );

        let reviews = sqlx::query_as::<_, ReviewCard>(&sql)
            .bind(shop_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(reviews)
    }

    /// Live images of a review.
    pub async fn images(&mut self, review_id: i32) -> Result<Vec<ReviewImage>, DbError> {
        let images = sqlx::query_as::<_, ReviewImage>(
            r#"
            SELECT id, image, is_preview
            FROM review_image
            WHERE review_id = $1
              AND is_deleted = FALSE
            ORDER BY id
            "#,
        )
        .bind(review_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(images)
    }

    /// Live items of a review.
    pub async fn items(&mut self, review_id: i32) -> Result<Vec<ReviewItem>, DbError> {
        let items = sqlx::query_as::<_, ReviewItem>(
            r#"
            SELECT id, name
            FROM review_item
            WHERE review_id = $1
              AND is_deleted = FALSE
            ORDER BY id
            "#,
        )
        .bind(review_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(items)
    }

    /// Live tags of a review with their names.
    pub async fn tags(&mut self, review_id: i32) -> Result<Vec<ReviewTag>, DbError> {
        let tags = sqlx::query_as::<_, ReviewTag>(
            r#"
            SELECT t.id AS tag_id, t.name
            FROM review_tag rt
            INNER JOIN tag t ON t.id = rt.tag_id
            WHERE rt.review_id = $1
              AND rt.is_deleted = FALSE
            ORDER BY t.id
            "#,
        )
        .bind(review_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(tags)
    }

    /// Most recent reviews across all shops.
    ///
    /// The limit counts reviews. Each review then repeats once per category
    /// of its shop (or once with `category = NULL` when the shop has none),
    /// so callers collapse rows by `review_id`.
    pub async fn recent_feed(&mut self) -> Result<Vec<FeedRow>, DbError> {
        let sql = format!(
            r#"
            WITH recent AS (
                SELECT
                    r.id AS review_id,
                    r.shop_id,
                    s.shop_name,
                    p.image,
                    u.image AS writer_thumbnail,
                    u.nickname AS writer_name,
                    r.content,
                    r.like_count,
                    r.scrap_count,
                    r.created_at
                FROM review r
                INNER JOIN "user" u ON u.id = r.user_id
                INNER JOIN shop s ON s.id = r.shop_id
                {preview}
                WHERE r.is_deleted = FALSE
                ORDER BY r.created_at DESC, r.id DESC
                LIMIT $1
            )
            SELECT
                recent.review_id,
                recent.shop_id,
                recent.shop_name,
                recent.image,
                recent.writer_thumbnail,
                recent.writer_name,
                recent.content,
                recent.like_count,
                recent.scrap_count,
                recent.created_at,
                c.name AS category
            FROM recent
            LEFT JOIN shop_category sc ON sc.shop_id = recent.shop_id
            LEFT JOIN category c ON c.id = sc.category_id
            ORDER BY recent.created_at DESC, recent.review_id DESC, c.id
            "#,
            preview = PREVIEW_JOIN
        );

        let rows = sqlx::query_as::<_, FeedRow>(&sql)
            .bind(RECENT_FEED_LIMIT)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(rows)
    }

    /// Hard-delete a review and every child row (atomic).
    ///
    /// Returns whether a review row was removed.
    pub async fn delete_by_id(&mut self, id: i32) -> Result<bool, DbError> {
        let mut tx = self.conn.begin().await?;

        for table in REVIEW_CHILD_TABLES {
            let sql = format!("DELETE FROM {table} WHERE review_id = $1");
            sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
        }

        let result = sqlx::query("DELETE FROM review WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
