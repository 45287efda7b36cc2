//! Shop repository
//!
//! Shop listing joined to categories (one row per shop/category pair) and
//! the per-shop image lookup used to enrich the listing.

use sqlx::{FromRow, PgConnection};

use super::DbError;
use crate::models::{Mergeable, ShopFilter};

/// Shop joined to one of its categories
#[derive(Debug, Clone, FromRow)]
pub struct ShopRow {
    pub shop_id: i32,
    pub shop_name: String,
    pub area: String,
    pub theme: Option<String>,
    pub category: Option<String>,
}

impl Mergeable for ShopRow {
    type Key = i32;
    type Value = String;

    fn key(&self) -> i32 {
        self.shop_id
    }

    fn take_value(&mut self) -> Option<String> {
        self.category.take()
    }
}

/// Shop repository
pub struct ShopRepo<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ShopRepo<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Live shops matching the filter, one row per category.
    ///
    /// Shops without a category still appear once with `category = NULL`.
    pub async fn list(&mut self, filter: &ShopFilter) -> Result<Vec<ShopRow>, DbError> {
        let rows = sqlx::query_as::<_, ShopRow>(
            r#"
            SELECT
                s.id AS shop_id,
                s.shop_name,
                s.area,
                s.theme,
                c.name AS category
            FROM shop s
            LEFT JOIN shop_category sc ON sc.shop_id = s.id
            LEFT JOIN category c ON c.id = sc.category_id
            WHERE s.is_deleted = FALSE
              AND ($1::text IS NULL OR s.area = $1)
              AND ($2::text IS NULL OR s.theme = $2)
            ORDER BY s.id, c.id
            "#,
        )
        .bind(filter.area())
        .bind(filter.theme())
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows)
    }

    /// First live image of a shop, if any.
    pub async fn image(&mut self, shop_id: i32) -> Result<Option<String>, DbError> {
        let image = sqlx::query_scalar::<_, String>(
            r#"
            SELECT image
            FROM shop_image
            WHERE shop_id = $1
              AND is_deleted = FALSE
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(shop_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(image)
    }
}
