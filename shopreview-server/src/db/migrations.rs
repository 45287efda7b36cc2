//! Schema migrations for shop and review tables
//!
//! Idempotent: every statement is `IF NOT EXISTS`. The composite primary keys
//! on `review_like` and `review_scrap` back the atomic toggle upsert.

use sqlx::PgPool;

const TABLES: &[(&str, &str)] = &[
    (
        "user",
        r#"
        CREATE TABLE IF NOT EXISTS "user" (
            id SERIAL PRIMARY KEY,
            nickname TEXT NOT NULL,
            image TEXT,
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "shop",
        r#"
        CREATE TABLE IF NOT EXISTS shop (
            id SERIAL PRIMARY KEY,
            shop_name TEXT NOT NULL,
            area TEXT NOT NULL,
            theme TEXT,
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "category",
        r#"
        CREATE TABLE IF NOT EXISTS category (
            id SERIAL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    ),
    (
        "shop_category",
        r#"
        CREATE TABLE IF NOT EXISTS shop_category (
            shop_id INTEGER NOT NULL REFERENCES shop(id) ON DELETE CASCADE,
            category_id INTEGER NOT NULL REFERENCES category(id) ON DELETE CASCADE,
            PRIMARY KEY (shop_id, category_id)
        )
        "#,
    ),
    (
        "shop_image",
        r#"
        CREATE TABLE IF NOT EXISTS shop_image (
            id SERIAL PRIMARY KEY,
            shop_id INTEGER NOT NULL REFERENCES shop(id) ON DELETE CASCADE,
            image TEXT NOT NULL,
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
    ),
    (
        "review",
        r#"
        CREATE TABLE IF NOT EXISTS review (
            id SERIAL PRIMARY KEY,
            shop_id INTEGER NOT NULL REFERENCES shop(id),
            user_id INTEGER NOT NULL REFERENCES "user"(id),
            content TEXT NOT NULL,
            like_count INTEGER NOT NULL DEFAULT 0,
            scrap_count INTEGER NOT NULL DEFAULT 0,
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "review_like",
        r#"
        CREATE TABLE IF NOT EXISTS review_like (
            user_id INTEGER NOT NULL REFERENCES "user"(id),
            review_id INTEGER NOT NULL REFERENCES review(id),
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (user_id, review_id)
        )
        "#,
    ),
    (
        "review_scrap",
        r#"
        CREATE TABLE IF NOT EXISTS review_scrap (
            user_id INTEGER NOT NULL REFERENCES "user"(id),
            review_id INTEGER NOT NULL REFERENCES review(id),
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (user_id, review_id)
        )
        "#,
    ),
    (
        "review_image",
        r#"
        CREATE TABLE IF NOT EXISTS review_image (
            id SERIAL PRIMARY KEY,
            review_id INTEGER NOT NULL REFERENCES review(id),
            image TEXT NOT NULL,
            is_preview BOOLEAN NOT NULL DEFAULT FALSE,
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
    ),
    (
        "review_item",
        r#"
        CREATE TABLE IF NOT EXISTS review_item (
            id SERIAL PRIMARY KEY,
            review_id INTEGER NOT NULL REFERENCES review(id),
            name TEXT NOT NULL,
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
    ),
    (
        "tag",
        r#"
        CREATE TABLE IF NOT EXISTS tag (
            id SERIAL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    ),
    (
        "review_tag",
        r#"
        CREATE TABLE IF NOT EXISTS review_tag (
            review_id INTEGER NOT NULL REFERENCES review(id),
            tag_id INTEGER NOT NULL REFERENCES tag(id),
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
            PRIMARY KEY (review_id, tag_id)
        )
        "#,
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_shop_area ON shop(area) WHERE is_deleted = FALSE",
    "CREATE INDEX IF NOT EXISTS idx_shop_theme ON shop(theme) WHERE is_deleted = FALSE",
    "CREATE INDEX IF NOT EXISTS idx_review_shop ON review(shop_id) WHERE is_deleted = FALSE",
    "CREATE INDEX IF NOT EXISTS idx_review_created ON review(created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_review_like_review ON review_like(review_id) WHERE is_deleted = FALSE",
    "CREATE INDEX IF NOT EXISTS idx_review_scrap_review ON review_scrap(review_id) WHERE is_deleted = FALSE",
    "CREATE INDEX IF NOT EXISTS idx_review_image_preview ON review_image(review_id, id) WHERE is_preview = TRUE AND is_deleted = FALSE",
];

/// Create all tables and indexes.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running schema migrations...");

    for (table, ddl) in TABLES {
        tracing::debug!(table = *table, "ensuring table");
        sqlx::query(ddl).execute(pool).await?;
    }

    for ddl in INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }

    tracing::info!("Schema migrations complete");
    Ok(())
}
