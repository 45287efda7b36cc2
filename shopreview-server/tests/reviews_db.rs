//! Repository tests against a real Postgres.
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p shopreview-server -- --ignored
//!
//! Every test seeds its own user/shop/review rows, so they can share one
//! database and run in any order.

use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Duration, Utc};
use shopreview_server::db::{create_pool, migrations, ReviewRepo, ShopRepo, UserRepo};
use shopreview_server::models::{
    merge_duplicates, Pagination, Reaction, ReviewOrder, ShopFilter,
};
use sqlx::PgPool;
use tokio::sync::OnceCell;

// Concurrent CREATE TABLE IF NOT EXISTS can race in Postgres; migrate once.
static MIGRATED: OnceCell<()> = OnceCell::const_new();

const ALL_ORDERS: [ReviewOrder; 3] = [ReviewOrder::Like, ReviewOrder::Scrap, ReviewOrder::Recent];

async fn setup() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let pool = create_pool(&url).await.expect("pool creation failed");
    MIGRATED
        .get_or_init(|| async {
            migrations::run(&pool).await.expect("migrations failed");
        })
        .await;
    pool
}

/// Name no earlier run or parallel test has used.
fn unique(tag: &str) -> String {
    static SEQ: AtomicU32 = AtomicU32::new(0);
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{tag}-{nanos}-{}", SEQ.fetch_add(1, Ordering::Relaxed))
}

async fn seed_user(pool: &PgPool, nickname: &str) -> i32 {
    sqlx::query_scalar(r#"INSERT INTO "user" (nickname) VALUES ($1) RETURNING id"#)
        .bind(nickname)
        .fetch_one(pool)
        .await
        .expect("seed user")
}

async fn seed_shop(pool: &PgPool) -> i32 {
    seed_shop_in(pool, &unique("area"), None).await
}

async fn seed_shop_in(pool: &PgPool, area: &str, theme: Option<&str>) -> i32 {
    sqlx::query_scalar("INSERT INTO shop (shop_name, area, theme) VALUES ('Ondo', $1, $2) RETURNING id")
        .bind(area)
        .bind(theme)
        .fetch_one(pool)
        .await
        .expect("seed shop")
}

/// Create a category and attach it to `shop_id`; returns the category name.
async fn seed_category(pool: &PgPool, shop_id: i32) -> String {
    let name = unique("category");
    let category_id: i32 = sqlx::query_scalar("INSERT INTO category (name) VALUES ($1) RETURNING id")
        .bind(&name)
        .fetch_one(pool)
        .await
        .expect("seed category");

    sqlx::query("INSERT INTO shop_category (shop_id, category_id) VALUES ($1, $2)")
        .bind(shop_id)
        .bind(category_id)
        .execute(pool)
        .await
        .expect("link category");

    name
}

#[derive(Debug, Clone, Copy)]
struct ReviewSeed {
    likes: i32,
    scraps: i32,
    created_at: Option<DateTime<Utc>>,
    previews: usize,
}

impl Default for ReviewSeed {
    fn default() -> Self {
        Self {
            likes: 0,
            scraps: 0,
            created_at: None,
            previews: 1,
        }
    }
}

/// Review with likes preset, plus a live preview image when `preview`.
async fn seed_review(pool: &PgPool, shop_id: i32, user_id: i32, likes: i32, preview: bool) -> i32 {
    let seed = ReviewSeed {
        likes,
        previews: usize::from(preview),
        ..ReviewSeed::default()
    };
    seed_review_with(pool, shop_id, user_id, seed).await
}

/// Previews are named `p0.jpg`, `p1.jpg`, ... in insertion order.
async fn seed_review_with(pool: &PgPool, shop_id: i32, user_id: i32, seed: ReviewSeed) -> i32 {
    let review_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO review (shop_id, user_id, content, like_count, scrap_count, created_at)
        VALUES ($1, $2, 'nice', $3, $4, COALESCE($5::timestamptz, NOW()))
        RETURNING id
        "#,
    )
    .bind(shop_id)
    .bind(user_id)
    .bind(seed.likes)
    .bind(seed.scraps)
    .bind(seed.created_at)
    .fetch_one(pool)
    .await
    .expect("seed review");

    for n in 0..seed.previews {
        sqlx::query("INSERT INTO review_image (review_id, image, is_preview) VALUES ($1, $2, TRUE)")
            .bind(review_id)
            .bind(format!("p{n}.jpg"))
            .execute(pool)
            .await
            .expect("seed image");
    }

    review_id
}

async fn listed_ids(pool: &PgPool, shop_id: i32, order: ReviewOrder) -> Vec<i32> {
    let mut conn = pool.acquire().await.unwrap();
    ReviewRepo::new(&mut conn)
        .list_by_shop(shop_id, order, Pagination::new(1, 100))
        .await
        .unwrap()
        .into_iter()
        .map(|card| card.review_id)
        .collect()
}

#[tokio::test]
#[ignore = "requires database"]
async fn toggle_keeps_one_row_per_user_and_review() {
    let pool = setup().await;
    let user = seed_user(&pool, "toggler").await;
    let shop = seed_shop(&pool).await;
    let review = seed_review(&pool, shop, user, 0, true).await;

    let mut conn = pool.acquire().await.unwrap();
    let mut repo = ReviewRepo::new(&mut conn);

    assert_eq!(repo.current_status(Reaction::Like, review, user).await.unwrap(), None);

    let on = repo.toggle(Reaction::Like, user, review, true).await.unwrap();
    assert!(on.is_active());
    let again = repo.toggle(Reaction::Like, user, review, true).await.unwrap();
    assert!(again.is_active());
    assert_eq!(repo.active_count(Reaction::Like, review).await.unwrap(), 1);

    let off = repo.toggle(Reaction::Like, user, review, false).await.unwrap();
    assert!(!off.is_active());
    assert_eq!(repo.active_count(Reaction::Like, review).await.unwrap(), 0);

    let back = repo.toggle(Reaction::Like, user, review, true).await.unwrap();
    assert!(back.is_active());

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM review_like WHERE review_id = $1")
        .bind(review)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn refresh_count_matches_active_rows() {
    let pool = setup().await;
    let writer = seed_user(&pool, "writer").await;
    let fan = seed_user(&pool, "fan").await;
    let shop = seed_shop(&pool).await;
    let review = seed_review(&pool, shop, writer, 0, true).await;

    let mut conn = pool.acquire().await.unwrap();
    let mut repo = ReviewRepo::new(&mut conn);

    repo.toggle(Reaction::Scrap, writer, review, true).await.unwrap();
    repo.toggle(Reaction::Scrap, fan, review, true).await.unwrap();
    repo.toggle(Reaction::Scrap, fan, review, false).await.unwrap();

    assert_eq!(repo.refresh_count(Reaction::Scrap, review).await.unwrap(), Some(1));
    assert_eq!(repo.count(Reaction::Scrap, review).await.unwrap(), Some(1));

    // Overwrite is unchecked
    assert_eq!(repo.update_count(Reaction::Scrap, review, 40).await.unwrap(), Some(40));
    assert_eq!(repo.update_count(Reaction::Scrap, i32::MAX, 1).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires database"]
async fn shop_listing_pages_partition_and_skip_reviews_without_preview() {
    let pool = setup().await;
    let user = seed_user(&pool, "lister").await;
    let shop = seed_shop(&pool).await;

    let mut expected = Vec::new();
    for likes in [5, 3, 9, 1, 7] {
        expected.push((likes, seed_review(&pool, shop, user, likes, true).await));
    }
    seed_review(&pool, shop, user, 100, false).await;
    expected.sort_by(|a, b| b.0.cmp(&a.0));

    let mut conn = pool.acquire().await.unwrap();
    let mut repo = ReviewRepo::new(&mut conn);

    let mut seen = Vec::new();
    for page in 1..=3 {
        let cards = repo
            .list_by_shop(shop, ReviewOrder::Like, Pagination::new(page, 2))
            .await
            .unwrap();
        assert!(cards.len() <= 2);
        seen.extend(cards.into_iter().map(|card| card.review_id));
    }

    let expected_ids: Vec<i32> = expected.into_iter().map(|(_, id)| id).collect();
    assert_eq!(seen, expected_ids);
}

#[tokio::test]
#[ignore = "requires database"]
async fn delete_removes_review_and_children() {
    let pool = setup().await;
    let user = seed_user(&pool, "deleter").await;
    let shop = seed_shop(&pool).await;
    let review = seed_review(&pool, shop, user, 0, true).await;

    let mut conn = pool.acquire().await.unwrap();
    let mut repo = ReviewRepo::new(&mut conn);
    repo.toggle(Reaction::Like, user, review, true).await.unwrap();

    assert!(repo.delete_by_id(review).await.unwrap());
    assert!(repo.get_by_id(review).await.unwrap().is_none());
    assert!(repo.images(review).await.unwrap().is_empty());
    assert_eq!(repo.active_count(Reaction::Like, review).await.unwrap(), 0);

    assert!(!repo.delete_by_id(review).await.unwrap());
}

#[tokio::test]
#[ignore = "requires database"]
async fn deleted_users_are_not_found() {
    let pool = setup().await;
    let user = seed_user(&pool, "leaver").await;

    let mut conn = pool.acquire().await.unwrap();
    assert!(UserRepo::new(&mut conn).get_by_id(user).await.unwrap().is_some());

    sqlx::query(r#"UPDATE "user" SET is_deleted = TRUE WHERE id = $1"#)
        .bind(user)
        .execute(&mut *conn)
        .await
        .unwrap();

    assert!(UserRepo::new(&mut conn).get_by_id(user).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires database"]
async fn review_with_two_previews_is_listed_once() {
    let pool = setup().await;
    let user = seed_user(&pool, "photographer").await;
    let shop = seed_shop(&pool).await;
    let doubled = seed_review_with(
        &pool,
        shop,
        user,
        ReviewSeed {
            previews: 2,
            ..ReviewSeed::default()
        },
    )
    .await;
    let single = seed_review(&pool, shop, user, 0, true).await;

    for order in ALL_ORDERS {
        let mut ids = listed_ids(&pool, shop, order).await;
        ids.sort_unstable();
        assert_eq!(ids, vec![doubled, single], "order {order:?}");
    }

    let mut conn = pool.acquire().await.unwrap();
    let cards = ReviewRepo::new(&mut conn)
        .list_by_shop(shop, ReviewOrder::Like, Pagination::new(1, 1))
        .await
        .unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].review_id, doubled);
    assert_eq!(cards[0].image, "p0.jpg");
}

#[tokio::test]
#[ignore = "requires database"]
async fn scrap_order_sorts_by_scraps_then_likes() {
    let pool = setup().await;
    let user = seed_user(&pool, "scrapper").await;
    let shop = seed_shop(&pool).await;

    let mut seeded = Vec::new();
    for (likes, scraps) in [(9, 1), (0, 5), (3, 5), (1, 2)] {
        let seed = ReviewSeed {
            likes,
            scraps,
            ..ReviewSeed::default()
        };
        seeded.push(seed_review_with(&pool, shop, user, seed).await);
    }

    assert_eq!(
        listed_ids(&pool, shop, ReviewOrder::Scrap).await,
        vec![seeded[2], seeded[1], seeded[3], seeded[0]]
    );
}

#[tokio::test]
#[ignore = "requires database"]
async fn recent_order_lists_oldest_first() {
    let pool = setup().await;
    let user = seed_user(&pool, "historian").await;
    let shop = seed_shop(&pool).await;
    let base = Utc::now() - Duration::days(1);

    let mut seeded = Vec::new();
    for (minutes, scraps) in [(30, 0), (10, 0), (20, 1), (20, 4)] {
        let seed = ReviewSeed {
            scraps,
            created_at: Some(base + Duration::minutes(minutes)),
            ..ReviewSeed::default()
        };
        seeded.push(seed_review_with(&pool, shop, user, seed).await);
    }

    // Same timestamp: more scraps first
    assert_eq!(
        listed_ids(&pool, shop, ReviewOrder::Recent).await,
        vec![seeded[1], seeded[3], seeded[2], seeded[0]]
    );
}

#[tokio::test]
#[ignore = "requires database"]
async fn hidden_reviews_are_absent_from_every_order() {
    let pool = setup().await;
    let user = seed_user(&pool, "curator").await;
    let shop = seed_shop(&pool).await;

    let visible = seed_review(&pool, shop, user, 1, true).await;
    seed_review(&pool, shop, user, 50, false).await;
    let deleted = seed_review(&pool, shop, user, 80, true).await;
    sqlx::query("UPDATE review SET is_deleted = TRUE WHERE id = $1")
        .bind(deleted)
        .execute(&pool)
        .await
        .unwrap();
    let retracted_preview = seed_review(&pool, shop, user, 90, true).await;
    sqlx::query("UPDATE review_image SET is_deleted = TRUE WHERE review_id = $1")
        .bind(retracted_preview)
        .execute(&pool)
        .await
        .unwrap();

    for order in ALL_ORDERS {
        assert_eq!(listed_ids(&pool, shop, order).await, vec![visible], "order {order:?}");
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn recent_feed_limits_reviews_not_category_rows() {
    let pool = setup().await;
    let user = seed_user(&pool, "trendsetter").await;
    let shop = seed_shop(&pool).await;

    let mut categories = Vec::new();
    for _ in 0..4 {
        categories.push(seed_category(&pool, shop).await);
    }

    // Far in the future so nothing else in the database is newer; microsecond
    // steps keep every run newer than the last.
    let base = Utc::now() + Duration::days(365 * 500);
    let mut seeded = Vec::new();
    for n in 0..16 {
        let seed = ReviewSeed {
            created_at: Some(base + Duration::microseconds(n)),
            previews: if n == 15 { 2 } else { 1 },
            ..ReviewSeed::default()
        };
        seeded.push(seed_review_with(&pool, shop, user, seed).await);
    }

    let mut conn = pool.acquire().await.unwrap();
    let rows = ReviewRepo::new(&mut conn).recent_feed().await.unwrap();
    assert_eq!(rows.len(), 15 * categories.len());

    let feed = merge_duplicates(rows);
    let ids: Vec<i32> = feed.iter().map(|review| review.row.review_id).collect();
    let newest: Vec<i32> = seeded.iter().rev().take(15).copied().collect();
    assert_eq!(ids, newest);

    for review in &feed {
        assert_eq!(review.values, categories);
        assert_eq!(review.row.shop_name, "Ondo");
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn shop_list_filters_by_area_theme_or_both() {
    let pool = setup().await;
    let area = unique("area");
    let theme = unique("theme");

    let both = seed_shop_in(&pool, &area, Some(&theme)).await;
    let cafe = seed_category(&pool, both).await;
    let bakery = seed_category(&pool, both).await;
    let area_only = seed_shop_in(&pool, &area, Some("other")).await;
    let theme_only = seed_shop_in(&pool, &unique("area"), Some(&theme)).await;
    let closed = seed_shop_in(&pool, &area, Some(&theme)).await;
    sqlx::query("UPDATE shop SET is_deleted = TRUE WHERE id = $1")
        .bind(closed)
        .execute(&pool)
        .await
        .unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let mut repo = ShopRepo::new(&mut conn);

    let by_area = ShopFilter::new(Some(area.clone()), None).unwrap();
    let shops = merge_duplicates(repo.list(&by_area).await.unwrap());
    let ids: Vec<i32> = shops.iter().map(|shop| shop.row.shop_id).collect();
    assert_eq!(ids, vec![both, area_only]);
    assert_eq!(shops[0].values, vec![cafe.clone(), bakery.clone()]);
    assert!(shops[1].values.is_empty());

    let by_theme = ShopFilter::new(None, Some(theme.clone())).unwrap();
    let ids: Vec<i32> = merge_duplicates(repo.list(&by_theme).await.unwrap())
        .iter()
        .map(|shop| shop.row.shop_id)
        .collect();
    assert_eq!(ids, vec![both, theme_only]);

    let by_both = ShopFilter::new(Some(area), Some(theme)).unwrap();
    let ids: Vec<i32> = merge_duplicates(repo.list(&by_both).await.unwrap())
        .iter()
        .map(|shop| shop.row.shop_id)
        .collect();
    assert_eq!(ids, vec![both]);
}
