//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Borrows a single connection for its lifetime
//! - Propagates driver errors unchanged (no retries, no translation)
//! - Uses JOINs for list operations (no N+1)
//! - Handles toggles via ON CONFLICT (no check-then-insert)

pub mod reviews;
pub mod shops;
pub mod users;

pub use reviews::{
    FeedRow, ReactionStatus, ReviewCard, ReviewImage, ReviewItem, ReviewRecord, ReviewRepo,
    ReviewTag, RECENT_FEED_LIMIT,
};
pub use shops::{ShopRepo, ShopRow};
pub use users::{User, UserRepo};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}
