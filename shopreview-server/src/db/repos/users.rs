//! User repository

use sqlx::{FromRow, PgConnection};

use super::DbError;

/// User profile record
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub nickname: String,
    pub image: Option<String>,
}

/// User repository
pub struct UserRepo<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> UserRepo<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Get a live (not soft-deleted) user.
    pub async fn get_by_id(&mut self, id: i32) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, nickname, image
            FROM "user"
            WHERE id = $1
              AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(user)
    }
}
