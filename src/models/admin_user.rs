use sqlx::SqlitePool;

use crate::errors::AppError;
use crate::models::{format_timestamp, now_timestamp};

/// Administrator account, including the password hash. Never rendered.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub permissions: String,
    pub created_at: String,
}

pub struct NewAdminUser {
    pub username: String,
    pub password_hash: String,
    /// Comma-separated capability codes.
    pub permissions: String,
}

pub async fn count(pool: &SqlitePool) -> Result<i64, AppError> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_users")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

pub async fn create(pool: &SqlitePool, new: &NewAdminUser) -> Result<i64, AppError> {
    let result = sqlx::query(
        "INSERT INTO admin_users (username, password_hash, permissions, created_at) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(&new.username)
    .bind(&new.password_hash)
    .bind(&new.permissions)
    .bind(format_timestamp(&now_timestamp()))
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<AdminUser>, AppError> {
    let user = sqlx::query_as::<_, AdminUser>(
        "SELECT id, username, password_hash, permissions, created_at \
         FROM admin_users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}
