use sqlx::SqlitePool;

use crate::errors::AppError;
use crate::models::{format_timestamp, now_timestamp, parse_timestamp};
use super::types::Form;

#[derive(sqlx::FromRow)]
struct Row {
    id: i64,
    title: String,
    created_at: String,
}

impl TryFrom<Row> for Form {
    type Error = sqlx::Error;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(Form {
            id: row.id,
            title: row.title,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

/// Exact, case- and whitespace-sensitive title match.
pub async fn exists(pool: &SqlitePool, title: &str) -> Result<bool, AppError> {
    let found: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM forms WHERE title = ?")
        .bind(title)
        .fetch_one(pool)
        .await?;
    Ok(found > 0)
}

pub async fn find_by_title(pool: &SqlitePool, title: &str) -> Result<Option<Form>, AppError> {
    let row = sqlx::query_as::<_, Row>(
        "SELECT id, title, created_at FROM forms WHERE title = ? ORDER BY id LIMIT 1",
    )
    .bind(title)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Form::try_from).transpose()?)
}

/// Every registered form, newest first.
pub async fn list_active(pool: &SqlitePool) -> Result<Vec<Form>, AppError> {
    let rows = sqlx::query_as::<_, Row>(
        "SELECT id, title, created_at FROM forms ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Form::try_from).collect::<Result<Vec<_>, _>>()?)
}

/// Titles are unique; a duplicate surfaces as a database unique violation
/// (see `is_duplicate`).
pub async fn create(pool: &SqlitePool, title: &str) -> Result<i64, AppError> {
    let result = sqlx::query("INSERT INTO forms (title, created_at) VALUES (?, ?)")
        .bind(title)
        .bind(format_timestamp(&now_timestamp()))
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

/// Removes only the form; submissions tagged with its title stay.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM forms WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub fn is_duplicate(err: &AppError) -> bool {
    match err {
        AppError::Db(sqlx::Error::Database(db)) => db.is_unique_violation(),
        _ => false,
    }
}
