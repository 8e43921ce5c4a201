use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::errors::AppError;
use crate::models::{format_timestamp, now_timestamp, parse_timestamp};
use super::types::*;

#[derive(sqlx::FromRow)]
struct Row {
    id: i64,
    form_title: String,
    name: String,
    description: String,
    links: String,
    user_ip: String,
    submission_date: String,
}

impl TryFrom<Row> for Submission {
    type Error = sqlx::Error;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        let links: Vec<String> = serde_json::from_str(&row.links)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(Submission {
            id: row.id,
            form_title: row.form_title,
            name: row.name,
            description: row.description,
            links,
            submitter_ip: row.user_ip,
            created_at: parse_timestamp(&row.submission_date)?,
        })
    }
}

const SELECT_SUBMISSION: &str = "\
    SELECT id, form_title, name, description, links, user_ip, submission_date \
    FROM submissions";

/// Persist a validated submission stamped with the current time.
pub async fn insert(
    pool: &SqlitePool,
    submission: &ValidatedSubmission,
    submitter_ip: &str,
) -> Result<SubmissionId, AppError> {
    insert_at(pool, submission, submitter_ip, now_timestamp()).await
}

/// Single-statement insert, so a row is either fully written or absent.
pub async fn insert_at(
    pool: &SqlitePool,
    submission: &ValidatedSubmission,
    submitter_ip: &str,
    created_at: DateTime<Utc>,
) -> Result<SubmissionId, AppError> {
    let links = serde_json::to_string(&submission.links)
        .map_err(|e| AppError::Db(sqlx::Error::Encode(Box::new(e))))?;

    let result = sqlx::query(
        "INSERT INTO submissions (form_title, name, description, links, user_ip, submission_date) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&submission.form_title)
    .bind(&submission.name)
    .bind(&submission.description)
    .bind(links)
    .bind(submitter_ip)
    .bind(format_timestamp(&created_at))
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Newest first, ties broken by id. A page past the end is empty.
/// `page` and `per_page` below 1 are raised to 1.
pub async fn list(pool: &SqlitePool, page: i64, per_page: i64) -> Result<SubmissionPage, AppError> {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let offset = (page - 1).saturating_mul(per_page);

    let total_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM submissions")
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as::<_, Row>(&format!(
        "{SELECT_SUBMISSION} ORDER BY submission_date DESC, id DESC LIMIT ? OFFSET ?"
    ))
    .bind(per_page)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let submissions = rows
        .into_iter()
        .map(Submission::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let total_pages = (total_count + per_page - 1) / per_page;

    Ok(SubmissionPage { submissions, page, per_page, total_count, total_pages })
}

pub async fn get(pool: &SqlitePool, id: SubmissionId) -> Result<Option<Submission>, AppError> {
    let row = sqlx::query_as::<_, Row>(&format!("{SELECT_SUBMISSION} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match row {
        Some(row) => Ok(Some(Submission::try_from(row)?)),
        None => Ok(None),
    }
}

/// Returns whether a row was removed. Deleting a missing id is not an error.
pub async fn delete(pool: &SqlitePool, id: SubmissionId) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM submissions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Submission totals keyed by form title, for the forms dashboard.
pub async fn counts_by_form(pool: &SqlitePool) -> Result<HashMap<String, i64>, AppError> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT form_title, COUNT(*) FROM submissions GROUP BY form_title",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().collect())
}
