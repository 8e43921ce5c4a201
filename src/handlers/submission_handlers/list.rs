use actix_session::Session;
use actix_web::HttpResponse;
use sqlx::SqlitePool;

use crate::auth::csrf;
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::models::submission;
use crate::templates_structs::{PageContext, SubmissionListTemplate, SubmissionRow};
use super::{AdminQuery, LIST_PATH};

pub async fn list(
    pool: &SqlitePool,
    session: &Session,
    config: &AppConfig,
    query: &AdminQuery,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(session, config, LIST_PATH)?;
    let page = submission::list(pool, query.page(), config.submissions_per_page).await?;

    let rows = page
        .submissions
        .iter()
        .map(|s| {
            let token = csrf::token_for(
                session,
                &csrf::delete_submission_action(s.id),
                config.nonce_lifetime_secs,
            );
            SubmissionRow::new(s, token)
        })
        .collect();

    render(SubmissionListTemplate {
        ctx,
        rows,
        page: page.page,
        total_pages: page.total_pages,
        total_count: page.total_count,
        deleted: query.deleted.as_deref() == Some("1"),
    })
}
