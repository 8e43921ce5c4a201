use actix_session::Session;
use actix_web::HttpResponse;
use sqlx::SqlitePool;

use crate::auth::csrf;
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::models::submission;
use crate::templates_structs::{PageContext, SubmissionDetailTemplate};
use super::{AdminQuery, LIST_PATH};

pub async fn view(
    pool: &SqlitePool,
    session: &Session,
    config: &AppConfig,
    query: &AdminQuery,
) -> Result<HttpResponse, AppError> {
    let id = query.id().ok_or(AppError::NotFound)?;
    let found = submission::get(pool, id).await?.ok_or(AppError::NotFound)?;

    let ctx = PageContext::build(session, config, LIST_PATH)?;
    let delete_token = csrf::token_for(
        session,
        &csrf::delete_submission_action(found.id),
        config.nonce_lifetime_secs,
    );

    render(SubmissionDetailTemplate {
        ctx,
        created: found.created_display(),
        submission: found,
        delete_token,
    })
}
