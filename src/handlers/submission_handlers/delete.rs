use actix_session::Session;
use actix_web::HttpResponse;
use sqlx::SqlitePool;

use crate::auth::csrf;
use crate::auth::session::get_username;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::submission;
use super::{AdminQuery, LIST_PATH};

/// The token must be the one issued for this exact id. Deleting an id that is
/// already gone still redirects with `deleted=1`.
pub async fn delete(
    pool: &SqlitePool,
    session: &Session,
    config: &AppConfig,
    query: &AdminQuery,
) -> Result<HttpResponse, AppError> {
    let id = query.id().ok_or(AppError::NotFound)?;
    let token = query.token.as_deref().unwrap_or_default();
    csrf::validate_csrf(
        session,
        &csrf::delete_submission_action(id),
        token,
        config.nonce_lifetime_secs,
    )?;

    let removed = submission::delete(pool, id).await?;
    let admin = get_username(session).unwrap_or_default();
    if removed {
        log::info!("Submission {id} deleted by '{admin}'");
    } else {
        log::info!("Submission {id} already absent (delete by '{admin}')");
    }

    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", format!("{LIST_PATH}?deleted=1")))
        .finish())
}
