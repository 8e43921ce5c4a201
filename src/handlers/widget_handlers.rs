use actix_session::Session;
use actix_web::{HttpResponse, web};
use askama::Template;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::csrf;
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::models::form;
use crate::templates_structs::{APP_NAME, PublicIndexTemplate, WidgetTemplate};

#[derive(Deserialize)]
pub struct EmbedQuery {
    form: Option<String>,
}

/// GET /embed?form=<title>
///
/// Form existence is authoritative here: unknown titles get a 404.
pub async fn embed(
    pool: web::Data<SqlitePool>,
    session: Session,
    config: web::Data<AppConfig>,
    query: web::Query<EmbedQuery>,
) -> Result<HttpResponse, AppError> {
    let title = query.form.as_deref().unwrap_or_default();
    let found = form::find_by_title(&pool, title).await?.ok_or(AppError::NotFound)?;

    let nonce = csrf::token_for(&session, csrf::SUBMIT_ACTION, config.nonce_lifetime_secs);
    render(WidgetTemplate::new(&found.title, &nonce))
}

/// GET /
pub async fn index(
    pool: web::Data<SqlitePool>,
    session: Session,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let forms = form::list_active(&pool).await?;
    let nonce = csrf::token_for(&session, csrf::SUBMIT_ACTION, config.nonce_lifetime_secs);

    let widgets = forms
        .iter()
        .map(|f| WidgetTemplate::new(&f.title, &nonce).render())
        .collect::<Result<Vec<_>, _>>()?;

    render(PublicIndexTemplate { app_name: APP_NAME.to_string(), widgets })
}
