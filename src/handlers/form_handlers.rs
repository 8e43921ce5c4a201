use actix_session::Session;
use actix_web::{HttpResponse, web};
use sqlx::SqlitePool;

use crate::auth::csrf;
use crate::auth::session::{FORMS_MANAGE, require_permission, set_flash};
use crate::auth::validate::{sanitize_text, validate_required};
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::handlers::auth_handlers::CsrfOnly;
use crate::models::form::{self, FormForm, TITLE_MAX_LEN};
use crate::models::submission;
use crate::templates_structs::{FormListTemplate, FormRow, PageContext};

const FORMS_PATH: &str = "/admin/forms";

async fn render_list(
    pool: &SqlitePool,
    session: &Session,
    config: &AppConfig,
    errors: Vec<String>,
    draft_title: String,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(session, config, FORMS_PATH)?;
    let counts = submission::counts_by_form(pool).await?;
    let forms = form::list_active(pool)
        .await?
        .iter()
        .map(|f| FormRow::new(f, counts.get(&f.title).copied().unwrap_or(0)))
        .collect();
    let csrf_token = csrf::token_for(session, csrf::FORMS_ACTION, config.nonce_lifetime_secs);

    render(FormListTemplate { ctx, forms, errors, csrf_token, draft_title })
}

fn back_to_list() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", FORMS_PATH))
        .finish()
}

/// GET /admin/forms
pub async fn list(
    pool: web::Data<SqlitePool>,
    session: Session,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, FORMS_MANAGE)?;
    render_list(&pool, &session, &config, vec![], String::new()).await
}

/// POST /admin/forms
pub async fn create(
    pool: web::Data<SqlitePool>,
    session: Session,
    config: web::Data<AppConfig>,
    form: web::Form<FormForm>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, FORMS_MANAGE)?;
    csrf::validate_csrf(&session, csrf::FORMS_ACTION, &form.csrf_token, config.nonce_lifetime_secs)?;

    let title = sanitize_text(&form.title);
    if let Some(err) = validate_required(&title, "Title", TITLE_MAX_LEN) {
        return render_list(&pool, &session, &config, vec![err], title).await;
    }

    match form::create(&pool, &title).await {
        Ok(id) => {
            log::info!("Form {id} '{title}' created");
            set_flash(&session, &format!("Form '{title}' created"));
            Ok(back_to_list())
        }
        Err(e) if form::is_duplicate(&e) => {
            let msg = format!("A form titled '{title}' already exists");
            render_list(&pool, &session, &config, vec![msg], title).await
        }
        Err(e) => Err(e),
    }
}

/// POST /admin/forms/{id}/delete
pub async fn delete(
    pool: web::Data<SqlitePool>,
    session: Session,
    config: web::Data<AppConfig>,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, FORMS_MANAGE)?;
    csrf::validate_csrf(&session, csrf::FORMS_ACTION, &form.csrf_token, config.nonce_lifetime_secs)?;

    let id = path.into_inner();
    if form::delete(&pool, id).await? {
        log::info!("Form {id} deleted");
        set_flash(&session, "Form deleted. Its submissions were kept.");
    } else {
        set_flash(&session, "Form was already deleted");
    }
    Ok(back_to_list())
}
