use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::middleware::safe_next;
use crate::auth::{csrf, password, rate_limit::RateLimiter};
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::models::admin_user;
use crate::templates_structs::{APP_NAME, LoginTemplate};

#[derive(Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub csrf_token: String,
    #[serde(default)]
    pub next: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

fn login_form(
    session: &Session,
    config: &AppConfig,
    error: Option<&str>,
    next: &str,
) -> Result<HttpResponse, AppError> {
    let csrf_token = csrf::token_for(session, csrf::LOGIN_ACTION, config.nonce_lifetime_secs);
    render(LoginTemplate {
        error: error.map(String::from),
        app_name: APP_NAME.to_string(),
        csrf_token,
        next: next.to_string(),
    })
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location.to_string()))
        .finish()
}

pub async fn login_page(
    session: Session,
    config: web::Data<AppConfig>,
    query: web::Query<LoginQuery>,
) -> Result<HttpResponse, AppError> {
    let next = safe_next(query.next.as_deref());
    if session.get::<i64>("user_id").unwrap_or(None).is_some() {
        return Ok(redirect(next));
    }
    login_form(&session, &config, None, next)
}

pub async fn login_submit(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    session: Session,
    config: web::Data<AppConfig>,
    form: web::Form<LoginForm>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, csrf::LOGIN_ACTION, &form.csrf_token, config.nonce_lifetime_secs)?;

    let next = safe_next(Some(form.next.as_str()));

    // Rate-limit check before touching the database. Keyed on the socket
    // peer: forwarded headers are client-controlled.
    let ip = req
        .peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_default();
    if limiter.is_blocked(&ip) {
        log::warn!("Sign-in blocked for {ip}: too many failures");
        return login_form(
            &session,
            &config,
            Some("Too many failed sign-in attempts. Please try again later."),
            next,
        );
    }

    let found = admin_user::find_by_username(&pool, form.username.trim()).await?;
    let verified = match &found {
        Some(u) => password::verify_password(&form.password, &u.password_hash).map_err(AppError::Hash)?,
        None => false,
    };

    match found {
        Some(u) if verified => {
            limiter.clear(&ip);
            session.renew();
            session
                .insert("user_id", u.id)
                .and_then(|_| session.insert("username", &u.username))
                .and_then(|_| session.insert("permissions", &u.permissions))
                .map_err(|e| AppError::Session(e.to_string()))?;
            log::info!("Administrator '{}' signed in", u.username);
            Ok(redirect(next))
        }
        _ => {
            limiter.record_failure(&ip);
            log::warn!("Failed sign-in for '{}' from {ip}", form.username.trim());
            login_form(&session, &config, Some("Invalid username or password"), next)
        }
    }
}

pub async fn logout(
    session: Session,
    config: web::Data<AppConfig>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, csrf::LOGOUT_ACTION, &form.csrf_token, config.nonce_lifetime_secs)?;
    session.purge();
    Ok(redirect("/admin/login"))
}
