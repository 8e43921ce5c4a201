use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};
use serde::Serialize;
use sqlx::SqlitePool;
use std::fmt;

use crate::auth::csrf;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::form;
use crate::models::submission::{self, IntakeForm, SubmissionId, ValidationError};
use super::request_meta::client_ip;

pub const SUCCESS_MESSAGE: &str = "Thank you, your info was submitted!";
pub const FAILURE_MESSAGE: &str = "Submission failed. Please try again.";
pub const SECURITY_MESSAGE: &str = "Security check failed. Please reload the page and try again.";

/// JSON envelope returned to the widget script.
#[derive(Debug, Serialize)]
pub struct IntakeResponse {
    pub success: bool,
    pub data: String,
}

#[derive(Debug)]
pub enum SubmitError {
    Security,
    Validation(ValidationError),
    Persistence(AppError),
}

impl SubmitError {
    fn status(&self) -> StatusCode {
        match self {
            SubmitError::Security => StatusCode::FORBIDDEN,
            SubmitError::Validation(_) => StatusCode::BAD_REQUEST,
            SubmitError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Visitor-facing text. Persistence details stay in the log.
    fn message(&self) -> String {
        match self {
            SubmitError::Security => SECURITY_MESSAGE.to_string(),
            SubmitError::Validation(e) => e.to_string(),
            SubmitError::Persistence(_) => FAILURE_MESSAGE.to_string(),
        }
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Security => write!(f, "CSRF check failed"),
            SubmitError::Validation(e) => write!(f, "Validation failed: {e}"),
            SubmitError::Persistence(e) => write!(f, "Persistence failed: {e}"),
        }
    }
}

/// Token check, validation, advisory form lookup, insert. Nothing is written
/// unless every earlier step passed.
pub async fn process(
    pool: &SqlitePool,
    session: &Session,
    config: &AppConfig,
    intake: &IntakeForm,
    submitter_ip: &str,
) -> Result<SubmissionId, SubmitError> {
    csrf::validate_csrf(session, csrf::SUBMIT_ACTION, &intake.nonce, config.nonce_lifetime_secs)
        .map_err(|_| SubmitError::Security)?;

    let validated = submission::validate(
        &intake.name,
        &intake.description,
        &intake.form_title,
        &intake.links,
    )
    .map_err(SubmitError::Validation)?;

    // Forms may be renamed or removed while a page is open; an unknown title
    // is still accepted.
    match form::exists(pool, &validated.form_title).await {
        Ok(true) => {}
        Ok(false) => log::warn!("Submission tagged with unknown form '{}'", validated.form_title),
        Err(e) => log::warn!("Form lookup failed, continuing: {e}"),
    }

    let id = submission::insert(pool, &validated, submitter_ip)
        .await
        .map_err(SubmitError::Persistence)?;

    log::info!(
        "Stored submission {id} for form '{}' ({} links)",
        validated.form_title,
        validated.links.len()
    );
    Ok(id)
}

/// POST /submit
pub async fn submit(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    session: Session,
    config: web::Data<AppConfig>,
    body: web::Form<Vec<(String, String)>>,
) -> HttpResponse {
    let intake = IntakeForm::from_pairs(body.into_inner());
    let ip = client_ip(&req);

    match process(&pool, &session, &config, &intake, &ip).await {
        Ok(_) => HttpResponse::Ok().json(IntakeResponse {
            success: true,
            data: SUCCESS_MESSAGE.to_string(),
        }),
        Err(e) => {
            match &e {
                SubmitError::Persistence(_) => log::error!("{e}"),
                _ => log::info!("Rejected submission: {e}"),
            }
            HttpResponse::build(e.status()).json(IntakeResponse {
                success: false,
                data: e.message(),
            })
        }
    }
}

/// Undecodable request bodies still answer with the JSON envelope.
pub fn form_error_handler(err: actix_web::error::UrlencodedError, _req: &HttpRequest) -> actix_web::Error {
    log::info!("Unreadable submission body: {err}");
    let response = HttpResponse::BadRequest().json(IntakeResponse {
        success: false,
        data: FAILURE_MESSAGE.to_string(),
    });
    actix_web::error::InternalError::from_response(err, response).into()
}
