pub mod delete;
pub mod detail;
pub mod list;

use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::session::{SUBMISSIONS_MANAGE, require_permission};
use crate::config::AppConfig;
use crate::errors::AppError;

pub const LIST_PATH: &str = "/admin/submissions";

/// Query string of the admin submissions screen. `action` selects the
/// detail view or a delete; anything else lists.
#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
    pub page: Option<String>,
    pub action: Option<String>,
    pub id: Option<String>,
    pub token: Option<String>,
    pub deleted: Option<String>,
}

impl AdminQuery {
    /// Missing or unparsable pages become 1; anything below 1 is clamped.
    pub fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(1)
            .max(1)
    }

    pub fn id(&self) -> Option<i64> {
        self.id.as_deref().and_then(|id| id.trim().parse().ok())
    }
}

/// GET /admin/submissions
pub async fn index(
    pool: web::Data<SqlitePool>,
    session: Session,
    config: web::Data<AppConfig>,
    query: web::Query<AdminQuery>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, SUBMISSIONS_MANAGE)?;

    match query.action.as_deref() {
        Some("view") => detail::view(&pool, &session, &config, &query).await,
        Some("delete") => delete::delete(&pool, &session, &config, &query).await,
        _ => list::list(&pool, &session, &config, &query).await,
    }
}
