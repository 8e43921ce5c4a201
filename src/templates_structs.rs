// Template context structures for askama templates, split by audience.

use actix_session::Session;

use crate::auth::csrf;
use crate::auth::session::{Permissions, get_permissions, get_username, take_flash};
use crate::config::AppConfig;
use crate::errors::AppError;

pub const APP_NAME: &str = "Safe Joy";

/// Common context shared by all authenticated admin pages.
/// Templates access these as `ctx.username`, `ctx.flash`, etc.
pub struct PageContext {
    pub username: String,
    pub permissions: Permissions,
    pub flash: Option<String>,
    pub app_name: String,
    pub logout_token: String,
    pub current_path: String,
}

impl PageContext {
    pub fn build(session: &Session, config: &AppConfig, current_path: &str) -> Result<Self, AppError> {
        let username = get_username(session)
            .map_err(|e| AppError::Session(format!("Failed to get username: {}", e)))?;
        let permissions = get_permissions(session)
            .map_err(|e| AppError::Session(format!("Failed to get permissions: {}", e)))?;
        let flash = take_flash(session);
        let logout_token = csrf::token_for(session, csrf::LOGOUT_ACTION, config.nonce_lifetime_secs);
        Ok(Self {
            username,
            permissions,
            flash,
            app_name: APP_NAME.to_string(),
            logout_token,
            current_path: current_path.to_string(),
        })
    }
}

mod admin;
mod public;

pub use self::admin::{
    FormListTemplate, FormRow, SubmissionDetailTemplate, SubmissionListTemplate, SubmissionRow,
    make_preview,
};
pub use self::public::{LoginTemplate, PublicIndexTemplate, WidgetTemplate};
