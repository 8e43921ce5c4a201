use chrono::{DateTime, Utc};
use serde::Deserialize;

/// An administrator-defined entry point that submissions are tagged with.
#[derive(Debug, Clone)]
pub struct Form {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Admin "new form" submission.
#[derive(Debug, Deserialize)]
pub struct FormForm {
    pub title: String,
    pub csrf_token: String,
}

pub const TITLE_MAX_LEN: usize = 200;
