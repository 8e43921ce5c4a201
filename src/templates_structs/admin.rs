use askama::Template;

use crate::models::form::Form;
use crate::models::submission::Submission;
use super::PageContext;

/// Links shown inline per row before collapsing into "+N more".
pub const PREVIEW_LINKS: usize = 2;
pub const PREVIEW_CHARS: usize = 100;

/// Truncate to `max_chars` characters, appending "..." if truncated.
pub fn make_preview(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_string(),
    }
}

/// One table row of the submission list.
pub struct SubmissionRow {
    pub id: i64,
    pub name: String,
    pub form_title: String,
    pub description_preview: String,
    pub preview_links: Vec<String>,
    pub more_links: usize,
    pub created: String,
    pub delete_token: String,
}

impl SubmissionRow {
    pub fn new(submission: &Submission, delete_token: String) -> Self {
        let preview_links: Vec<String> = submission
            .links
            .iter()
            .take(PREVIEW_LINKS)
            .cloned()
            .collect();
        Self {
            id: submission.id,
            name: submission.name.clone(),
            form_title: submission.form_title.clone(),
            description_preview: make_preview(&submission.description, PREVIEW_CHARS),
            more_links: submission.links.len().saturating_sub(preview_links.len()),
            preview_links,
            created: submission.created_display(),
            delete_token,
        }
    }
}

#[derive(Template)]
#[template(path = "admin/submissions.html")]
pub struct SubmissionListTemplate {
    pub ctx: PageContext,
    pub rows: Vec<SubmissionRow>,
    pub page: i64,
    pub total_pages: i64,
    pub total_count: i64,
    pub deleted: bool,
}

#[derive(Template)]
#[template(path = "admin/submission_detail.html")]
pub struct SubmissionDetailTemplate {
    pub ctx: PageContext,
    pub submission: Submission,
    pub created: String,
    pub delete_token: String,
}

pub struct FormRow {
    pub id: i64,
    pub title: String,
    pub embed_path: String,
    pub submission_count: i64,
    pub created: String,
}

impl FormRow {
    pub fn new(form: &Form, submission_count: i64) -> Self {
        let encoded: String = url::form_urlencoded::byte_serialize(form.title.as_bytes()).collect();
        Self {
            id: form.id,
            title: form.title.clone(),
            embed_path: format!("/embed?form={encoded}"),
            submission_count,
            created: form.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "admin/forms.html")]
pub struct FormListTemplate {
    pub ctx: PageContext,
    pub forms: Vec<FormRow>,
    pub errors: Vec<String>,
    pub csrf_token: String,
    pub draft_title: String,
}
