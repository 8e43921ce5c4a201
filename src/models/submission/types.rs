use chrono::{DateTime, Utc};

pub type SubmissionId = i64;

/// A persisted visitor submission.
///
/// `form_title` is a copy of the form's title at submission time rather than a
/// reference, so submissions survive renames and deletions of their form.
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: SubmissionId,
    pub form_title: String,
    pub name: String,
    pub description: String,
    pub links: Vec<String>,
    pub submitter_ip: String,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    pub fn created_display(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}

/// Sanitized fields ready for insert. Only `validate` builds these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    pub form_title: String,
    pub name: String,
    pub description: String,
    pub links: Vec<String>,
}

/// Pagination metadata for the submission list.
#[derive(Debug)]
pub struct SubmissionPage {
    pub submissions: Vec<Submission>,
    pub page: i64,
    pub per_page: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

/// Raw intake fields as posted by the widget.
///
/// Built from the decoded pairs of the request body because `links[]` repeats.
#[derive(Debug, Clone, Default)]
pub struct IntakeForm {
    pub name: String,
    pub description: String,
    pub form_title: String,
    pub links: Vec<String>,
    pub nonce: String,
}

impl IntakeForm {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = IntakeForm::default();
        for (key, value) in pairs {
            match key.as_str() {
                "name" => form.name = value,
                "description" => form.description = value,
                "form_title" => form.form_title = value,
                "links[]" | "links" => form.links.push(value),
                "nonce" => form.nonce = value,
                _ => {}
            }
        }
        form
    }
}
