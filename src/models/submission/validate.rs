use std::fmt;

use url::Url;

use crate::auth::validate::{sanitize_text, sanitize_textarea};
use super::types::ValidatedSubmission;

/// Submissions must keep at least this many links after filtering.
pub const MIN_LINKS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Description,
    FormTitle,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Name => write!(f, "name"),
            Field::Description => write!(f, "description"),
            Field::FormTitle => write!(f, "form"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingField(Field),
    /// Fewer than `MIN_LINKS` links survived filtering.
    NoValidLinks,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingField(field) => {
                write!(f, "Please fill in the {field} field.")
            }
            ValidationError::NoValidLinks => {
                write!(f, "Please provide at least one valid link starting with http:// or https://.")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Sanitize and check raw intake fields. Pure: no I/O.
pub fn validate(
    raw_name: &str,
    raw_description: &str,
    raw_form_title: &str,
    raw_links: &[String],
) -> Result<ValidatedSubmission, ValidationError> {
    let name = sanitize_text(raw_name);
    if name.is_empty() {
        return Err(ValidationError::MissingField(Field::Name));
    }
    let description = sanitize_textarea(raw_description);
    if description.is_empty() {
        return Err(ValidationError::MissingField(Field::Description));
    }
    let form_title = sanitize_text(raw_form_title);
    if form_title.is_empty() {
        return Err(ValidationError::MissingField(Field::FormTitle));
    }

    let links = filter_links(raw_links);
    if links.len() < MIN_LINKS {
        return Err(ValidationError::NoValidLinks);
    }

    Ok(ValidatedSubmission { form_title, name, description, links })
}

/// Keep the absolute http(s) links, normalised, in their original order.
pub fn filter_links(raw_links: &[String]) -> Vec<String> {
    raw_links
        .iter()
        .filter_map(|raw| normalize_link(raw))
        .collect()
}

pub fn normalize_link(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let url = Url::parse(trimmed).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Some(url.to_string()),
        _ => None,
    }
}
