//! Presence/shape normalization for user-entered fields.
//!
//! # Invariants
//! - Titles never carry leading/trailing or repeated whitespace.
//! - A blank title is replaced by the caller-supplied placeholder.
//! - Reference ids (labels, reminders, priority) are never blank.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Shape violation found while normalizing a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// A reference id is empty after trim.
    BlankId { field: &'static str },
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId { field } => write!(f, "`{field}` must not contain blank ids"),
        }
    }
}

impl Error for FieldError {}

/// Collapses whitespace runs and trims; falls back to `placeholder` when blank.
pub fn normalize_title(value: &str, placeholder: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(value, " ");
    let trimmed = collapsed.trim();
    if trimmed.is_empty() {
        placeholder.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Trims free-form text. Inner line breaks are kept.
pub fn normalize_description(value: &str) -> String {
    value.trim().to_string()
}

/// Trims one reference id and rejects blanks.
pub fn normalize_id(value: &str, field: &'static str) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::BlankId { field });
    }
    Ok(trimmed.to_string())
}

/// Normalizes an id list, dropping duplicates after the first occurrence.
pub fn normalize_ids(values: &[String], field: &'static str) -> Result<Vec<String>, FieldError> {
    let mut normalized: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let id = normalize_id(value, field)?;
        if !normalized.contains(&id) {
            normalized.push(id);
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::{normalize_description, normalize_ids, normalize_title, FieldError};

    #[test]
    fn title_collapses_inner_whitespace() {
        assert_eq!(normalize_title("  buy \t\n milk ", "Untitled"), "buy milk");
    }

    #[test]
    fn blank_title_uses_placeholder() {
        assert_eq!(normalize_title(" \n ", "Untitled todo"), "Untitled todo");
    }

    #[test]
    fn description_keeps_line_breaks() {
        assert_eq!(normalize_description("\n a\nb \n"), "a\nb");
    }

    #[test]
    fn ids_are_trimmed_and_deduplicated() {
        let ids = vec![" home ".to_string(), "work".to_string(), "home".to_string()];
        assert_eq!(
            normalize_ids(&ids, "label_ids").unwrap(),
            vec!["home".to_string(), "work".to_string()]
        );
    }

    #[test]
    fn blank_id_is_rejected() {
        let ids = vec!["ok".to_string(), "  ".to_string()];
        assert_eq!(
            normalize_ids(&ids, "reminder_ids").unwrap_err(),
            FieldError::BlankId {
                field: "reminder_ids"
            }
        );
    }
}
