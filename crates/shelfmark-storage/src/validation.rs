//! Input validation for material create and edit.
//!
//! Checks run before any write; a failed check returns
//! [`StorageError::Validation`] and the store is left untouched.
//!
//! # Rules
//!
//! - Title and author must not be blank
//! - Publication year must be between [`MIN_PUBLICATION_YEAR`] and the current year
//! - A file reference must carry a non-blank URL and name
//! - Keywords are trimmed; blank keywords are dropped

use crate::error::{StorageError, StorageResult};
use crate::models::{FileReference, MaterialDraft, MaterialPatch};
use chrono::{Datelike, Utc};
use shelfmark_core::constants::MIN_PUBLICATION_YEAR;

/// Validate a draft and return it with normalized keywords
///
/// # Examples
///
/// ```
/// use shelfmark_storage::models::MaterialDraft;
/// use shelfmark_storage::validation::validate_draft;
/// use shelfmark_core::MaterialType;
///
/// let draft = MaterialDraft::new("Data Structures", "Wirth", 1976, MaterialType::Book)
///     .keywords(vec![" lists ".to_string(), "".to_string()]);
/// let draft = validate_draft(draft).unwrap();
/// assert_eq!(draft.keywords, vec!["lists"]);
///
/// let bad = MaterialDraft::new("", "Wirth", 1976, MaterialType::Book);
/// assert!(validate_draft(bad).is_err());
/// ```
pub fn validate_draft(mut draft: MaterialDraft) -> StorageResult<MaterialDraft> {
    require("title", &draft.title)?;
    require("author", &draft.author)?;
    validate_year(draft.publication_year)?;
    if let Some(file) = &draft.file {
        validate_file(file)?;
    }

    draft.keywords = normalize_keywords(draft.keywords);
    Ok(draft)
}

/// Validate the supplied fields of a patch and normalize its keywords
pub fn validate_patch(mut patch: MaterialPatch) -> StorageResult<MaterialPatch> {
    if let Some(title) = &patch.title {
        require("title", title)?;
    }
    if let Some(author) = &patch.author {
        require("author", author)?;
    }
    if let Some(year) = patch.publication_year {
        validate_year(year)?;
    }
    if let Some(file) = &patch.file {
        validate_file(file)?;
    }

    patch.keywords = patch.keywords.map(normalize_keywords);
    Ok(patch)
}

/// Check a publication year against the accepted range
pub fn validate_year(year: i32) -> StorageResult<()> {
    let current = Utc::now().year();
    if (MIN_PUBLICATION_YEAR..=current).contains(&year) {
        Ok(())
    } else {
        Err(StorageError::Validation(format!(
            "publication year must be {MIN_PUBLICATION_YEAR}-{current}, got {year}"
        )))
    }
}

/// Split a comma-separated keyword field into normalized keywords
///
/// # Examples
///
/// ```
/// use shelfmark_storage::validation::parse_keywords;
///
/// assert_eq!(parse_keywords("graphs, trees,, heaps "), vec!["graphs", "trees", "heaps"]);
/// assert!(parse_keywords("  ").is_empty());
/// ```
pub fn parse_keywords(field: &str) -> Vec<String> {
    normalize_keywords(field.split(',').map(str::to_string).collect())
}

fn normalize_keywords(keywords: Vec<String>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

fn require(field: &str, value: &str) -> StorageResult<()> {
    if value.trim().is_empty() {
        Err(StorageError::Validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

fn validate_file(file: &FileReference) -> StorageResult<()> {
    require("file url", &file.url)?;
    require("file name", &file.name)
}
