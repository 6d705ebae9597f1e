//! Date helpers for loan due dates and overdue counting.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{Error, Result};

/// Parse a librarian-supplied due date.
///
/// Accepts a calendar date (`2025-12-01`, interpreted as midnight UTC) or a
/// full RFC 3339 timestamp. Surrounding whitespace is ignored.
///
/// # Errors
/// Returns `Error::InvalidDate` when the input matches neither format.
///
/// # Examples
///
/// ```
/// use shelfmark_core::time::parse_due_date;
///
/// let due = parse_due_date("2025-12-01").unwrap();
/// assert_eq!(due.to_rfc3339(), "2025-12-01T00:00:00+00:00");
///
/// assert!(parse_due_date("next tuesday").is_err());
/// ```
pub fn parse_due_date(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .ok_or_else(|| Error::InvalidDate(input.to_string()));
    }

    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::InvalidDate(input.to_string()))
}

/// Whole days elapsed since `due`, never negative.
///
/// # Examples
///
/// ```
/// use shelfmark_core::time::{days_overdue, parse_due_date};
///
/// let due = parse_due_date("2025-12-01").unwrap();
/// let now = parse_due_date("2025-12-15T18:00:00Z").unwrap();
/// assert_eq!(days_overdue(due, now), 14);
/// assert_eq!(days_overdue(now, due), 0);
/// ```
#[must_use]
pub fn days_overdue(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - due).num_days().max(0)
}

/// Whether a loan due at `due` is overdue at `now`.
///
/// A loan is overdue only once its due instant is strictly in the past.
#[must_use]
pub fn is_past_due(due: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    due < now
}
