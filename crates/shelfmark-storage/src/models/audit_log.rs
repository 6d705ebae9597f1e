use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shelfmark_core::AuditAction;
use shelfmark_core::constants::{UNKNOWN_LIBRARIAN, UNKNOWN_USER, UNTITLED_MATERIAL};

/// Audit log entry recording one librarian-driven status change
///
/// Entries are write-once: the schema rejects updates and deletes with
/// triggers, and the repository exposes no mutation besides `create`.
///
/// # Fields
///
/// * `id` - Auto-increment primary key
/// * `action` - [`AuditAction`] string (`"approved"`, `"returned (overdue)"`, ...)
/// * `transaction_id` - Transaction the action applied to
/// * `user_id` / `user_name` - Borrower
/// * `material_id` / `material_title` - Material
/// * `librarian_id` / `librarian_name` - Acting librarian
/// * `comment` - Librarian comment, empty when none was given
/// * `timestamp` - When the entry was written
///
/// # Examples
///
/// ```
/// use shelfmark_storage::models::AuditLogEntry;
/// use shelfmark_core::{AuditAction, TransactionStatus};
///
/// let entry = AuditLogEntry::new(
///     AuditAction::Status(TransactionStatus::Approved),
///     "tx-1".to_string(),
///     "alice".to_string(),
///     String::new(),
///     "m-1".to_string(),
///     "Intro to Algorithms".to_string(),
///     "lib-1".to_string(),
///     "Bob".to_string(),
///     Some("ok".to_string()),
/// );
///
/// assert_eq!(entry.action, "approved");
/// assert_eq!(entry.user_name, "Unknown User");
/// assert_eq!(entry.comment, "ok");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditLogEntry {
    /// Auto-increment primary key
    pub id: i64,

    /// Action kind
    ///
    /// Use `get_action()` to convert to the `AuditAction` enum.
    pub action: String,

    /// Transaction the action applied to
    pub transaction_id: String,

    /// Borrower uid
    pub user_id: String,

    /// Borrower display name
    pub user_name: String,

    /// Material id
    pub material_id: String,

    /// Material title
    pub material_title: String,

    /// Acting librarian uid
    pub librarian_id: String,

    /// Acting librarian display name
    pub librarian_name: String,

    /// Librarian comment (empty when none)
    pub comment: String,

    /// Write time
    pub timestamp: DateTime<Utc>,
}

impl AuditLogEntry {
    /// Create a new audit entry, filling blank names with fallback labels
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        action: AuditAction,
        transaction_id: String,
        user_id: String,
        user_name: String,
        material_id: String,
        material_title: String,
        librarian_id: String,
        librarian_name: String,
        comment: Option<String>,
    ) -> Self {
        Self {
            id: 0, // Will be set by database
            action: action.as_str().to_string(),
            transaction_id,
            user_id,
            user_name: or_fallback(user_name, UNKNOWN_USER),
            material_id,
            material_title: or_fallback(material_title, UNTITLED_MATERIAL),
            librarian_id,
            librarian_name: or_fallback(librarian_name, UNKNOWN_LIBRARIAN),
            comment: comment.unwrap_or_default(),
            timestamp: Utc::now(),
        }
    }

    /// Get the action as an enum
    pub fn get_action(&self) -> Option<AuditAction> {
        self.action.parse().ok()
    }

    /// Check whether a lowercase needle occurs in the searchable fields
    ///
    /// Searchable fields are user name, user id, material title and comment.
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        [
            &self.user_name,
            &self.user_id,
            &self.material_title,
            &self.comment,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle_lower))
    }
}

fn or_fallback(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}
