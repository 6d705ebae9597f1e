use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shelfmark_core::TransactionStatus;
use uuid::Uuid;

/// Loan transaction: a borrow request and its full lifecycle record
///
/// User and material fields are snapshots taken when the request is made and
/// refreshed on every librarian transition, so the record stays readable after
/// the material is edited or deleted.
///
/// # Fields
///
/// * `id` - UUID v4 string
/// * `user_id` / `user_name` / `user_identifier` - Borrower snapshot
/// * `material_id` / `title` / `author` / `material_type` - Material snapshot
/// * `status` - Persisted [`TransactionStatus`] string
/// * `comment` - Latest librarian comment
/// * `librarian_id` / `librarian_name` - Last acting librarian
/// * `created_at` / `updated_at` - Record timestamps
/// * `borrow_date` / `due_date` / `return_date` - Set as the loan progresses
///
/// # Database Schema
///
/// Maps to the `transactions` table. Rows are never deleted; `returned` and
/// `rejected` records are kept for history.
///
/// # Examples
///
/// ```
/// use shelfmark_storage::models::Transaction;
/// use shelfmark_core::TransactionStatus;
///
/// let tx = Transaction::pending(
///     "alice".to_string(),
///     "Alice Doe".to_string(),
///     Some("ADM-042".to_string()),
///     "m-1".to_string(),
///     "Intro to Algorithms".to_string(),
///     "Cormen".to_string(),
///     "Book".to_string(),
/// );
///
/// assert_eq!(tx.get_status().unwrap(), TransactionStatus::Pending);
/// assert!(tx.borrow_date.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transaction {
    /// UUID v4 string primary key
    pub id: String,

    /// Identity-provider uid of the borrower
    pub user_id: String,

    /// Borrower display name at the last refresh
    pub user_name: String,

    /// Department/admission identifier at the last refresh
    pub user_identifier: Option<String>,

    /// Referenced material id (may no longer exist)
    pub material_id: String,

    /// Material title snapshot
    pub title: String,

    /// Material author snapshot
    pub author: String,

    /// Material type snapshot
    pub material_type: String,

    /// Lifecycle status
    ///
    /// Use `get_status()` to convert to the `TransactionStatus` enum.
    pub status: String,

    /// Latest librarian comment
    pub comment: Option<String>,

    /// Last acting librarian uid
    pub librarian_id: Option<String>,

    /// Last acting librarian display name
    pub librarian_name: Option<String>,

    /// When the request was made
    pub created_at: DateTime<Utc>,

    /// When the record last changed
    pub updated_at: DateTime<Utc>,

    /// When the material was handed over
    pub borrow_date: Option<DateTime<Utc>>,

    /// When the material must be back
    pub due_date: Option<DateTime<Utc>>,

    /// When the material came back
    pub return_date: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Create a new pending request with a fresh id
    pub fn pending(
        user_id: String,
        user_name: String,
        user_identifier: Option<String>,
        material_id: String,
        title: String,
        author: String,
        material_type: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            user_name,
            user_identifier,
            material_id,
            title,
            author,
            material_type,
            status: TransactionStatus::Pending.as_str().to_string(),
            comment: None,
            librarian_id: None,
            librarian_name: None,
            created_at: now,
            updated_at: now,
            borrow_date: None,
            due_date: None,
            return_date: None,
        }
    }

    /// Get the status as an enum
    ///
    /// # Errors
    ///
    /// Returns `shelfmark_core::Error::InvalidStatus` if the stored value is unknown.
    pub fn get_status(&self) -> shelfmark_core::Result<TransactionStatus> {
        self.status.parse()
    }

    /// Check whether this transaction is borrowed and past its due date at `now`
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.status == TransactionStatus::Borrowed.as_str()
            && self
                .due_date
                .is_some_and(|due| shelfmark_core::time::is_past_due(due, now))
    }
}

/// Fields written by a librarian status transition
///
/// Date and comment fields left as `None` keep their stored value.
/// `user_identifier` is `None` to keep the stored identifier and `Some(value)`
/// to overwrite it, including with `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub status: TransactionStatus,
    pub updated_at: DateTime<Utc>,
    pub borrow_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub comment: Option<String>,
    pub user_name: String,
    pub user_identifier: Option<Option<String>>,
    pub librarian_id: String,
    pub librarian_name: String,
}

impl StatusUpdate {
    /// The record as the update leaves it, mirroring `apply_status_update`
    pub fn apply_to(&self, mut tx: Transaction) -> Transaction {
        tx.status = self.status.as_str().to_string();
        tx.updated_at = self.updated_at;
        tx.borrow_date = self.borrow_date.or(tx.borrow_date);
        tx.due_date = self.due_date.or(tx.due_date);
        tx.return_date = self.return_date.or(tx.return_date);
        if let Some(comment) = &self.comment {
            tx.comment = Some(comment.clone());
        }
        tx.user_name = self.user_name.clone();
        if let Some(identifier) = &self.user_identifier {
            tx.user_identifier = identifier.clone();
        }
        tx.librarian_id = Some(self.librarian_id.clone());
        tx.librarian_name = Some(self.librarian_name.clone());
        tx
    }
}
