use crate::{Result, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a loan transaction.
///
/// # Valid Transitions
///
/// - `Pending` → `Approved` | `Rejected`
/// - `Approved` → `Borrowed` | `Rejected`
/// - `Borrowed` → `Returned`
/// - `Returned`, `Rejected` are terminal
///
/// The string form (`"pending"`, `"approved"`, ...) is what gets persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Requested by a user, awaiting a librarian decision.
    Pending,
    /// Accepted by a librarian, not yet handed over.
    Approved,
    /// Declined by a librarian.
    Rejected,
    /// Handed over to the user with a due date.
    Borrowed,
    /// Returned to the library.
    Returned,
}

impl TransactionStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [TransactionStatus; 5] = [
        TransactionStatus::Pending,
        TransactionStatus::Approved,
        TransactionStatus::Rejected,
        TransactionStatus::Borrowed,
        TransactionStatus::Returned,
    ];

    /// Statuses that block a new request for the same (user, material) pair.
    ///
    /// `Approved` is deliberately absent: only pending and borrowed requests
    /// count as active.
    pub const ACTIVE: [TransactionStatus; 2] =
        [TransactionStatus::Pending, TransactionStatus::Borrowed];

    /// Persisted string form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Approved => "approved",
            TransactionStatus::Rejected => "rejected",
            TransactionStatus::Borrowed => "borrowed",
            TransactionStatus::Returned => "returned",
        }
    }

    /// Check if transition to target status is allowed by the lifecycle graph.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelfmark_core::TransactionStatus;
    ///
    /// assert!(TransactionStatus::Pending.can_transition_to(TransactionStatus::Approved));
    /// assert!(TransactionStatus::Approved.can_transition_to(TransactionStatus::Rejected));
    /// assert!(!TransactionStatus::Returned.can_transition_to(TransactionStatus::Borrowed));
    /// ```
    #[must_use]
    pub fn can_transition_to(self, target: TransactionStatus) -> bool {
        matches!(
            (self, target),
            (
                TransactionStatus::Pending,
                TransactionStatus::Approved | TransactionStatus::Rejected
            ) | (
                TransactionStatus::Approved,
                TransactionStatus::Borrowed | TransactionStatus::Rejected
            ) | (TransactionStatus::Borrowed, TransactionStatus::Returned)
        )
    }

    /// Whether no further transition leaves this status.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TransactionStatus::Returned | TransactionStatus::Rejected
        )
    }

    /// Whether this status blocks a duplicate request.
    #[must_use]
    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(TransactionStatus::Pending),
            "approved" => Ok(TransactionStatus::Approved),
            "rejected" => Ok(TransactionStatus::Rejected),
            "borrowed" => Ok(TransactionStatus::Borrowed),
            "returned" => Ok(TransactionStatus::Returned),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// How strictly status changes are checked against the lifecycle graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Only edges of the lifecycle graph are accepted.
    #[default]
    Strict,
    /// Any non-pending target is accepted from any status.
    Permissive,
}

impl TransitionPolicy {
    /// Validate a status change under this policy.
    ///
    /// `Pending` is never a valid target, regardless of policy.
    ///
    /// # Errors
    /// Returns `Error::InvalidStateTransition` when the change is not allowed.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelfmark_core::{TransactionStatus, TransitionPolicy};
    ///
    /// let back = (TransactionStatus::Returned, TransactionStatus::Borrowed);
    /// assert!(TransitionPolicy::Strict.check(back.0, back.1).is_err());
    /// assert!(TransitionPolicy::Permissive.check(back.0, back.1).is_ok());
    /// ```
    pub fn check(self, from: TransactionStatus, to: TransactionStatus) -> Result<()> {
        let allowed = match self {
            TransitionPolicy::Strict => from.can_transition_to(to),
            TransitionPolicy::Permissive => to != TransactionStatus::Pending,
        };

        if allowed {
            Ok(())
        } else {
            Err(Error::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }
}

/// Kind of catalog material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialType {
    Book,
    Journal,
    Thesis,
    Report,
    Dataset,
}

impl MaterialType {
    /// All supported material types, in form order.
    pub const ALL: [MaterialType; 5] = [
        MaterialType::Book,
        MaterialType::Journal,
        MaterialType::Thesis,
        MaterialType::Report,
        MaterialType::Dataset,
    ];

    /// Persisted string form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MaterialType::Book => "Book",
            MaterialType::Journal => "Journal",
            MaterialType::Thesis => "Thesis",
            MaterialType::Report => "Report",
            MaterialType::Dataset => "Dataset",
        }
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaterialType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        MaterialType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::InvalidMaterialType(s.to_string()))
    }
}

/// Role of an authenticated account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Librarian,
}

impl Role {
    /// Persisted string form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Librarian => "librarian",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "librarian" => Ok(Role::Librarian),
            _ => Err(Error::InvalidRole(s.to_string())),
        }
    }
}

/// Ordering applied by the filtered catalog search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSort {
    /// Most viewed first.
    #[default]
    Popular,
    /// Newest first.
    Recent,
    /// Alphabetical by title.
    Title,
}

impl FromStr for SearchSort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "popular" => Ok(SearchSort::Popular),
            "recent" => Ok(SearchSort::Recent),
            "title" => Ok(SearchSort::Title),
            _ => Err(Error::InvalidSort(s.to_string())),
        }
    }
}

/// Action recorded in an audit log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    /// A status transition; recorded under the target status name.
    Status(TransactionStatus),
    /// A borrowed item closed from the overdue report.
    ReturnedOverdue,
}

impl AuditAction {
    /// Persisted string form.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelfmark_core::{AuditAction, TransactionStatus};
    ///
    /// assert_eq!(AuditAction::Status(TransactionStatus::Approved).as_str(), "approved");
    /// assert_eq!(AuditAction::ReturnedOverdue.as_str(), "returned (overdue)");
    /// ```
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Status(status) => status.as_str(),
            AuditAction::ReturnedOverdue => "returned (overdue)",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case(AuditAction::ReturnedOverdue.as_str()) {
            return Ok(AuditAction::ReturnedOverdue);
        }
        s.parse().map(AuditAction::Status)
    }
}
