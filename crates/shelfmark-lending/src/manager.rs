//! Loan transaction lifecycle.
//!
//! [`TransactionManager`] owns every write to loan transactions:
//!
//! 1. **Request**: a borrower asks for a material; a `pending` record is
//!    created unless the borrower already has a pending or borrowed one for
//!    the same material.
//! 2. **Transition**: a librarian moves the record along the lifecycle
//!    graph. Each transition re-reads both profiles, persists the new status
//!    with its dates, then writes one audit entry.
//! 3. **Publish**: every committed write is broadcast to open
//!    [`UserFeed`]s.
//!
//! # Consistency
//!
//! The duplicate check and the insert are separate statements, so two
//! concurrent requests for the same pair can both succeed. The audit entry
//! is written after the status update and its failure is only logged.

use crate::audit::AuditLogWriter;
use crate::config::LendingConfig;
use crate::error::{LendingError, LendingResult};
use crate::feed::UserFeed;
use crate::profiles::ProfileResolver;
use crate::session::{Identity, MaterialSnapshot};
use chrono::Utc;
use shelfmark_core::constants::{OVERDUE_RETURN_COMMENT, UNKNOWN_LIBRARIAN, UNKNOWN_USER};
use shelfmark_core::time::parse_due_date;
use shelfmark_core::{AuditAction, TransactionStatus, TransitionPolicy};
use shelfmark_storage::repositories::{
    AuditLogRepository, SqliteAuditLogRepository, SqliteProfileRepository,
    SqliteTransactionRepository, TransactionRepository,
};
use shelfmark_storage::{AuditLogEntry, StatusUpdate, Transaction};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Optional data supplied with a librarian transition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionExtra {
    /// Free-text comment; replaces the stored comment when present
    pub comment: Option<String>,

    /// Due date as `YYYY-MM-DD` or RFC 3339; required for `borrowed`
    pub due_date: Option<String>,
}

impl TransitionExtra {
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }
}

/// Loan request and status transition service
///
/// # Examples
///
/// ```no_run
/// use shelfmark_core::TransactionStatus;
/// use shelfmark_lending::{Identity, LendingConfig, MaterialSnapshot, TransactionManager, TransitionExtra};
/// use shelfmark_storage::Database;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let db = Database::in_memory().await?;
/// let manager = TransactionManager::sqlite(db.pool().clone(), &LendingConfig::default());
///
/// let alice = Identity::new("alice").display_name("Alice");
/// let material = MaterialSnapshot {
///     id: "m-1".to_string(),
///     title: "Intro to Algorithms".to_string(),
///     author: "Cormen".to_string(),
///     material_type: "Book".to_string(),
/// };
/// let id = manager.request_loan(&alice, &material).await?;
///
/// let librarian = Identity::new("lib-1");
/// manager
///     .transition(&id, TransactionStatus::Approved, TransitionExtra::default(), &librarian)
///     .await?;
/// manager
///     .transition(
///         &id,
///         TransactionStatus::Borrowed,
///         TransitionExtra::default().due_date("2025-12-01"),
///         &librarian,
///     )
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct TransactionManager<
    T = SqliteTransactionRepository,
    A = SqliteAuditLogRepository,
    P = SqliteProfileRepository,
> {
    transactions: T,
    audit: AuditLogWriter<A>,
    profiles: P,
    policy: TransitionPolicy,
    events: broadcast::Sender<Transaction>,
}

impl TransactionManager {
    /// Build a manager backed by the SQLite repositories
    pub fn sqlite(pool: SqlitePool, config: &LendingConfig) -> Self {
        Self::new(
            SqliteTransactionRepository::new(pool.clone()),
            AuditLogWriter::new(SqliteAuditLogRepository::new(pool.clone())),
            SqliteProfileRepository::new(pool),
            config,
        )
    }
}

impl<T, A, P> TransactionManager<T, A, P>
where
    T: TransactionRepository,
    A: AuditLogRepository,
    P: ProfileResolver,
{
    pub fn new(
        transactions: T,
        audit: AuditLogWriter<A>,
        profiles: P,
        config: &LendingConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.feed_capacity.max(1));
        Self {
            transactions,
            audit,
            profiles,
            policy: config.policy,
            events,
        }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Audit writer shared with the transitions
    pub fn audit(&self) -> &AuditLogWriter<A> {
        &self.audit
    }

    /// Create a `pending` request for a material
    ///
    /// # Errors
    ///
    /// - `DuplicateRequest` if the user has a pending or borrowed transaction
    ///   for this material; nothing is written
    /// - `Persistence` on store failure
    pub async fn request_loan(
        &self,
        identity: &Identity,
        material: &MaterialSnapshot,
    ) -> LendingResult<String> {
        let active = self
            .transactions
            .count_active(&identity.user_id, &material.id)
            .await?;
        if active > 0 {
            debug!(
                user_id = %identity.user_id,
                material_id = %material.id,
                "Duplicate loan request rejected"
            );
            return Err(LendingError::DuplicateRequest {
                user_id: identity.user_id.clone(),
                material_id: material.id.clone(),
            });
        }

        let profile = self.profiles.get_profile(&identity.user_id).await?;
        let user_name = profile
            .as_ref()
            .and_then(|p| p.resolved_name())
            .or_else(|| identity.best_name())
            .unwrap_or_else(|| UNKNOWN_USER.to_string());
        let user_identifier = profile.and_then(|p| p.identifier);

        let transaction = Transaction::pending(
            identity.user_id.clone(),
            user_name,
            user_identifier,
            material.id.clone(),
            material.title_or_default(),
            material.author.clone(),
            material.material_type.clone(),
        );
        let id = self.transactions.create(&transaction).await?;

        info!(
            transaction_id = %id,
            user_id = %transaction.user_id,
            material_id = %transaction.material_id,
            "Loan requested"
        );
        self.publish(transaction);

        Ok(id)
    }

    /// Move a transaction to `target` on behalf of a librarian
    ///
    /// Payload checks run before any I/O, so a rejected call leaves the
    /// record untouched.
    ///
    /// # Errors
    ///
    /// - `MissingDueDate` / `InvalidDate` for a bad borrow payload
    /// - `NotFound` if the transaction does not exist
    /// - `InvalidTransition` if the policy rejects the change
    /// - `Persistence` on store failure
    pub async fn transition(
        &self,
        transaction_id: &str,
        target: TransactionStatus,
        extra: TransitionExtra,
        librarian: &Identity,
    ) -> LendingResult<Transaction> {
        self.apply(
            transaction_id,
            target,
            AuditAction::Status(target),
            extra,
            librarian,
        )
        .await
    }

    /// Close an overdue loan from the overdue report
    ///
    /// Same as a `returned` transition, with a default comment and a
    /// distinct audit action.
    pub async fn return_overdue(
        &self,
        transaction_id: &str,
        librarian: &Identity,
        comment: Option<String>,
    ) -> LendingResult<Transaction> {
        let extra = TransitionExtra {
            comment: Some(comment.unwrap_or_else(|| OVERDUE_RETURN_COMMENT.to_string())),
            due_date: None,
        };
        self.apply(
            transaction_id,
            TransactionStatus::Returned,
            AuditAction::ReturnedOverdue,
            extra,
            librarian,
        )
        .await
    }

    /// Fetch one transaction, failing with `NotFound` when absent
    pub async fn get(&self, transaction_id: &str) -> LendingResult<Transaction> {
        self.transactions
            .find_by_id(transaction_id)
            .await?
            .ok_or_else(|| LendingError::not_found("Transaction", transaction_id))
    }

    /// A borrower's transactions, newest first
    pub async fn list_for_user(&self, user_id: &str) -> LendingResult<Vec<Transaction>> {
        Ok(self.transactions.find_by_user(user_id).await?)
    }

    /// Every transaction, newest first
    pub async fn list_all(&self) -> LendingResult<Vec<Transaction>> {
        Ok(self.transactions.find_all().await?)
    }

    /// Librarian work queue: everything not yet returned
    pub async fn active_queue(&self) -> LendingResult<Vec<Transaction>> {
        let mut all = self.transactions.find_all().await?;
        all.retain(|tx| tx.status != TransactionStatus::Returned.as_str());
        Ok(all)
    }

    /// Open a live feed for one borrower, seeded with their current statuses
    pub async fn subscribe_user(&self, user_id: &str) -> LendingResult<UserFeed> {
        let receiver = self.events.subscribe();
        let current = self.transactions.find_by_user(user_id).await?;
        Ok(UserFeed::new(user_id.to_string(), receiver, &current))
    }

    async fn apply(
        &self,
        transaction_id: &str,
        target: TransactionStatus,
        action: AuditAction,
        extra: TransitionExtra,
        librarian: &Identity,
    ) -> LendingResult<Transaction> {
        let due_date = if target == TransactionStatus::Borrowed {
            let raw = extra
                .due_date
                .as_deref()
                .map(str::trim)
                .filter(|raw| !raw.is_empty())
                .ok_or(LendingError::MissingDueDate)?;
            Some(parse_due_date(raw)?)
        } else {
            None
        };

        let current = self.get(transaction_id).await?;
        let from = current.get_status()?;
        self.policy
            .check(from, target)
            .map_err(|_| LendingError::InvalidTransition { from, to: target })?;

        let comment = extra
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|comment| !comment.is_empty())
            .map(str::to_string);

        let user_profile = self.profiles.get_profile(&current.user_id).await?;
        let librarian_profile = self.profiles.get_profile(&librarian.user_id).await?;

        let user_name = user_profile
            .as_ref()
            .and_then(|p| p.resolved_name())
            .unwrap_or_else(|| current.user_name.clone());
        let librarian_name = librarian_profile
            .and_then(|p| p.resolved_name())
            .or_else(|| librarian.best_name())
            .unwrap_or_else(|| UNKNOWN_LIBRARIAN.to_string());

        let now = Utc::now();
        let update = StatusUpdate {
            status: target,
            updated_at: now,
            borrow_date: due_date.map(|_| now),
            due_date,
            return_date: (target == TransactionStatus::Returned).then_some(now),
            comment: comment.clone(),
            user_name: user_name.clone(),
            user_identifier: user_profile.map(|p| p.identifier),
            librarian_id: librarian.user_id.clone(),
            librarian_name: librarian_name.clone(),
        };
        self.transactions
            .apply_status_update(transaction_id, &update)
            .await?;

        info!(
            transaction_id = %transaction_id,
            from = %from,
            to = %target,
            librarian_id = %librarian.user_id,
            "Transaction status changed"
        );

        self.audit
            .create_log(AuditLogEntry::new(
                action,
                current.id.clone(),
                current.user_id.clone(),
                user_name,
                current.material_id.clone(),
                current.title.clone(),
                librarian.user_id.clone(),
                librarian_name,
                comment,
            ))
            .await;

        // The status write has committed; reload failures are only logged.
        let updated = match self.transactions.find_by_id(transaction_id).await {
            Ok(Some(tx)) => tx,
            Ok(None) => {
                warn!(transaction_id = %transaction_id, "Transaction vanished after update");
                update.apply_to(current)
            }
            Err(e) => {
                warn!(transaction_id = %transaction_id, "Failed to reload transaction: {}", e);
                update.apply_to(current)
            }
        };
        self.publish(updated.clone());
        Ok(updated)
    }

    fn publish(&self, transaction: Transaction) {
        if self.events.send(transaction).is_err() {
            debug!("No feed subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfmark_core::Role;
    use shelfmark_storage::repositories::ProfileRepository;
    use shelfmark_storage::{Database, StorageError, StorageResult, UserProfile};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    async fn setup(policy: TransitionPolicy) -> (Database, TransactionManager) {
        let db = Database::in_memory().await.unwrap();
        let manager =
            TransactionManager::sqlite(db.pool().clone(), &LendingConfig::default().policy(policy));
        (db, manager)
    }

    fn material() -> MaterialSnapshot {
        MaterialSnapshot {
            id: "m-1".to_string(),
            title: "Intro to Algorithms".to_string(),
            author: "Cormen".to_string(),
            material_type: "Book".to_string(),
        }
    }

    #[tokio::test]
    async fn test_request_uses_profile_name_and_identifier() {
        let (db, manager) = setup(TransitionPolicy::Strict).await;
        SqliteProfileRepository::new(db.pool().clone())
            .upsert(
                &UserProfile::new("alice", Role::User, "Alice Doe", "alice@x.org")
                    .with_identifier("ADM-7"),
            )
            .await
            .unwrap();

        let id = manager
            .request_loan(&Identity::new("alice").display_name("alice99"), &material())
            .await
            .unwrap();

        let tx = manager.get(&id).await.unwrap();
        assert_eq!(tx.user_name, "Alice Doe");
        assert_eq!(tx.user_identifier.as_deref(), Some("ADM-7"));
        assert_eq!(tx.get_status().unwrap(), TransactionStatus::Pending);
        assert_eq!(tx.created_at, tx.updated_at);
        assert!(manager.audit().get_all_logs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_request_name_fallbacks() {
        let (_db, manager) = setup(TransitionPolicy::Strict).await;

        let id = manager
            .request_loan(&Identity::new("u1").email("u1@x.org"), &material())
            .await
            .unwrap();
        assert_eq!(manager.get(&id).await.unwrap().user_name, "u1@x.org");

        let mut untitled = material();
        untitled.id = "m-2".to_string();
        untitled.title = String::new();
        let id = manager
            .request_loan(&Identity::new("u1"), &untitled)
            .await
            .unwrap();
        let tx = manager.get(&id).await.unwrap();
        assert_eq!(tx.user_name, UNKNOWN_USER);
        assert_eq!(tx.title, "Untitled Material");
    }

    #[tokio::test]
    async fn test_invalid_due_date_leaves_record_unchanged() {
        let (_db, manager) = setup(TransitionPolicy::Strict).await;
        let lib = Identity::new("lib-1");
        let id = manager
            .request_loan(&Identity::new("alice"), &material())
            .await
            .unwrap();
        manager
            .transition(&id, TransactionStatus::Approved, TransitionExtra::default(), &lib)
            .await
            .unwrap();
        let before = manager.get(&id).await.unwrap();

        let err = manager
            .transition(
                &id,
                TransactionStatus::Borrowed,
                TransitionExtra::default().due_date("first of december"),
                &lib,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LendingError::InvalidDate(_)));
        assert_eq!(manager.get(&id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_missing_transaction_is_not_found() {
        let (_db, manager) = setup(TransitionPolicy::Strict).await;
        let err = manager
            .transition(
                "nope",
                TransactionStatus::Approved,
                TransitionExtra::default(),
                &Identity::new("lib-1"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LendingError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_payload_checked_before_lookup() {
        let (_db, manager) = setup(TransitionPolicy::Strict).await;
        let err = manager
            .transition(
                "nope",
                TransactionStatus::Borrowed,
                TransitionExtra::default(),
                &Identity::new("lib-1"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LendingError::MissingDueDate));
    }

    #[tokio::test]
    async fn test_comment_overwrites_and_persists() {
        let (_db, manager) = setup(TransitionPolicy::Strict).await;
        let lib = Identity::new("lib-1").display_name("Bob");
        let id = manager
            .request_loan(&Identity::new("alice"), &material())
            .await
            .unwrap();

        let approved = manager
            .transition(
                &id,
                TransactionStatus::Approved,
                TransitionExtra::default().comment("ok"),
                &lib,
            )
            .await
            .unwrap();
        assert_eq!(approved.comment.as_deref(), Some("ok"));
        assert_eq!(approved.librarian_name.as_deref(), Some("Bob"));

        let rejected = manager
            .transition(&id, TransactionStatus::Rejected, TransitionExtra::default(), &lib)
            .await
            .unwrap();
        assert_eq!(rejected.comment.as_deref(), Some("ok"));
        assert_eq!(rejected.get_status().unwrap(), TransactionStatus::Rejected);
    }

    #[tokio::test]
    async fn test_active_queue_hides_returned() {
        let (_db, manager) = setup(TransitionPolicy::Permissive).await;
        let lib = Identity::new("lib-1");
        let id = manager
            .request_loan(&Identity::new("alice"), &material())
            .await
            .unwrap();
        let mut other = material();
        other.id = "m-2".to_string();
        manager
            .request_loan(&Identity::new("alice"), &other)
            .await
            .unwrap();

        manager
            .transition(&id, TransactionStatus::Returned, TransitionExtra::default(), &lib)
            .await
            .unwrap();

        assert_eq!(manager.list_all().await.unwrap().len(), 2);
        let queue = manager.active_queue().await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].material_id, "m-2");
    }

    /// Transaction store whose reads fail once a status update has landed
    struct ReadFailsAfterUpdate {
        inner: SqliteTransactionRepository,
        updated: AtomicBool,
    }

    impl TransactionRepository for ReadFailsAfterUpdate {
        async fn create(&self, transaction: &Transaction) -> StorageResult<String> {
            self.inner.create(transaction).await
        }

        async fn find_by_id(&self, id: &str) -> StorageResult<Option<Transaction>> {
            if self.updated.load(Ordering::SeqCst) {
                return Err(StorageError::Configuration("store offline".to_string()));
            }
            self.inner.find_by_id(id).await
        }

        async fn find_by_user(&self, user_id: &str) -> StorageResult<Vec<Transaction>> {
            self.inner.find_by_user(user_id).await
        }

        async fn find_all(&self) -> StorageResult<Vec<Transaction>> {
            self.inner.find_all().await
        }

        async fn find_by_status(
            &self,
            status: TransactionStatus,
        ) -> StorageResult<Vec<Transaction>> {
            self.inner.find_by_status(status).await
        }

        async fn count_active(&self, user_id: &str, material_id: &str) -> StorageResult<i64> {
            self.inner.count_active(user_id, material_id).await
        }

        async fn count_by_status(&self) -> StorageResult<HashMap<TransactionStatus, i64>> {
            self.inner.count_by_status().await
        }

        async fn apply_status_update(&self, id: &str, update: &StatusUpdate) -> StorageResult<()> {
            self.inner.apply_status_update(id, update).await?;
            self.updated.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_transition_succeeds_when_reload_fails() {
        let db = Database::in_memory().await.unwrap();
        let repo = SqliteTransactionRepository::new(db.pool().clone());
        let manager = TransactionManager::new(
            ReadFailsAfterUpdate {
                inner: SqliteTransactionRepository::new(db.pool().clone()),
                updated: AtomicBool::new(false),
            },
            AuditLogWriter::new(SqliteAuditLogRepository::new(db.pool().clone())),
            SqliteProfileRepository::new(db.pool().clone()),
            &LendingConfig::default(),
        );
        let id = manager
            .request_loan(&Identity::new("alice"), &material())
            .await
            .unwrap();

        let tx = manager
            .transition(
                &id,
                TransactionStatus::Approved,
                TransitionExtra::default().comment("  ok  "),
                &Identity::new("lib-1").display_name("Bob"),
            )
            .await
            .unwrap();
        assert_eq!(tx.get_status().unwrap(), TransactionStatus::Approved);
        assert_eq!(tx.comment.as_deref(), Some("ok"));
        assert_eq!(tx.librarian_name.as_deref(), Some("Bob"));

        let stored = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.status, tx.status);
        assert_eq!(stored.comment, tx.comment);
    }
}
