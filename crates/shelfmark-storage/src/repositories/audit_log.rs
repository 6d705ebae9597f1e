#![allow(async_fn_in_trait)]

use crate::error::StorageResult;
use crate::models::AuditLogEntry;
use sqlx::SqlitePool;

/// Repository trait for audit log operations
///
/// Append-only: there is no update or delete, and the schema rejects both
/// with triggers.
///
/// # Implementation Note
///
/// This trait uses native async trait methods (Edition 2024 feature),
/// eliminating the need for the async-trait crate while maintaining
/// full async/await support in trait methods.
pub trait AuditLogRepository: Send + Sync {
    /// Append an entry, returning its id
    async fn create(&self, entry: &AuditLogEntry) -> StorageResult<i64>;

    /// All entries, newest first
    async fn find_all(&self) -> StorageResult<Vec<AuditLogEntry>>;

    /// Entries for one transaction, newest first
    async fn find_by_transaction(&self, transaction_id: &str)
    -> StorageResult<Vec<AuditLogEntry>>;

    /// Total number of entries
    async fn count(&self) -> StorageResult<i64>;
}

/// SQLite implementation of AuditLogRepository
pub struct SqliteAuditLogRepository {
    pool: SqlitePool,
}

impl SqliteAuditLogRepository {
    /// Create a new SQLite audit log repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AuditLogRepository for SqliteAuditLogRepository {
    async fn create(&self, entry: &AuditLogEntry) -> StorageResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO audit_logs (
                action, transaction_id, user_id, user_name,
                material_id, material_title, librarian_id, librarian_name,
                comment, timestamp
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.action)
        .bind(&entry.transaction_id)
        .bind(&entry.user_id)
        .bind(&entry.user_name)
        .bind(&entry.material_id)
        .bind(&entry.material_title)
        .bind(&entry.librarian_id)
        .bind(&entry.librarian_name)
        .bind(&entry.comment)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn find_all(&self) -> StorageResult<Vec<AuditLogEntry>> {
        let logs = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT id, action, transaction_id, user_id, user_name,
                   material_id, material_title, librarian_id, librarian_name,
                   comment, timestamp
            FROM audit_logs
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }

    async fn find_by_transaction(
        &self,
        transaction_id: &str,
    ) -> StorageResult<Vec<AuditLogEntry>> {
        let logs = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT id, action, transaction_id, user_id, user_name,
                   material_id, material_title, librarian_id, librarian_name,
                   comment, timestamp
            FROM audit_logs
            WHERE transaction_id = ?
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }

    async fn count(&self) -> StorageResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0)
    }
}
