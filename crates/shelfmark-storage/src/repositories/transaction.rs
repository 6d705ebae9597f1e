#![allow(async_fn_in_trait)]

use crate::error::{StorageError, StorageResult};
use crate::models::{StatusUpdate, Transaction};
use shelfmark_core::TransactionStatus;
use sqlx::SqlitePool;
use std::collections::HashMap;

const TRANSACTION_COLUMNS: &str = "id, user_id, user_name, user_identifier, \
     material_id, title, author, material_type, status, comment, \
     librarian_id, librarian_name, created_at, updated_at, \
     borrow_date, due_date, return_date";

/// Repository trait for loan Transaction operations
///
/// The repository stores and reads records; lifecycle rules (duplicate
/// prevention, allowed transitions) live in the lending services.
///
/// # Implementation Note
///
/// This trait uses native async trait methods (Edition 2024 feature),
/// eliminating the need for the async-trait crate while maintaining
/// full async/await support in trait methods.
pub trait TransactionRepository: Send + Sync {
    /// Insert a new transaction, returning its id
    async fn create(&self, transaction: &Transaction) -> StorageResult<String>;

    /// Find a transaction by its ID
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Transaction>>;

    /// All transactions of one user, newest first
    async fn find_by_user(&self, user_id: &str) -> StorageResult<Vec<Transaction>>;

    /// All transactions, newest first
    async fn find_all(&self) -> StorageResult<Vec<Transaction>>;

    /// All transactions with the given status, newest first
    async fn find_by_status(&self, status: TransactionStatus) -> StorageResult<Vec<Transaction>>;

    /// Count pending or borrowed transactions for a (user, material) pair
    async fn count_active(&self, user_id: &str, material_id: &str) -> StorageResult<i64>;

    /// Number of transactions per status
    async fn count_by_status(&self) -> StorageResult<HashMap<TransactionStatus, i64>>;

    /// Persist a librarian status transition
    async fn apply_status_update(&self, id: &str, update: &StatusUpdate) -> StorageResult<()>;
}

/// SQLite implementation of TransactionRepository
pub struct SqliteTransactionRepository {
    pool: SqlitePool,
}

impl SqliteTransactionRepository {
    /// Create a new SQLite transaction repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl TransactionRepository for SqliteTransactionRepository {
    async fn create(&self, transaction: &Transaction) -> StorageResult<String> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, user_id, user_name, user_identifier,
                material_id, title, author, material_type,
                status, comment, librarian_id, librarian_name,
                created_at, updated_at, borrow_date, due_date, return_date
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.user_id)
        .bind(&transaction.user_name)
        .bind(&transaction.user_identifier)
        .bind(&transaction.material_id)
        .bind(&transaction.title)
        .bind(&transaction.author)
        .bind(&transaction.material_type)
        .bind(&transaction.status)
        .bind(&transaction.comment)
        .bind(&transaction.librarian_id)
        .bind(&transaction.librarian_name)
        .bind(transaction.created_at)
        .bind(transaction.updated_at)
        .bind(transaction.borrow_date)
        .bind(transaction.due_date)
        .bind(transaction.return_date)
        .execute(&self.pool)
        .await?;

        Ok(transaction.id.clone())
    }

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Transaction>> {
        let transaction = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    async fn find_by_user(&self, user_id: &str) -> StorageResult<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             WHERE user_id = ? ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    async fn find_all(&self) -> StorageResult<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    async fn find_by_status(&self, status: TransactionStatus) -> StorageResult<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             WHERE status = ? ORDER BY created_at DESC"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    async fn count_active(&self, user_id: &str, material_id: &str) -> StorageResult<i64> {
        let [first, second] = TransactionStatus::ACTIVE;
        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM transactions \
             WHERE user_id = ? AND material_id = ? AND status IN (?, ?)",
        )
        .bind(user_id)
        .bind(material_id)
        .bind(first.as_str())
        .bind(second.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    async fn count_by_status(&self) -> StorageResult<HashMap<TransactionStatus, i64>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM transactions GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        let mut counts: HashMap<TransactionStatus, i64> =
            TransactionStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for (status, count) in rows {
            counts.insert(status.parse()?, count);
        }

        Ok(counts)
    }

    async fn apply_status_update(&self, id: &str, update: &StatusUpdate) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET status = ?,
                updated_at = ?,
                borrow_date = COALESCE(?, borrow_date),
                due_date = COALESCE(?, due_date),
                return_date = COALESCE(?, return_date),
                comment = COALESCE(?, comment),
                user_name = ?,
                user_identifier = CASE WHEN ? THEN ? ELSE user_identifier END,
                librarian_id = ?,
                librarian_name = ?
            WHERE id = ?
            "#,
        )
        .bind(update.status.as_str())
        .bind(update.updated_at)
        .bind(update.borrow_date)
        .bind(update.due_date)
        .bind(update.return_date)
        .bind(&update.comment)
        .bind(&update.user_name)
        .bind(update.user_identifier.is_some())
        .bind(update.user_identifier.clone().flatten())
        .bind(&update.librarian_id)
        .bind(&update.librarian_name)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Transaction", id));
        }

        Ok(())
    }
}
