//! Dashboard read models computed from the transaction store.

use crate::error::LendingResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use shelfmark_core::TransactionStatus;
use shelfmark_core::time::days_overdue;
use shelfmark_storage::Transaction;
use shelfmark_storage::repositories::{SqliteTransactionRepository, TransactionRepository};
use std::collections::HashMap;

/// A borrowed transaction past its due date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverdueLoan {
    pub transaction: Transaction,
    pub days_overdue: i64,
}

/// Per-user dashboard counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub borrowed: usize,
    pub returned: usize,
    pub pending: usize,
}

/// Librarian dashboard counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCounts {
    /// Every status is present, zero when unused
    pub by_status: HashMap<TransactionStatus, i64>,
    pub overdue: usize,
}

impl StatusCounts {
    pub fn count(&self, status: TransactionStatus) -> i64 {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Report queries over a [`TransactionRepository`]
pub struct Reports<T = SqliteTransactionRepository> {
    transactions: T,
}

impl<T: TransactionRepository> Reports<T> {
    pub fn new(transactions: T) -> Self {
        Self { transactions }
    }

    /// Borrowed loans due strictly before `as_of`, most overdue first
    ///
    /// The status filter runs in SQL; the date comparison runs here.
    pub async fn overdue(&self, as_of: DateTime<Utc>) -> LendingResult<Vec<OverdueLoan>> {
        let mut loans: Vec<OverdueLoan> = self
            .transactions
            .find_by_status(TransactionStatus::Borrowed)
            .await?
            .into_iter()
            .filter_map(|tx| {
                let due = tx.due_date?;
                tx.is_overdue_at(as_of).then(|| OverdueLoan {
                    days_overdue: days_overdue(due, as_of),
                    transaction: tx,
                })
            })
            .collect();

        loans.sort_by(|a, b| b.days_overdue.cmp(&a.days_overdue));
        Ok(loans)
    }

    /// All of a user's transactions, newest first
    pub async fn user_history(&self, user_id: &str) -> LendingResult<Vec<Transaction>> {
        Ok(self.transactions.find_by_user(user_id).await?)
    }

    pub async fn user_summary(&self, user_id: &str) -> LendingResult<UserSummary> {
        let mut summary = UserSummary::default();
        for tx in self.transactions.find_by_user(user_id).await? {
            match tx.get_status() {
                Ok(TransactionStatus::Borrowed) => summary.borrowed += 1,
                Ok(TransactionStatus::Returned) => summary.returned += 1,
                Ok(TransactionStatus::Pending) => summary.pending += 1,
                _ => {}
            }
        }
        Ok(summary)
    }

    pub async fn status_counts(&self, as_of: DateTime<Utc>) -> LendingResult<StatusCounts> {
        let by_status = self.transactions.count_by_status().await?;
        let overdue = self.overdue(as_of).await?.len();
        Ok(StatusCounts { by_status, overdue })
    }
}
