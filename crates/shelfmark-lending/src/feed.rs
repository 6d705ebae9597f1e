//! Live status feed for one borrower.
//!
//! The manager broadcasts every committed transaction write. A [`UserFeed`]
//! keeps the last status it saw per transaction and turns real status
//! changes into [`StatusNotice`]s. Transactions seen for the first time are
//! recorded without a notice.

use crate::messages::NoticeMessages;
use shelfmark_core::TransactionStatus;
use shelfmark_storage::Transaction;
use std::collections::HashMap;
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, warn};

/// A status change on one of the subscriber's transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusNotice {
    pub transaction_id: String,
    pub title: String,
    pub previous: TransactionStatus,
    pub current: TransactionStatus,
    pub message: String,
}

/// Subscription to one user's transaction changes
///
/// Dropping the feed unsubscribes; [`UserFeed::close`] does the same and
/// logs it.
pub struct UserFeed {
    user_id: String,
    receiver: Receiver<Transaction>,
    last_status: HashMap<String, TransactionStatus>,
}

impl UserFeed {
    pub(crate) fn new(
        user_id: String,
        receiver: Receiver<Transaction>,
        current: &[Transaction],
    ) -> Self {
        let last_status = current
            .iter()
            .filter_map(|tx| tx.get_status().ok().map(|status| (tx.id.clone(), status)))
            .collect();

        debug!(user_id = %user_id, known = current.len(), "User feed opened");

        Self {
            user_id,
            receiver,
            last_status,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Last status seen for a transaction
    pub fn known_status(&self, transaction_id: &str) -> Option<TransactionStatus> {
        self.last_status.get(transaction_id).copied()
    }

    /// Wait for the next status change
    ///
    /// Returns `None` once the manager has been dropped.
    pub async fn next_notice(&mut self) -> Option<StatusNotice> {
        loop {
            match self.receiver.recv().await {
                Ok(tx) => {
                    if let Some(notice) = self.observe(tx) {
                        return Some(notice);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(user_id = %self.user_id, skipped, "User feed lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Drain already-delivered events without waiting
    pub fn try_next_notice(&mut self) -> Option<StatusNotice> {
        loop {
            match self.receiver.try_recv() {
                Ok(tx) => {
                    if let Some(notice) = self.observe(tx) {
                        return Some(notice);
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(user_id = %self.user_id, skipped, "User feed lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Tear the subscription down
    pub fn close(self) {
        debug!(user_id = %self.user_id, "User feed closed");
    }

    fn observe(&mut self, tx: Transaction) -> Option<StatusNotice> {
        if tx.user_id != self.user_id {
            return None;
        }
        let current = tx.get_status().ok()?;
        let previous = self.last_status.insert(tx.id.clone(), current)?;
        if previous == current {
            return None;
        }

        let message = NoticeMessages::for_status(current, &tx.title)?;
        Some(StatusNotice {
            transaction_id: tx.id,
            title: tx.title,
            previous,
            current,
            message,
        })
    }
}
