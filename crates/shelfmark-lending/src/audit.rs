//! Audit log writer and the filtering/paging applied on top of it.
//!
//! Writes are best-effort: [`AuditLogWriter::create_log`] never returns an
//! error, so a failed audit write cannot undo a committed transition. Reads
//! fetch the whole log; filtering and paging happen in memory.

use crate::error::LendingResult;
use serde::Serialize;
use shelfmark_core::AuditAction;
use shelfmark_core::constants::DEFAULT_AUDIT_PAGE_SIZE;
use shelfmark_storage::AuditLogEntry;
use shelfmark_storage::repositories::{AuditLogRepository, SqliteAuditLogRepository};
use tracing::{debug, error};

/// Append-only audit writer over an [`AuditLogRepository`]
pub struct AuditLogWriter<R = SqliteAuditLogRepository> {
    repo: R,
}

impl<R: AuditLogRepository> AuditLogWriter<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Append an entry, returning its id when the write succeeded
    ///
    /// Failures are logged and swallowed.
    pub async fn create_log(&self, entry: AuditLogEntry) -> Option<i64> {
        match self.repo.create(&entry).await {
            Ok(id) => {
                debug!(
                    audit_id = id,
                    action = %entry.action,
                    transaction_id = %entry.transaction_id,
                    "Audit entry written"
                );
                Some(id)
            }
            Err(e) => {
                error!(
                    action = %entry.action,
                    transaction_id = %entry.transaction_id,
                    "Failed to write audit entry: {}",
                    e
                );
                None
            }
        }
    }

    /// Every entry, newest first
    pub async fn get_all_logs(&self) -> LendingResult<Vec<AuditLogEntry>> {
        Ok(self.repo.find_all().await?)
    }

    /// Entries for one transaction, newest first
    pub async fn logs_for_transaction(
        &self,
        transaction_id: &str,
    ) -> LendingResult<Vec<AuditLogEntry>> {
        Ok(self.repo.find_by_transaction(transaction_id).await?)
    }

    /// Fetch everything, filter, and return one page
    pub async fn browse(
        &self,
        filter: &AuditFilter,
        page: usize,
        per_page: usize,
    ) -> LendingResult<Page<AuditLogEntry>> {
        let logs = filter.apply(self.get_all_logs().await?);
        Ok(paginate(logs, page, per_page))
    }
}

/// Client-side audit log filter
///
/// # Example
///
/// ```
/// use shelfmark_core::{AuditAction, TransactionStatus};
/// use shelfmark_lending::AuditFilter;
///
/// let filter = AuditFilter::default()
///     .action(AuditAction::Status(TransactionStatus::Approved))
///     .search("alice");
/// assert!(filter.search.is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Only entries with this action
    pub action: Option<AuditAction>,

    /// Case-insensitive substring over user name, user id, material title
    /// and comment
    pub search: Option<String>,
}

impl AuditFilter {
    pub fn action(mut self, action: AuditAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    /// Check one entry against the filter
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        if let Some(action) = self.action
            && entry.action != action.as_str()
        {
            return false;
        }

        match &self.search {
            Some(text) => {
                let needle = text.trim().to_lowercase();
                needle.is_empty() || entry.matches_text(&needle)
            }
            None => true,
        }
    }

    /// Keep matching entries, preserving order
    pub fn apply(&self, entries: Vec<AuditLogEntry>) -> Vec<AuditLogEntry> {
        entries.into_iter().filter(|e| self.matches(e)).collect()
    }
}

/// One page of an in-memory result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// 1-based page number actually returned
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,

    /// Always at least 1
    pub total_pages: usize,
}

/// Slice `items` into the requested page
///
/// `page` is clamped to `1..=total_pages`; a `per_page` of zero uses the
/// default audit page size.
///
/// # Examples
///
/// ```
/// use shelfmark_lending::paginate;
///
/// let page = paginate((1..=40).collect::<Vec<_>>(), 3, 15);
/// assert_eq!(page.items, (31..=40).collect::<Vec<_>>());
/// assert_eq!(page.total_pages, 3);
///
/// let past_end = paginate(vec![1, 2], 9, 15);
/// assert_eq!(past_end.page, 1);
/// ```
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = if per_page == 0 {
        DEFAULT_AUDIT_PAGE_SIZE
    } else {
        per_page
    };
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let items = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
    }
}
