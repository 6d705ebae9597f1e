//! Lending services for the Shelfmark catalog.
//!
//! Sits on top of `shelfmark-storage` and owns the loan lifecycle rules:
//!
//! - [`TransactionManager`] - loan requests, librarian transitions, live feed
//! - [`Catalog`] - material CRUD, prefix and smart search, view counting
//! - [`AuditLogWriter`] - best-effort audit writes, filtered paging
//! - [`Reports`] - overdue report and dashboard counters
//! - [`ProfileResolver`] - seam to the identity subsystem
//!
//! # Loan Lifecycle
//!
//! ```text
//! pending ──> approved ──> borrowed ──> returned
//!    │            │
//!    └────────────┴──> rejected
//! ```
//!
//! Under [`TransitionPolicy::Strict`](shelfmark_core::TransitionPolicy) only
//! these edges are accepted. `Permissive` accepts any non-pending target.
//!
//! # Logging
//!
//! Operations emit `tracing` events with structured fields
//! (`transaction_id`, `material_id`, `user_id`). Install a subscriber in the
//! host application to see them.

pub mod audit;
pub mod catalog;
pub mod config;
pub mod error;
pub mod feed;
pub mod manager;
pub mod messages;
pub mod profiles;
pub mod reports;
pub mod session;

pub use audit::{AuditFilter, AuditLogWriter, Page, paginate};
pub use catalog::Catalog;
pub use config::LendingConfig;
pub use error::{LendingError, LendingResult};
pub use feed::{StatusNotice, UserFeed};
pub use manager::{TransactionManager, TransitionExtra};
pub use messages::NoticeMessages;
pub use profiles::ProfileResolver;
pub use reports::{OverdueLoan, Reports, StatusCounts, UserSummary};
pub use session::{Identity, MaterialSnapshot};
