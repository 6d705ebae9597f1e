//! Storage layer for the Shelfmark catalog and lending tracker.
//!
//! This crate provides SQLite-backed persistence for library materials,
//! loan transactions, user profiles, and the append-only audit log.
//!
//! # Architecture
//!
//! - [`Database`] - Connection pool manager with automatic migrations
//! - [`MaterialRepository`], [`TransactionRepository`], [`ProfileRepository`],
//!   [`AuditLogRepository`] - Data access traits
//! - [`validation`] - Input checks applied before material writes
//!
//! Lifecycle rules for loans (duplicate prevention, allowed transitions,
//! audit entries) are not enforced here; see the `shelfmark-lending` crate.
//!
//! # Core Concepts
//!
//! ## Shadow Columns
//!
//! Materials carry lowercase copies of title and author (`title_lower`,
//! `author_lower`), refreshed on every write. Prefix search runs against
//! these columns so matching is case-insensitive without collation tricks.
//!
//! ## Denormalized Transactions
//!
//! A transaction copies the material title, author and type at request
//! time, so history stays readable after the material is edited or deleted.
//!
//! # Examples
//!
//! ## Cataloguing and Searching
//!
//! ```no_run
//! use shelfmark_storage::{Database, DatabaseConfig};
//! use shelfmark_storage::models::{MaterialDraft, SearchQuery};
//! use shelfmark_storage::repositories::{MaterialRepository, SqliteMaterialRepository};
//! use shelfmark_core::{MaterialType, SearchSort};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DatabaseConfig::new("shelfmark.db").max_connections(10);
//! let db = Database::new(config).await?;
//!
//! let materials = SqliteMaterialRepository::new(db.pool().clone());
//!
//! let draft = MaterialDraft::new("Introduction to Algorithms", "Cormen", 2009, MaterialType::Book)
//!     .keywords(vec!["algorithms".to_string(), "graphs".to_string()]);
//! let id = materials.create(&draft).await?;
//!
//! let hits = materials.search_by_prefix("intro", 8).await?;
//! assert!(hits.iter().any(|m| m.id == id));
//!
//! let query = SearchQuery::new("graphs").sort(SearchSort::Recent);
//! for material in materials.smart_search(&query).await? {
//!     println!("{} ({})", material.title, material.publication_year);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # SQL Injection Prevention
//!
//! All queries use parameterized statements via SQLx. Dynamic filters are
//! assembled with `QueryBuilder::push_bind`.

pub mod connection;
pub mod error;
pub mod models;
pub mod repositories;
pub mod validation;

pub use connection::{Database, DatabaseConfig};
pub use error::{StorageError, StorageResult};
pub use models::{
    AuditLogEntry, FileReference, Material, MaterialDraft, MaterialPatch, SearchQuery,
    StatusUpdate, Transaction, UserProfile,
};
pub use repositories::{
    AuditLogRepository, MaterialRepository, ProfileRepository, SqliteAuditLogRepository,
    SqliteMaterialRepository, SqliteProfileRepository, SqliteTransactionRepository,
    TransactionRepository,
};
