pub mod audit_log;
pub mod material;
pub mod profile;
pub mod transaction;

pub use audit_log::{AuditLogRepository, SqliteAuditLogRepository};
pub use material::{MaterialRepository, SqliteMaterialRepository};
pub use profile::{ProfileRepository, SqliteProfileRepository};
pub use transaction::{SqliteTransactionRepository, TransactionRepository};
