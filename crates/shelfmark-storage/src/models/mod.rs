pub mod audit_log;
pub mod material;
pub mod profile;
pub mod transaction;

pub use audit_log::AuditLogEntry;
pub use material::{FileReference, Material, MaterialDraft, MaterialPatch, SearchQuery};
pub use profile::UserProfile;
pub use transaction::{StatusUpdate, Transaction};
