use thiserror::Error;

/// Storage-specific error types for the Shelfmark lending tracker.
///
/// These errors represent failures in database operations, input validation,
/// and decoding of persisted values.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database connection or query execution failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration execution failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Entity not found in database
    #[error("Entity not found: {entity_type} with {field}={value}")]
    NotFound {
        entity_type: String,
        field: String,
        value: String,
    },

    /// Data validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// A persisted value could not be decoded into its domain type
    #[error("Corrupt record: {0}")]
    Corrupt(#[from] shelfmark_core::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StorageError {
    /// Shorthand for a `NotFound` lookup by id.
    pub fn not_found(entity_type: &str, id: &str) -> Self {
        StorageError::NotFound {
            entity_type: entity_type.to_string(),
            field: "id".to_string(),
            value: id.to_string(),
        }
    }
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
