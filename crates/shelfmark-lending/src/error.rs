use shelfmark_core::TransactionStatus;
use shelfmark_storage::StorageError;
use thiserror::Error;

/// Errors surfaced by lending operations.
///
/// Store failures are folded into `Persistence`; callers report them and let
/// the user retry. Audit log failures never appear here.
#[derive(Debug, Error)]
pub enum LendingError {
    /// Referenced transaction, material or profile does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The user already has a pending or borrowed transaction for this material
    #[error("User {user_id} already has an active request for material {material_id}")]
    DuplicateRequest { user_id: String, material_id: String },

    /// A borrow transition was requested without a due date
    #[error("A due date is required to mark a transaction as borrowed")]
    MissingDueDate,

    /// The supplied due date could not be parsed
    #[error("Invalid due date: {0}")]
    InvalidDate(String),

    /// The transition policy rejected the status change
    #[error("Cannot move transaction from {from} to {to}")]
    InvalidTransition {
        from: TransactionStatus,
        to: TransactionStatus,
    },

    /// Required-field or range check failed on catalog input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Underlying store error
    #[error("Persistence failure: {0}")]
    Persistence(#[source] StorageError),
}

impl LendingError {
    pub(crate) fn not_found(entity: &str, id: &str) -> Self {
        LendingError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<StorageError> for LendingError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound {
                entity_type, value, ..
            } => LendingError::NotFound {
                entity: entity_type,
                id: value,
            },
            StorageError::Validation(msg) => LendingError::Validation(msg),
            other => LendingError::Persistence(other),
        }
    }
}

impl From<shelfmark_core::Error> for LendingError {
    fn from(err: shelfmark_core::Error) -> Self {
        match err {
            shelfmark_core::Error::InvalidDate(input) => LendingError::InvalidDate(input),
            other => LendingError::Persistence(StorageError::Corrupt(other)),
        }
    }
}

/// Specialized result type for lending operations
pub type LendingResult<T> = Result<T, LendingError>;
