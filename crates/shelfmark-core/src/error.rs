use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Parsing errors
    #[error("Invalid transaction status: {0}")]
    InvalidStatus(String),

    #[error("Invalid material type: {0}")]
    InvalidMaterialType(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid sort order: {0}")]
    InvalidSort(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    // Lifecycle errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },
}

pub type Result<T> = std::result::Result<T, Error>;
