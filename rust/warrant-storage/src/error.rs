use thiserror::Error;

/// The common error type used by this crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WarrantStorageError {
    /// An error that occurs when working with a state store backend
    #[error("State store backend error: {0}")]
    Backend(String),

    /// A slot holds a value that cannot be read as the expected type
    #[error("State store slot is corrupt: {0}")]
    Corrupt(String),
}
