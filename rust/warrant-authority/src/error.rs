use thiserror::Error;
use warrant_capability::CapabilitySet;
use warrant_common::{Address, ErrorKind};
use warrant_storage::{StateStore, WarrantStorageError};

/// Errors that can occur while validating or applying an authorization
/// mutation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WarrantAuthorityError {
    /// An operand was rejected before any permission check.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The grantee is already delegated by a different account.
    #[error("Not owner: {account} belongs to {parent}, not {delegator}")]
    NotOwner {
        /// The account receiving the grant.
        account: Address,
        /// The account that originally attached it.
        parent: Address,
        /// The account attempting the grant.
        delegator: Address,
    },

    /// The acting account lacks capabilities the operation requires.
    #[error("Forbidden: {account} holds [{held}] but needs [{required}]")]
    Forbidden {
        /// The acting account.
        account: Address,
        /// What it holds.
        held: CapabilitySet,
        /// What the operation requires.
        required: CapabilitySet,
    },

    /// The state store accumulated an error.
    #[error("Storage failure: {0}")]
    StorageFailure(#[from] WarrantStorageError),
}

impl WarrantAuthorityError {
    /// The failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotOwner { .. } => ErrorKind::NotOwner,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::StorageFailure(_) => ErrorKind::StorageFailure,
        }
    }
}

/// Surface the store's accumulated error, if any, as a storage failure.
pub fn settle<S>(store: &S) -> Result<(), WarrantAuthorityError>
where
    S: StateStore + ?Sized,
{
    match store.error() {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}
