use thiserror::Error;
use warrant_authority::WarrantAuthorityError;
use warrant_common::ErrorKind;

/// Errors that can occur while reading, writing or executing authorization
/// instructions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WarrantEncodingError {
    /// The bytes claim to be an instruction but are not a valid one.
    ///
    /// This covers a declared body length that disagrees with the bytes
    /// actually present, an unknown opcode and operands that cannot be read.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A well-formed instruction was rejected by the authorization engine.
    #[error(transparent)]
    Authority(#[from] WarrantAuthorityError),
}

impl WarrantEncodingError {
    /// The failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedInput(_) => ErrorKind::MalformedInput,
            Self::Authority(error) => error.kind(),
        }
    }
}
