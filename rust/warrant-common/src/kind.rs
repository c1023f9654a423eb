use std::fmt::{Display, Formatter};

/// The failure categories shared by every warrant error type.
///
/// Each crate keeps its own error enum; `kind()` on any of them maps the
/// concrete error onto one of these so callers can branch without caring
/// which layer produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An operand was rejected before any permission check ran.
    InvalidArgument,
    /// The grantee is already delegated by another account.
    NotOwner,
    /// The acting account lacks the capabilities the operation requires.
    Forbidden,
    /// An instruction payload is inconsistent with its own framing.
    MalformedInput,
    /// The state store reported an error.
    StorageFailure,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::NotOwner => "not owner",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::MalformedInput => "malformed input",
            ErrorKind::StorageFailure => "storage failure",
        };
        f.write_str(name)
    }
}
