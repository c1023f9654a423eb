use thiserror::Error;

/// Errors that can occur while building the capability registry or reading
/// capabilities by name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WarrantCapabilityError {
    /// The registry was already installed or read.
    #[error("Capability registry is sealed; install it before first use")]
    Sealed,

    /// Two names were registered for the same bit.
    #[error("Capability bit {bit} is already registered as '{name}'")]
    DuplicateBit {
        /// The contested bit.
        bit: u32,
        /// The name already bound to it.
        name: String,
    },

    /// One name was registered for two bits.
    #[error("Capability name '{0}' is already registered")]
    DuplicateName(String),

    /// A name that no registered capability carries.
    #[error("Unknown capability '{0}'")]
    UnknownCapability(String),
}
