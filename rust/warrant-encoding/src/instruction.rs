use std::fmt::{Display, Formatter};

use warrant_capability::CapabilitySet;
use warrant_common::Address;

use crate::WarrantEncodingError;

/// The first byte of an instruction body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Delegate the operand capability set to the transaction recipient
    Grant = 0x01,
    /// Revoke the operand capability set from the recipient's subtree
    Revoke = 0x02,
    /// Raise the target's access allowance
    IncreaseAccessAllowance = 0x03,
    /// Lower the target's access allowance
    DecreaseAccessAllowance = 0x04,
}

impl TryFrom<u8> for Opcode {
    type Error = WarrantEncodingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::Grant),
            0x02 => Ok(Self::Revoke),
            0x03 => Ok(Self::IncreaseAccessAllowance),
            0x04 => Ok(Self::DecreaseAccessAllowance),
            other => Err(WarrantEncodingError::MalformedInput(format!(
                "unknown opcode 0x{other:02x}"
            ))),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(value: Opcode) -> Self {
        value as u8
    }
}

/// A decoded authorization instruction.
///
/// Grants and revokes act on the recipient of the transaction that carries
/// them; allowance adjustments name their own target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Delegate capabilities to the recipient.
    Grant(CapabilitySet),
    /// Revoke capabilities from the recipient and its descendants.
    Revoke(CapabilitySet),
    /// Add `delta` to the access allowance of `target`.
    AdjustAccessAllowance {
        /// The account whose allowance changes
        target: Address,
        /// The signed change
        delta: i64,
    },
}

impl Instruction {
    /// The opcode this instruction is written with.
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Grant(_) => Opcode::Grant,
            Self::Revoke(_) => Opcode::Revoke,
            Self::AdjustAccessAllowance { delta, .. } if *delta < 0 => {
                Opcode::DecreaseAccessAllowance
            }
            Self::AdjustAccessAllowance { .. } => Opcode::IncreaseAccessAllowance,
        }
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grant(set) => write!(f, "grant [{set}]"),
            Self::Revoke(set) => write!(f, "revoke [{set}]"),
            Self::AdjustAccessAllowance { target, delta } => {
                write!(f, "adjust access allowance of {target} by {delta:+}")
            }
        }
    }
}
