use std::fmt::{Debug, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::CapabilityRegistry;

/// A single named permission, identified by its bit index.
///
/// Bits are assigned once and never reused. [`Capability::ROOT`] is bit 0
/// and satisfies every permission check on its own.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(u32);

impl Capability {
    /// Superuser: bypasses every other permission check.
    pub const ROOT: Self = Self(0);

    /// May attach new accounts and grant capabilities it holds.
    pub const ADD_USER: Self = Self(1);

    /// May revoke capabilities it holds from accounts.
    pub const DEL_USER: Self = Self(2);

    /// May send contract-creating transactions.
    pub const CREATE_CONTRACT: Self = Self(3);

    /// May send transactions without spending access allowance.
    pub const SEND_TRANSACTION: Self = Self(4);

    /// May raise or lower another account's access allowance.
    pub const ADJUST_ACCESS_ALLOWANCE: Self = Self(5);

    /// The built-in catalogue, in bit order.
    pub const BUILTIN: [(Self, &'static str); 6] = [
        (Self::ROOT, "root"),
        (Self::ADD_USER, "add_user"),
        (Self::DEL_USER, "del_user"),
        (Self::CREATE_CONTRACT, "create_contract"),
        (Self::SEND_TRANSACTION, "send_transaction"),
        (Self::ADJUST_ACCESS_ALLOWANCE, "adjust_access_allowance"),
    ];

    /// The capability occupying `bit`.
    pub const fn new(bit: u32) -> Self {
        Self(bit)
    }

    /// The bit index of this capability.
    pub const fn bit(self) -> u32 {
        self.0
    }

    /// The registered display name of this capability, if any.
    pub fn name(self) -> Option<&'static str> {
        CapabilityRegistry::global().name(self)
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "bit{}", self.0),
        }
    }
}

impl Debug for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Capability({}: {self})", self.0)
    }
}
