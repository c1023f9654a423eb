#![warn(missing_docs)]

//! This crate implements hierarchical capability delegation on top of a
//! [warrant_storage::StateStore].
//!
//! Accounts hold a [warrant_capability::CapabilitySet] bitmask. An account
//! holding ADD_USER may hand any subset of its own capabilities to another
//! account, which then becomes its child in a delegation forest. Only the
//! delegating parent (or a root account) may add to a child's capabilities
//! later on, and revoking from an account revokes the same capabilities
//! from its whole subtree first.
//!
//! ```rust
//! use warrant_authority::{Authority, Mode};
//! use warrant_capability::{Capability, CapabilitySet};
//! use warrant_common::Address;
//! use warrant_storage::MemoryStateStore;
//!
//! # fn main() -> Result<(), warrant_authority::WarrantAuthorityError> {
//! let authority = Authority::default();
//! let mut store = MemoryStateStore::default();
//!
//! let root = Address::new([1u8; 20]);
//! let alice = Address::new([2u8; 20]);
//!
//! authority.bootstrap(&mut store, &root, &Capability::ROOT.into())?;
//!
//! let send = CapabilitySet::from(Capability::SEND_TRANSACTION);
//! authority.grant(&mut store, &root, &alice, &send, Mode::Apply)?;
//!
//! assert_eq!(authority.capabilities(&store, &alice)?, send);
//! assert_eq!(authority.hierarchy().parent(&store, &alice)?.map(|link| link.parent), Some(root));
//! # Ok(())
//! # }
//! ```
//!
//! Storage keys are derived from a configurable [KeySchema] namespace so
//! that several independent authorities can share one store.

mod error;
pub use error::*;

mod schema;
pub use schema::*;

mod hierarchy;
pub use hierarchy::*;

mod info;
pub use info::*;

mod authority;
pub use authority::*;
