#![warn(missing_docs)]

//! Capability bits and the sets they combine into.
//!
//! A [`Capability`] is a single named permission bit. A [`CapabilitySet`]
//! is an arbitrary-width bit vector combining any number of them, with the
//! set algebra the authorization engine needs (union, subtraction,
//! containment) and a big-endian byte form for storage and the wire.
//!
//! ```rust
//! use warrant_capability::{Capability, CapabilitySet};
//!
//! let mut held = CapabilitySet::from(Capability::ADD_USER);
//! held.add([&CapabilitySet::from(Capability::SEND_TRANSACTION)]);
//!
//! assert!(held.has_all([&CapabilitySet::from(Capability::ADD_USER)]));
//! assert!(!held.is_root());
//! assert_eq!(held.to_string(), "add_user,send_transaction");
//! ```
//!
//! # Registry
//!
//! Display names come from a process-wide [`CapabilityRegistry`]. The
//! registry is built once during startup: an application that defines
//! capabilities beyond the built-in catalogue calls
//! [`CapabilityRegistry::install`] before anything reads it. The first read
//! seals the registry, and any later `install` fails. This is an
//! initialization-order contract; the registry is never mutated in place.

mod error;
pub use error::*;

mod capability;
pub use capability::*;

mod set;
pub use set::*;

mod registry;
pub use registry::*;
