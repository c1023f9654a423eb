#![warn(missing_docs)]

//! This crate constitutes a library of light weight primitives that are
//! shared across the other warrant crates: the 20-byte [`Address`] that
//! identifies an account, the 32-byte [`Word`] that every state store slot
//! holds, the [`StorageKey`] that names a slot, and the [`ErrorKind`]
//! taxonomy that every crate's error type maps onto.

mod address;
pub use address::*;

mod word;
pub use word::*;

mod key;
pub use key::*;

mod kind;
pub use kind::*;
