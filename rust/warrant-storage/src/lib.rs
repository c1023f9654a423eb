#![warn(missing_docs)]

//! This crate defines the narrow contract through which the authorization
//! engine reaches persistent state: a [StateStore] keyed by
//! `(account, key)` that yields fixed-size [Word]s and accumulates the
//! first error it encounters rather than failing individual calls.
//!
//! A few implementations ship alongside the contract:
//!
//! ```rust
//! use warrant_common::{Address, StorageKey, Word};
//! use warrant_storage::{MemoryStateStore, StateOverlay, StateStore};
//!
//! let account = Address::new([1u8; 20]);
//! let key = StorageKey::named("balance");
//!
//! let store = MemoryStateStore::default();
//! let mut overlay = StateOverlay::new(store.clone());
//!
//! // Writes land in the overlay only...
//! overlay.set(&account, &key, Word::from_u64(10));
//! assert_eq!(store.get(&account, &key), Word::ZERO);
//!
//! // ...until they are committed to the base store.
//! overlay.commit();
//! assert_eq!(store.get(&account, &key), Word::from_u64(10));
//! ```
//!
//! [Word]: warrant_common::Word

mod error;
pub use error::*;

mod store;
pub use store::*;
