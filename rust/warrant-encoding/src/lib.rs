#![warn(missing_docs)]

//! Warrant Encoding - In-band authorization instructions
//!
//! Authorization changes travel inside ordinary transaction payloads. A
//! payload that opens with the configured magic tag carries one
//! [Instruction] ahead of whatever the transaction is really about; this
//! crate reads and writes that instruction ([InstructionCodec]) and runs
//! it against an [warrant_authority::Authority] ([Gatekeeper]).
//!
//! ```rust
//! use warrant_authority::{Authority, TransactionKind};
//! use warrant_capability::Capability;
//! use warrant_common::Address;
//! use warrant_encoding::{Gatekeeper, Instruction, Transaction};
//! use warrant_storage::MemoryStateStore;
//!
//! # fn main() -> Result<(), warrant_encoding::WarrantEncodingError> {
//! let gatekeeper = Gatekeeper::default();
//! let mut store = MemoryStateStore::default();
//!
//! let root = Address::new([1u8; 20]);
//! let alice = Address::new([2u8; 20]);
//! gatekeeper
//!     .authority()
//!     .bootstrap(&mut store, &root, &Capability::ROOT.into())?;
//!
//! let mut payload = gatekeeper
//!     .codec()
//!     .encode(&Instruction::Grant(Capability::SEND_TRANSACTION.into()))?;
//! payload.extend_from_slice(b"call data");
//!
//! let admitted = gatekeeper.admit(
//!     &mut store,
//!     &Transaction {
//!         from: root,
//!         to: alice,
//!         payload: &payload,
//!         kind: TransactionKind::Call,
//!     },
//! )?;
//!
//! assert_eq!(admitted.remainder, b"call data");
//! assert!(
//!     gatekeeper
//!         .authority()
//!         .capabilities(&store, &alice)?
//!         .contains(Capability::SEND_TRANSACTION)
//! );
//! # Ok(())
//! # }
//! ```
//!
//! See the [`codec`] module documentation for the binary layout.

mod error;
pub use error::*;

mod settings;
pub use settings::*;

mod instruction;
pub use instruction::*;

pub mod codec;
pub use codec::*;

mod admission;
pub use admission::*;
