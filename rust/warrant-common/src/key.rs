use std::fmt::{Debug, Formatter};

/// The size of a storage key in bytes.
pub const STORAGE_KEY_SIZE: usize = 32;

/// The name of a slot inside an account's storage.
///
/// Keys are derived by hashing a human-readable slot name with BLAKE3, so
/// the store itself only ever sees opaque fixed-size keys.
///
/// ```rust
/// use warrant_common::StorageKey;
///
/// let key = StorageKey::named("ygl_addr_auth");
/// assert_eq!(key, StorageKey::named("ygl_addr_auth"));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StorageKey([u8; STORAGE_KEY_SIZE]);

impl StorageKey {
    /// Derive the key for the slot called `name`.
    pub fn named(name: &str) -> Self {
        Self(blake3::hash(name.as_bytes()).into())
    }

    /// The raw bytes of this key.
    pub fn bytes(&self) -> &[u8; STORAGE_KEY_SIZE] {
        &self.0
    }
}

impl From<[u8; STORAGE_KEY_SIZE]> for StorageKey {
    fn from(value: [u8; STORAGE_KEY_SIZE]) -> Self {
        Self(value)
    }
}

impl AsRef<[u8]> for StorageKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for StorageKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}...", hex::encode(&self.0[0..6]))
    }
}
