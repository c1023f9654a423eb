use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use warrant_common::{Address, StorageKey, Word};

use crate::WarrantStorageError;

use super::StateStore;

/// A trivial implementation of [StateStore] - backed by a [HashMap] - where
/// all values are kept in memory and never persisted.
///
/// Clones share the same entries, so a test can hand one clone to the engine
/// and inspect the results through another. Writing [Word::ZERO] removes the
/// entry, which keeps "never written" and "cleared" indistinguishable the
/// same way a trie-backed store would.
#[derive(Clone, Default, Debug)]
pub struct MemoryStateStore {
    entries: Arc<RwLock<HashMap<(Address, StorageKey), Word>>>,
    error: Arc<Mutex<Option<WarrantStorageError>>>,
}

impl MemoryStateStore {
    /// Record a backend fault. Only the first recorded fault is kept.
    pub fn poison(&self, error: WarrantStorageError) {
        let mut slot = self.error.lock();
        if slot.is_none() {
            tracing::warn!(%error, "State store poisoned");
            *slot = Some(error);
        }
    }

    /// The number of non-zero slots held across all accounts
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when no account holds a non-zero slot
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, account: &Address, key: &StorageKey) -> Word {
        self.entries
            .read()
            .get(&(*account, *key))
            .copied()
            .unwrap_or_default()
    }

    fn set(&mut self, account: &Address, key: &StorageKey, value: Word) {
        let mut entries = self.entries.write();
        if value.is_zero() {
            entries.remove(&(*account, *key));
        } else {
            entries.insert((*account, *key), value);
        }
    }

    fn error(&self) -> Option<WarrantStorageError> {
        self.error.lock().clone()
    }
}
