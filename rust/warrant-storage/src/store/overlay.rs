use std::collections::HashMap;

use warrant_common::{Address, StorageKey, Word};

use crate::WarrantStorageError;

use super::StateStore;

/// A [StateOverlay] pairs a "true" [StateStore] with an in-memory layer of
/// pending writes. All writes land in the overlay; reads first check the
/// overlay and then fall back to the true store.
///
/// This is the store-level transaction a caller reaches for when a
/// sequence of engine calls must apply all-or-nothing: run the calls
/// against the overlay, then [StateOverlay::commit] on success or
/// [StateOverlay::discard] on failure.
#[derive(Clone, Debug)]
pub struct StateOverlay<Store>
where
    Store: StateStore,
{
    store: Store,
    pending: HashMap<(Address, StorageKey), Word>,
}

impl<Store> StateOverlay<Store>
where
    Store: StateStore,
{
    /// Instantiate a new [StateOverlay] over the provided `store`.
    pub fn new(store: Store) -> Self {
        Self {
            store,
            pending: HashMap::new(),
        }
    }

    /// The number of slots written since the overlay was created
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Write every pending slot through to the true store and return it.
    pub fn commit(mut self) -> Store {
        let count = self.pending.len();
        for ((account, key), value) in self.pending.drain() {
            self.store.set(&account, &key, value);
        }
        tracing::debug!(slots = count, "State overlay committed");
        self.store
    }

    /// Drop every pending slot and return the untouched true store.
    pub fn discard(self) -> Store {
        tracing::debug!(slots = self.pending.len(), "State overlay discarded");
        self.store
    }
}

impl<Store> StateStore for StateOverlay<Store>
where
    Store: StateStore,
{
    fn get(&self, account: &Address, key: &StorageKey) -> Word {
        match self.pending.get(&(*account, *key)) {
            Some(value) => *value,
            None => self.store.get(account, key),
        }
    }

    fn set(&mut self, account: &Address, key: &StorageKey, value: Word) {
        self.pending.insert((*account, *key), value);
    }

    fn error(&self) -> Option<WarrantStorageError> {
        self.store.error()
    }
}
