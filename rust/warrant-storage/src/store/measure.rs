use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use warrant_common::{Address, StorageKey, Word};

use crate::WarrantStorageError;

use super::StateStore;

/// A [MeasuredStateStore] acts as a proxy over a [StateStore]
/// implementation that measures reads and writes.
#[derive(Clone, Debug)]
pub struct MeasuredStateStore<Store>
where
    Store: StateStore,
{
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
    store: Store,
}

impl<Store> MeasuredStateStore<Store>
where
    Store: StateStore,
{
    /// Wrap the provided [StateStore] so that reads and writes to it may be
    /// measured.
    pub fn new(store: Store) -> Self {
        Self {
            reads: Arc::new(AtomicUsize::default()),
            writes: Arc::new(AtomicUsize::default()),
            store,
        }
    }

    /// The aggregate number of reads from the wrapped [StateStore]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// The aggregate number of writes to the wrapped [StateStore]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// Unwrap the measured [StateStore]
    pub fn into_inner(self) -> Store {
        self.store
    }
}

impl<Store> StateStore for MeasuredStateStore<Store>
where
    Store: StateStore,
{
    fn get(&self, account: &Address, key: &StorageKey) -> Word {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.store.get(account, key)
    }

    fn set(&mut self, account: &Address, key: &StorageKey, value: Word) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.store.set(account, key, value)
    }

    fn error(&self) -> Option<WarrantStorageError> {
        self.store.error()
    }
}
