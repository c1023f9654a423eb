use warrant_common::{Address, StorageKey, Word};

use crate::WarrantStorageError;

mod memory;
pub use memory::*;

mod measure;
pub use measure::*;

mod overlay;
pub use overlay::*;

/// A [StateStore] is a facade over the per-account key-value substrate
/// that the authorization engine reads and mutates.
///
/// Reads of slots that were never written yield [Word::ZERO]. Individual
/// calls never fail: a store that encounters a fault records the first
/// error it saw and keeps serving (possibly default) values. Callers are
/// expected to consult [StateStore::error] after a batch of operations and
/// to treat a recorded error as a storage failure.
pub trait StateStore {
    /// Retrieve the value stored for `account` under `key`
    fn get(&self, account: &Address, key: &StorageKey) -> Word;

    /// Store `value` for `account` under `key`
    fn set(&mut self, account: &Address, key: &StorageKey, value: Word);

    /// The first error accumulated by this store, if any
    fn error(&self) -> Option<WarrantStorageError>;
}

impl<T> StateStore for &mut T
where
    T: StateStore + ?Sized,
{
    fn get(&self, account: &Address, key: &StorageKey) -> Word {
        (**self).get(account, key)
    }

    fn set(&mut self, account: &Address, key: &StorageKey, value: Word) {
        (**self).set(account, key, value)
    }

    fn error(&self) -> Option<WarrantStorageError> {
        (**self).error()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use warrant_common::{Address, StorageKey, Word};

    use crate::{
        MeasuredStateStore, MemoryStateStore, StateOverlay, StateStore, WarrantStorageError,
    };

    fn account(seed: u8) -> Address {
        Address::new([seed; 20])
    }

    #[test]
    fn it_writes_and_reads_a_value() -> Result<()> {
        let mut store = MemoryStateStore::default();
        let key = StorageKey::named("slot");

        store.set(&account(1), &key, Word::from_u64(42));

        assert_eq!(store.get(&account(1), &key), Word::from_u64(42));
        assert_eq!(store.get(&account(2), &key), Word::ZERO);
        assert_eq!(store.error(), None);

        Ok(())
    }

    #[test]
    fn it_keeps_only_the_first_error() -> Result<()> {
        let store = MemoryStateStore::default();

        store.poison(WarrantStorageError::Backend("disk full".into()));
        store.poison(WarrantStorageError::Backend("later".into()));

        assert_eq!(
            store.error(),
            Some(WarrantStorageError::Backend("disk full".into()))
        );

        Ok(())
    }

    #[test]
    fn it_can_wrap_stores_in_an_overlay() -> Result<()> {
        let mut base = MemoryStateStore::default();
        let key = StorageKey::named("slot");
        base.set(&account(1), &key, Word::from_u64(1));

        let mut overlay = StateOverlay::new(base.clone());
        overlay.set(&account(2), &key, Word::from_u64(2));

        assert_eq!(base.get(&account(2), &key), Word::ZERO);
        assert_eq!(overlay.get(&account(2), &key), Word::from_u64(2));
        assert_eq!(overlay.get(&account(1), &key), Word::from_u64(1));

        let base = overlay.discard();
        assert_eq!(base.get(&account(2), &key), Word::ZERO);

        Ok(())
    }

    #[test]
    fn it_measures_reads_and_writes_through_a_borrowed_store() -> Result<()> {
        let mut base = MemoryStateStore::default();
        let key = StorageKey::named("slot");

        let mut measured = MeasuredStateStore::new(&mut base);
        measured.set(&account(1), &key, Word::from_u64(5));
        for _ in 0..3 {
            assert_eq!(measured.get(&account(1), &key), Word::from_u64(5));
        }

        assert_eq!(measured.writes(), 1);
        assert_eq!(measured.reads(), 3);
        assert_eq!(base.get(&account(1), &key), Word::from_u64(5));

        Ok(())
    }
}
