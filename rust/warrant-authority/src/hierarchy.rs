//! The delegation forest as it is laid out in the state store.
//!
//! Each account owns an append-only array of child slots and at most one
//! packed parent link:
//!
//! ```text
//!   parent slot (32 bytes)
//! ┌──────────────────────────┬──────────────────┐
//! │ parent address (0..20)   │ index (20..32)   │
//! └──────────────────────────┴──────────────────┘
//!
//!   child slots of the parent
//! ┌─────────┬─────────┬─────────┬─────────┐
//! │ child 0 │ (empty) │ child 2 │   ...   │   child_count = 3
//! └─────────┴─────────┴─────────┴─────────┘
//! ```
//!
//! Detaching zeroes a slot but never shrinks `child_count`, so the index
//! recorded in a child's parent link stays valid for as long as the link
//! exists.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use warrant_common::{ADDRESS_SIZE, Address, WORD_SIZE, Word};
use warrant_storage::{StateStore, WarrantStorageError};

use crate::{Keys, WarrantAuthorityError, settle};

/// An account's position under its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentLink {
    /// The delegator that attached the account
    pub parent: Address,
    /// The slot the account occupies in the parent's child array
    pub index: u64,
}

impl ParentLink {
    /// Pack this link into a single store word.
    pub fn pack(&self) -> Word {
        let mut word = [0u8; WORD_SIZE];
        word[..ADDRESS_SIZE].copy_from_slice(self.parent.bytes());
        word[WORD_SIZE - 8..].copy_from_slice(&self.index.to_be_bytes());
        Word::new(word)
    }

    /// Unpack a stored link. The zero word (and a zero parent) mean "no
    /// parent".
    pub fn unpack(word: &Word) -> Result<Option<Self>, WarrantStorageError> {
        let bytes = word.bytes();
        let parent = Address::try_from(&bytes[..ADDRESS_SIZE])
            .map_err(|error| WarrantStorageError::Corrupt(format!("{error}")))?;
        if parent.is_zero() {
            return Ok(None);
        }
        let index = Word::from_be_slice(&bytes[ADDRESS_SIZE..])
            .and_then(|index| index.to_u64())
            .ok_or_else(|| {
                WarrantStorageError::Corrupt(format!("parent index of {parent} overflows"))
            })?;
        Ok(Some(Self { parent, index }))
    }
}

/// Reads and mutates the parent/child structure of the delegation forest.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    keys: Keys,
}

impl Hierarchy {
    /// A hierarchy addressing its slots through `keys`.
    pub fn new(keys: Keys) -> Self {
        Self { keys }
    }

    /// The storage keys in use.
    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    /// The parent link of `account`, or `None` for a root or detached
    /// account.
    pub fn parent<S>(
        &self,
        store: &S,
        account: &Address,
    ) -> Result<Option<ParentLink>, WarrantAuthorityError>
    where
        S: StateStore + ?Sized,
    {
        let word = store.get(account, &self.keys.parent);
        settle(store)?;
        Ok(ParentLink::unpack(&word)?)
    }

    /// The number of child slots `account` has ever allocated.
    pub fn child_count<S>(&self, store: &S, account: &Address) -> Result<u64, WarrantAuthorityError>
    where
        S: StateStore + ?Sized,
    {
        let word = store.get(account, &self.keys.child_count);
        settle(store)?;
        word.to_u64().ok_or_else(|| {
            WarrantStorageError::Corrupt(format!("child count of {account} overflows")).into()
        })
    }

    /// The account in child slot `index` of `account`, or `None` if the slot
    /// is empty.
    pub fn child<S>(&self, store: &S, account: &Address, index: u64) -> Option<Address>
    where
        S: StateStore + ?Sized,
    {
        let word = store.get(account, &self.keys.child(index));
        (!word.is_zero()).then(|| word.to_address())
    }

    /// Record `child` in slot `index` of `parent` and link it back.
    ///
    /// `index` must be the parent's current child count: slots are only ever
    /// appended.
    pub fn attach<S>(
        &self,
        store: &mut S,
        parent: &Address,
        child: &Address,
        index: u64,
    ) -> Result<(), WarrantAuthorityError>
    where
        S: StateStore + ?Sized,
    {
        if parent.is_zero() || child.is_zero() || parent == child {
            return Err(WarrantAuthorityError::InvalidArgument(format!(
                "cannot attach {child} under {parent}"
            )));
        }
        let count = self.child_count(store, parent)?;
        if index != count {
            return Err(WarrantAuthorityError::InvalidArgument(format!(
                "child slot {index} of {parent} is not the next free slot ({count})"
            )));
        }
        if let Some(link) = self.parent(store, child)? {
            return Err(WarrantAuthorityError::InvalidArgument(format!(
                "{child} is already attached under {}",
                link.parent
            )));
        }
        let next = count.checked_add(1).ok_or_else(|| {
            WarrantAuthorityError::InvalidArgument(format!("{parent} has no free child slots"))
        })?;

        let link = ParentLink {
            parent: *parent,
            index,
        };
        store.set(child, &self.keys.parent, link.pack());
        store.set(parent, &self.keys.child_count, Word::from_u64(next));
        store.set(parent, &self.keys.child(index), Word::from_address(child));
        settle(store)?;

        tracing::trace!(%parent, %child, index, "Attached child");
        Ok(())
    }

    /// Clear `child`'s parent link and empty its slot in the parent. Returns
    /// the link that was removed, or `None` if there was none.
    pub fn detach<S>(
        &self,
        store: &mut S,
        child: &Address,
    ) -> Result<Option<ParentLink>, WarrantAuthorityError>
    where
        S: StateStore + ?Sized,
    {
        let Some(link) = self.parent(store, child)? else {
            return Ok(None);
        };
        store.set(&link.parent, &self.keys.child(link.index), Word::ZERO);
        store.set(child, &self.keys.parent, Word::ZERO);
        settle(store)?;

        tracing::trace!(parent = %link.parent, %child, index = link.index, "Detached child");
        Ok(Some(link))
    }

    /// The occupied child slots of `account`, in slot order.
    ///
    /// The sequence reads the store as it goes; call again to restart it
    /// against the latest state.
    pub fn children<'a, S>(
        &'a self,
        store: &'a S,
        account: &Address,
    ) -> Result<Children<'a, S>, WarrantAuthorityError>
    where
        S: StateStore + ?Sized,
    {
        Ok(Children {
            hierarchy: self,
            store,
            account: *account,
            next: 0,
            count: self.child_count(store, account)?,
        })
    }

    /// True when `ancestor` appears on the parent chain above `account`.
    pub fn is_ancestor<S>(
        &self,
        store: &S,
        ancestor: &Address,
        account: &Address,
    ) -> Result<bool, WarrantAuthorityError>
    where
        S: StateStore + ?Sized,
    {
        let mut visited = HashSet::from([*account]);
        let mut current = *account;
        while let Some(link) = self.parent(store, &current)? {
            if link.parent == *ancestor {
                return Ok(true);
            }
            if !visited.insert(link.parent) {
                return Err(WarrantStorageError::Corrupt(format!(
                    "parent chain of {account} loops"
                ))
                .into());
            }
            current = link.parent;
        }
        Ok(false)
    }
}

/// Iterator over the occupied child slots of one account.
pub struct Children<'a, S>
where
    S: StateStore + ?Sized,
{
    hierarchy: &'a Hierarchy,
    store: &'a S,
    account: Address,
    next: u64,
    count: u64,
}

impl<S> Iterator for Children<'_, S>
where
    S: StateStore + ?Sized,
{
    type Item = Address;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.count {
            let index = self.next;
            self.next += 1;
            if let Some(child) = self.hierarchy.child(self.store, &self.account, index) {
                return Some(child);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use warrant_storage::{MeasuredStateStore, MemoryStateStore};

    fn account(seed: u8) -> Address {
        Address::new([seed; ADDRESS_SIZE])
    }

    #[test]
    fn it_packs_parent_links() -> Result<()> {
        let link = ParentLink {
            parent: account(4),
            index: 258,
        };
        let word = link.pack();

        assert_eq!(&word.bytes()[..ADDRESS_SIZE], account(4).bytes());
        assert_eq!(&word.bytes()[WORD_SIZE - 2..], &[1, 2]);
        assert_eq!(ParentLink::unpack(&word)?, Some(link));
        assert_eq!(ParentLink::unpack(&Word::ZERO)?, None);

        Ok(())
    }

    #[test]
    fn it_appends_and_tombstones_child_slots() -> Result<()> {
        let hierarchy = Hierarchy::default();
        let mut store = MemoryStateStore::default();
        let parent = account(1);

        for (index, seed) in [2u8, 3, 4].into_iter().enumerate() {
            hierarchy.attach(&mut store, &parent, &account(seed), index as u64)?;
        }
        assert_eq!(hierarchy.child_count(&store, &parent)?, 3);

        let removed = hierarchy.detach(&mut store, &account(3))?;
        assert_eq!(
            removed,
            Some(ParentLink {
                parent,
                index: 1
            })
        );
        assert_eq!(hierarchy.parent(&store, &account(3))?, None);
        assert_eq!(hierarchy.child(&store, &parent, 1), None);
        assert_eq!(hierarchy.child_count(&store, &parent)?, 3);

        let children: Vec<_> = hierarchy.children(&store, &parent)?.collect();
        assert_eq!(children, vec![account(2), account(4)]);

        hierarchy.attach(&mut store, &parent, &account(3), 3)?;
        assert_eq!(
            hierarchy.parent(&store, &account(3))?,
            Some(ParentLink { parent, index: 3 })
        );

        Ok(())
    }

    #[test]
    fn it_refuses_out_of_order_or_double_attachment() -> Result<()> {
        let hierarchy = Hierarchy::default();
        let mut store = MemoryStateStore::default();

        let skipped = hierarchy.attach(&mut store, &account(1), &account(2), 1);
        assert!(matches!(
            skipped,
            Err(WarrantAuthorityError::InvalidArgument(_))
        ));

        hierarchy.attach(&mut store, &account(1), &account(2), 0)?;
        let twice = hierarchy.attach(&mut store, &account(5), &account(2), 0);
        assert!(matches!(twice, Err(WarrantAuthorityError::InvalidArgument(_))));

        Ok(())
    }

    #[test]
    fn it_ignores_detaching_an_unattached_account() -> Result<()> {
        let hierarchy = Hierarchy::default();
        let mut store = MemoryStateStore::default();

        assert_eq!(hierarchy.detach(&mut store, &account(9))?, None);
        assert!(store.is_empty());

        Ok(())
    }

    #[test]
    fn it_rereads_the_store_on_every_enumeration() -> Result<()> {
        let hierarchy = Hierarchy::default();
        let mut base = MemoryStateStore::default();
        hierarchy.attach(&mut base, &account(1), &account(2), 0)?;
        hierarchy.attach(&mut base, &account(1), &account(3), 1)?;

        let store = MeasuredStateStore::new(base);
        let first: Vec<_> = hierarchy.children(&store, &account(1))?.collect();
        let reads = store.reads();
        let second: Vec<_> = hierarchy.children(&store, &account(1))?.collect();

        assert_eq!(first, second);
        assert_eq!(reads, 3);
        assert_eq!(store.reads(), 6);

        Ok(())
    }

    #[test]
    fn it_walks_the_parent_chain() -> Result<()> {
        let hierarchy = Hierarchy::default();
        let mut store = MemoryStateStore::default();
        hierarchy.attach(&mut store, &account(1), &account(2), 0)?;
        hierarchy.attach(&mut store, &account(2), &account(3), 0)?;

        assert!(hierarchy.is_ancestor(&store, &account(1), &account(3))?);
        assert!(hierarchy.is_ancestor(&store, &account(2), &account(3))?);
        assert!(!hierarchy.is_ancestor(&store, &account(3), &account(1))?);

        Ok(())
    }
}
