use warrant_capability::{Capability, CapabilitySet};
use warrant_common::{Address, Word};
use warrant_storage::{StateStore, WarrantStorageError};

use crate::{AccountInfo, Hierarchy, KeySchema, Keys, WarrantAuthorityError, settle};

/// Whether an operation mutates the store or only validates.
///
/// `Check` runs every validation step an `Apply` would (including the full
/// subtree walk of a revoke) without writing a single slot, so a caller
/// can pre-flight a batch before letting irreversible mutations loose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Validate, then mutate.
    #[default]
    Apply,
    /// Validate only.
    Check,
}

/// The shape of an externally initiated transaction, as far as send
/// permissions are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// A transaction that calls or transfers.
    Call,
    /// A transaction that deploys a contract.
    ContractCreation,
}

/// The authorization state machine.
///
/// An [`Authority`] holds no state of its own beyond the storage keys it
/// addresses: every call reads what it needs from the [`StateStore`] and
/// writes its result back, so consecutive calls always observe each
/// other's effects and nothing is cached in between.
///
/// Validation always completes before the first write of a top-level call.
/// A cascading [`Authority::revoke`] is the exception that proves the rule:
/// it mutates descendants before their ancestors, and a failure deep in the
/// walk leaves the already-processed descendants mutated. Callers that need
/// all-or-nothing semantics run the call inside a store-level transaction
/// (for example a [`warrant_storage::StateOverlay`]) or pre-flight it with
/// [`Mode::Check`].
#[derive(Debug, Clone, Default)]
pub struct Authority {
    hierarchy: Hierarchy,
}

impl Authority {
    /// An authority storing its records under `schema`.
    pub fn new(schema: &KeySchema) -> Self {
        Self {
            hierarchy: Hierarchy::new(Keys::from(schema)),
        }
    }

    /// The delegation forest this authority maintains.
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    fn keys(&self) -> &Keys {
        self.hierarchy.keys()
    }

    /// The capability set held by `account`.
    pub fn capabilities<S>(
        &self,
        store: &S,
        account: &Address,
    ) -> Result<CapabilitySet, WarrantAuthorityError>
    where
        S: StateStore + ?Sized,
    {
        let word = store.get(account, &self.keys().auth);
        settle(store)?;
        Ok(CapabilitySet::from_word(&word))
    }

    /// True when `account` holds no capability at all.
    pub fn is_empty<S>(&self, store: &S, account: &Address) -> Result<bool, WarrantAuthorityError>
    where
        S: StateStore + ?Sized,
    {
        Ok(self.capabilities(store, account)?.is_empty())
    }

    /// The remaining one-shot transaction permissions of `account`.
    pub fn access_allowance<S>(
        &self,
        store: &S,
        account: &Address,
    ) -> Result<i64, WarrantAuthorityError>
    where
        S: StateStore + ?Sized,
    {
        let word = store.get(account, &self.keys().access_allowance);
        settle(store)?;
        word.to_i64().ok_or_else(|| {
            WarrantStorageError::Corrupt(format!("access allowance of {account} overflows")).into()
        })
    }

    /// Everything the store records about `account`.
    pub fn info<S>(&self, store: &S, account: &Address) -> Result<AccountInfo, WarrantAuthorityError>
    where
        S: StateStore + ?Sized,
    {
        let capabilities = self.capabilities(store, account)?;
        let link = self.hierarchy.parent(store, account)?;
        let info = AccountInfo {
            address: *account,
            description: capabilities.describe(),
            capabilities,
            access_allowance: self.access_allowance(store, account)?,
            child_count: self.hierarchy.child_count(store, account)?,
            parent: link.map(|link| link.parent).unwrap_or_default(),
            parent_index: link.map(|link| link.index).unwrap_or_default(),
            children: self.hierarchy.children(store, account)?.collect(),
        };
        settle(store)?;
        Ok(info)
    }

    /// Install `capabilities` on a parentless account without any permission
    /// check. This is how the privileged roots of the forest come to exist;
    /// it is meant for genesis or operator tooling, never for instructions
    /// arriving in transactions.
    pub fn bootstrap<S>(
        &self,
        store: &mut S,
        account: &Address,
        capabilities: &CapabilitySet,
    ) -> Result<(), WarrantAuthorityError>
    where
        S: StateStore + ?Sized,
    {
        if account.is_zero() {
            return Err(WarrantAuthorityError::InvalidArgument(
                "cannot bootstrap the zero address".into(),
            ));
        }
        if let Some(link) = self.hierarchy.parent(store, account)? {
            return Err(WarrantAuthorityError::InvalidArgument(format!(
                "{account} is already delegated by {}",
                link.parent
            )));
        }
        let mut held = self.capabilities(store, account)?;
        held.add([capabilities]);
        self.store_capabilities(store, account, &held)?;
        settle(store)?;

        tracing::info!(%account, capabilities = %held, "Bootstrapped account");
        Ok(())
    }

    /// Delegate `grant` from `from` to `to`.
    ///
    /// The first grant attaches `to` under `from`; after that only `from`
    /// (or a root account) may add to `to`'s capabilities. A non-root
    /// delegator must hold ADD_USER and every capability it hands out.
    pub fn grant<S>(
        &self,
        store: &mut S,
        from: &Address,
        to: &Address,
        grant: &CapabilitySet,
        mode: Mode,
    ) -> Result<(), WarrantAuthorityError>
    where
        S: StateStore + ?Sized,
    {
        if grant.is_empty() {
            tracing::warn!(%from, %to, "Grant rejected: empty capability set");
            return Err(WarrantAuthorityError::InvalidArgument(
                "cannot grant an empty capability set".into(),
            ));
        }
        if grant.to_word().is_none() {
            tracing::warn!(%from, %to, width = grant.width(), "Grant rejected: set too wide");
            return Err(WarrantAuthorityError::InvalidArgument(format!(
                "capability set of width {} cannot be stored",
                grant.width()
            )));
        }
        if from == to || to.is_zero() {
            tracing::warn!(%from, %to, "Grant rejected: invalid grantee");
            return Err(WarrantAuthorityError::InvalidArgument(format!(
                "{from} cannot grant to {to}"
            )));
        }

        let held = self.capabilities(store, from)?;
        let link = self.hierarchy.parent(store, to)?;

        if let Some(link) = link {
            if link.parent != *from && !held.is_root() {
                tracing::warn!(%from, %to, parent = %link.parent, "Grant rejected: not owner");
                return Err(WarrantAuthorityError::NotOwner {
                    account: *to,
                    parent: link.parent,
                    delegator: *from,
                });
            }
        }

        let mut required = CapabilitySet::from(Capability::ADD_USER);
        required.add([grant]);
        if !(held.is_root() || held.has_all([&required])) {
            tracing::warn!(%from, %to, %held, %grant, "Grant rejected: forbidden");
            return Err(WarrantAuthorityError::Forbidden {
                account: *from,
                held,
                required,
            });
        }

        if link.is_none() && self.hierarchy.is_ancestor(store, to, from)? {
            tracing::warn!(%from, %to, "Grant rejected: grantee is an ancestor of the delegator");
            return Err(WarrantAuthorityError::InvalidArgument(format!(
                "{to} is an ancestor of {from}"
            )));
        }
        settle(store)?;

        if mode == Mode::Check {
            return Ok(());
        }

        if link.is_none() {
            let index = self.hierarchy.child_count(store, from)?;
            self.hierarchy.attach(store, from, to, index)?;
        }

        let mut capabilities = self.capabilities(store, to)?;
        capabilities.add([grant]);
        self.store_capabilities(store, to, &capabilities)?;
        settle(store)?;

        tracing::debug!(%from, %to, %grant, held = %capabilities, "Granted capabilities");
        Ok(())
    }

    /// Remove `revoke` from `to` and, first, from every descendant of `to`.
    ///
    /// Descendants are processed depth-first in child-slot order before their
    /// ancestor. An account left without capabilities is detached from its
    /// parent. A failure part way through does not undo descendants that were
    /// already processed.
    pub fn revoke<S>(
        &self,
        store: &mut S,
        from: &Address,
        to: &Address,
        revoke: &CapabilitySet,
        mode: Mode,
    ) -> Result<(), WarrantAuthorityError>
    where
        S: StateStore + ?Sized,
    {
        if revoke.is_empty() {
            tracing::warn!(%from, %to, "Revoke rejected: empty capability set");
            return Err(WarrantAuthorityError::InvalidArgument(
                "cannot revoke an empty capability set".into(),
            ));
        }
        if revoke.to_word().is_none() {
            tracing::warn!(%from, %to, width = revoke.width(), "Revoke rejected: set too wide");
            return Err(WarrantAuthorityError::InvalidArgument(format!(
                "capability set of width {} cannot be stored",
                revoke.width()
            )));
        }

        let held = self.capabilities(store, from)?;
        let mut required = CapabilitySet::from(Capability::DEL_USER);
        required.add([revoke]);
        if !(held.is_root() || held.has_all([&required])) {
            tracing::warn!(%from, %to, %held, %revoke, "Revoke rejected: forbidden");
            return Err(WarrantAuthorityError::Forbidden {
                account: *from,
                held,
                required,
            });
        }

        self.revoke_subtree(store, from, to, revoke, mode)
    }

    /// Cascade a revoke whose permission was verified once, up front. The
    /// revoker may sit inside the subtree and lose its own DEL_USER along
    /// the way without affecting the nodes that follow.
    fn revoke_subtree<S>(
        &self,
        store: &mut S,
        from: &Address,
        to: &Address,
        revoke: &CapabilitySet,
        mode: Mode,
    ) -> Result<(), WarrantAuthorityError>
    where
        S: StateStore + ?Sized,
    {
        let children: Vec<Address> = self.hierarchy.children(store, to)?.collect();
        settle(store)?;
        for child in children {
            tracing::trace!(%from, parent = %to, %child, "Cascading revoke");
            self.revoke_subtree(store, from, &child, revoke, mode)?;
        }

        if mode == Mode::Check {
            return Ok(());
        }

        let mut capabilities = self.capabilities(store, to)?;
        capabilities.subtract([revoke]);
        self.store_capabilities(store, to, &capabilities)?;
        if capabilities.is_empty() {
            self.hierarchy.detach(store, to)?;
        }
        settle(store)?;

        tracing::debug!(%from, %to, %revoke, held = %capabilities, "Revoked capabilities");
        Ok(())
    }

    /// Add `delta` (which may be negative) to `to`'s access allowance.
    pub fn adjust_access_allowance<S>(
        &self,
        store: &mut S,
        from: &Address,
        to: &Address,
        delta: i64,
        mode: Mode,
    ) -> Result<(), WarrantAuthorityError>
    where
        S: StateStore + ?Sized,
    {
        if delta == 0 {
            tracing::warn!(%from, %to, "Allowance adjustment rejected: zero delta");
            return Err(WarrantAuthorityError::InvalidArgument(
                "access allowance delta must be non-zero".into(),
            ));
        }

        let held = self.capabilities(store, from)?;
        let required = CapabilitySet::from(Capability::ADJUST_ACCESS_ALLOWANCE);
        if !(held.is_root() || held.has_all([&required])) {
            tracing::warn!(%from, %to, %held, delta, "Allowance adjustment rejected: forbidden");
            return Err(WarrantAuthorityError::Forbidden {
                account: *from,
                held,
                required,
            });
        }

        let current = self.access_allowance(store, to)?;
        let adjusted = current.checked_add(delta).ok_or_else(|| {
            WarrantAuthorityError::InvalidArgument(format!(
                "access allowance of {to} overflows: {current} + {delta}"
            ))
        })?;
        settle(store)?;

        if mode == Mode::Check {
            return Ok(());
        }

        store.set(to, &self.keys().access_allowance, Word::from_i64(adjusted));
        settle(store)?;

        tracing::debug!(%from, %to, delta, allowance = adjusted, "Adjusted access allowance");
        Ok(())
    }

    /// Spend one unit of `account`'s access allowance for an externally
    /// initiated action. Accounts with standing SEND_TRANSACTION (or ROOT)
    /// never spend allowance, and an allowance that is not positive is left
    /// alone. Returns whether a unit was spent.
    pub fn consume_one_time_allowance<S>(
        &self,
        store: &mut S,
        account: &Address,
    ) -> Result<bool, WarrantAuthorityError>
    where
        S: StateStore + ?Sized,
    {
        let held = self.capabilities(store, account)?;
        if held.is_root() || held.contains(Capability::SEND_TRANSACTION) {
            return Ok(false);
        }

        let allowance = self.access_allowance(store, account)?;
        if allowance <= 0 {
            return Ok(false);
        }

        store.set(
            account,
            &self.keys().access_allowance,
            Word::from_i64(allowance - 1),
        );
        settle(store)?;

        tracing::debug!(%account, allowance = allowance - 1, "Consumed access allowance");
        Ok(true)
    }

    /// Decide whether `account` may send a transaction of `kind`.
    pub fn check_send_permission<S>(
        &self,
        store: &S,
        account: &Address,
        kind: TransactionKind,
    ) -> Result<(), WarrantAuthorityError>
    where
        S: StateStore + ?Sized,
    {
        let held = self.capabilities(store, account)?;
        if held.is_root() {
            return Ok(());
        }

        if kind == TransactionKind::ContractCreation && !held.contains(Capability::CREATE_CONTRACT)
        {
            tracing::warn!(%account, %held, "Contract creation rejected: forbidden");
            return Err(WarrantAuthorityError::Forbidden {
                account: *account,
                held,
                required: CapabilitySet::from(Capability::CREATE_CONTRACT),
            });
        }

        if !held.contains(Capability::SEND_TRANSACTION)
            && self.access_allowance(store, account)? <= 0
        {
            tracing::warn!(%account, %held, "Transaction rejected: no send permission or allowance");
            return Err(WarrantAuthorityError::Forbidden {
                account: *account,
                held,
                required: CapabilitySet::from(Capability::SEND_TRANSACTION),
            });
        }

        settle(store)
    }

    fn store_capabilities<S>(
        &self,
        store: &mut S,
        account: &Address,
        capabilities: &CapabilitySet,
    ) -> Result<(), WarrantAuthorityError>
    where
        S: StateStore + ?Sized,
    {
        let word = capabilities.to_word().ok_or_else(|| {
            WarrantAuthorityError::InvalidArgument(format!(
                "capability set of width {} cannot be stored",
                capabilities.width()
            ))
        })?;
        store.set(account, &self.keys().auth, word);
        Ok(())
    }
}
