//! Read-only state access for tracers.

use crate::StateViewError;
use alloy_primitives::{Address, B256, Bytes, U256};
use auto_impl::auto_impl;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Debug};

/// Account fields visible to tracers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountState {
    /// Balance in wei.
    pub balance: U256,
    /// Nonce.
    pub nonce: u64,
    /// Deployed code.
    pub code: Bytes,
}

/// [`StateView`] abstracts reading historical state by root.
///
/// Implementations never mutate state.
#[auto_impl(&, Box, Arc)]
pub trait StateView: Send + Sync + Debug {
    /// Returns the account at `address` under `root`, or `None` if it does not exist.
    fn account(&self, root: B256, address: Address) -> Result<Option<AccountState>, StateViewError>;

    /// Returns the storage value of `slot` under `root`. Missing slots read as zero.
    fn storage(&self, root: B256, address: Address, slot: B256) -> Result<B256, StateViewError>;
}

/// A [`StateView`] fixed to one state root.
#[derive(Debug, Clone, Copy)]
pub struct PinnedState<'a> {
    view: &'a dyn StateView,
    root: B256,
}

impl<'a> PinnedState<'a> {
    /// Pins `view` to `root`.
    pub const fn new(view: &'a dyn StateView, root: B256) -> Self {
        Self { view, root }
    }

    /// The pinned root.
    pub const fn root(&self) -> B256 {
        self.root
    }

    /// Returns the same view pinned to another root.
    pub const fn at(&self, root: B256) -> Self {
        Self { view: self.view, root }
    }

    /// Reads an account.
    pub fn account(&self, address: Address) -> Result<Option<AccountState>, StateViewError> {
        self.view.account(self.root, address)
    }

    /// Reads a storage slot.
    pub fn storage(&self, address: Address, slot: B256) -> Result<B256, StateViewError> {
        self.view.storage(self.root, address, slot)
    }
}

/// An account held by [`InMemoryStateView`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InMemoryAccount {
    /// Account fields.
    #[serde(flatten)]
    pub state: AccountState,
    /// Storage slots.
    pub storage: BTreeMap<B256, B256>,
}

/// A [`StateView`] over state snapshots held in memory, keyed by root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemoryStateView {
    roots: BTreeMap<B256, BTreeMap<Address, InMemoryAccount>>,
}

impl InMemoryStateView {
    /// Inserts or replaces the account at `address` under `root`.
    pub fn insert(&mut self, root: B256, address: Address, account: InMemoryAccount) {
        self.roots.entry(root).or_default().insert(address, account);
    }

    fn accounts(&self, root: B256) -> Result<&BTreeMap<Address, InMemoryAccount>, StateViewError> {
        self.roots.get(&root).ok_or(StateViewError::UnknownRoot(root))
    }
}

impl StateView for InMemoryStateView {
    fn account(&self, root: B256, address: Address) -> Result<Option<AccountState>, StateViewError> {
        Ok(self.accounts(root)?.get(&address).map(|account| account.state.clone()))
    }

    fn storage(&self, root: B256, address: Address, slot: B256) -> Result<B256, StateViewError> {
        Ok(self
            .accounts(root)?
            .get(&address)
            .and_then(|account| account.storage.get(&slot).copied())
            .unwrap_or_default())
    }
}
