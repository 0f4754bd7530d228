//! The storage query surface the debugger reads chain data through.

use crate::{DebugError, StorageError};
use alloy_primitives::B256;
use async_trait::async_trait;
use auto_impl::auto_impl;
use std::{fmt::Debug, future::Future};
use tokio_util::sync::CancellationToken;
use zkr_primitives::{Batch, L1Block, L1InfoTreeLeaf, L2Block, Receipt, VirtualBatch};

/// A consistent read view handed to every [`ChainStateReader`] call of one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Snapshot(pub u64);

/// Read access to persisted chain data.
///
/// Every read of a debug request goes through the same [`Snapshot`] so that they observe one
/// consistent state. Implementations never mutate chain data.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait ChainStateReader: Send + Sync + Debug {
    /// Opens a read snapshot.
    async fn snapshot(&self) -> Result<Snapshot, StorageError>;

    /// Returns the L2 block with the given number.
    async fn l2_block_by_number(
        &self,
        number: u64,
        snapshot: &Snapshot,
    ) -> Result<L2Block, StorageError>;

    /// Returns the batch containing the L2 block with the given number.
    async fn batch_by_l2_block_number(
        &self,
        number: u64,
        snapshot: &Snapshot,
    ) -> Result<Batch, StorageError>;

    /// Returns the batch with the given number.
    async fn batch_by_number(
        &self,
        batch_number: u64,
        snapshot: &Snapshot,
    ) -> Result<Batch, StorageError>;

    /// Returns the sequencing record of the batch with the given number.
    async fn virtual_batch(
        &self,
        batch_number: u64,
        snapshot: &Snapshot,
    ) -> Result<VirtualBatch, StorageError>;

    /// Returns the receipt of the transaction with the given hash.
    async fn receipt(&self, tx_hash: B256, snapshot: &Snapshot) -> Result<Receipt, StorageError>;

    /// Returns the number of the first L2 block of the batch.
    async fn first_l2_block_number_for_batch(
        &self,
        batch_number: u64,
        snapshot: &Snapshot,
    ) -> Result<u64, StorageError>;

    /// Returns the L1 block with the given number.
    async fn l1_block_by_number(
        &self,
        number: u64,
        snapshot: &Snapshot,
    ) -> Result<L1Block, StorageError>;

    /// Returns the L1 info tree leaf at the given index.
    async fn l1_info_tree_leaf(
        &self,
        index: u32,
        snapshot: &Snapshot,
    ) -> Result<L1InfoTreeLeaf, StorageError>;
}

/// Awaits a storage read unless `cancel` fires first.
pub(crate) async fn read<T, F>(cancel: &CancellationToken, read: F) -> Result<T, DebugError>
where
    F: Future<Output = Result<T, StorageError>>,
{
    if cancel.is_cancelled() {
        return Err(DebugError::Cancelled);
    }
    tokio::select! {
        biased;

        _ = cancel.cancelled() => Err(DebugError::Cancelled),
        result = read => result.map_err(Into::into),
    }
}
