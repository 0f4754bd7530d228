//! A [`ChainStateReader`] over chain data held in memory.

use crate::{ChainStateReader, EntryNotFoundError, Snapshot, StorageError};
use alloy_primitives::B256;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use zkr_primitives::{Batch, L1Block, L1InfoTreeLeaf, L2Block, Receipt, VirtualBatch};

/// Chain data held in memory, as loaded from a recorded fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InMemoryChainState {
    /// L2 blocks, by number.
    pub l2_blocks: BTreeMap<u64, L2Block>,
    /// Batches, by number.
    pub batches: BTreeMap<u64, Batch>,
    /// Batch number of every L2 block.
    pub block_batches: BTreeMap<u64, u64>,
    /// Virtual batches, by batch number.
    pub virtual_batches: BTreeMap<u64, VirtualBatch>,
    /// Receipts, by transaction hash.
    pub receipts: BTreeMap<B256, Receipt>,
    /// L1 blocks, by number.
    pub l1_blocks: BTreeMap<u64, L1Block>,
    /// L1 info tree leaves, by index.
    pub l1_info_tree: BTreeMap<u32, L1InfoTreeLeaf>,
}

impl InMemoryChainState {
    /// Stores `block` as part of batch `batch_number`.
    pub fn insert_l2_block(&mut self, batch_number: u64, block: L2Block) {
        self.block_batches.insert(block.number, batch_number);
        self.l2_blocks.insert(block.number, block);
    }

    /// Stores `batch`.
    pub fn insert_batch(&mut self, batch: Batch) {
        self.batches.insert(batch.batch_number, batch);
    }

    /// Stores `receipt`.
    pub fn insert_receipt(&mut self, receipt: Receipt) {
        self.receipts.insert(receipt.tx_hash, receipt);
    }
}

#[async_trait]
impl ChainStateReader for InMemoryChainState {
    async fn snapshot(&self) -> Result<Snapshot, StorageError> {
        Ok(Snapshot::default())
    }

    async fn l2_block_by_number(&self, number: u64, _: &Snapshot) -> Result<L2Block, StorageError> {
        self.l2_blocks.get(&number).cloned().ok_or(EntryNotFoundError::L2Block(number).into())
    }

    async fn batch_by_l2_block_number(
        &self,
        number: u64,
        snapshot: &Snapshot,
    ) -> Result<Batch, StorageError> {
        let batch_number = self
            .block_batches
            .get(&number)
            .ok_or(EntryNotFoundError::BatchForL2Block(number))?;
        self.batch_by_number(*batch_number, snapshot).await
    }

    async fn batch_by_number(&self, batch_number: u64, _: &Snapshot) -> Result<Batch, StorageError> {
        self.batches.get(&batch_number).cloned().ok_or(EntryNotFoundError::Batch(batch_number).into())
    }

    async fn virtual_batch(
        &self,
        batch_number: u64,
        _: &Snapshot,
    ) -> Result<VirtualBatch, StorageError> {
        self.virtual_batches
            .get(&batch_number)
            .cloned()
            .ok_or(EntryNotFoundError::VirtualBatch(batch_number).into())
    }

    async fn receipt(&self, tx_hash: B256, _: &Snapshot) -> Result<Receipt, StorageError> {
        self.receipts.get(&tx_hash).cloned().ok_or(EntryNotFoundError::Receipt(tx_hash).into())
    }

    async fn first_l2_block_number_for_batch(
        &self,
        batch_number: u64,
        _: &Snapshot,
    ) -> Result<u64, StorageError> {
        self.block_batches
            .iter()
            .find(|(_, batch)| **batch == batch_number)
            .map(|(number, _)| *number)
            .ok_or(EntryNotFoundError::Batch(batch_number).into())
    }

    async fn l1_block_by_number(&self, number: u64, _: &Snapshot) -> Result<L1Block, StorageError> {
        self.l1_blocks.get(&number).copied().ok_or(EntryNotFoundError::L1Block(number).into())
    }

    async fn l1_info_tree_leaf(
        &self,
        index: u32,
        _: &Snapshot,
    ) -> Result<L1InfoTreeLeaf, StorageError> {
        self.l1_info_tree
            .get(&index)
            .copied()
            .ok_or(EntryNotFoundError::L1InfoTreeLeaf(index).into())
    }
}
