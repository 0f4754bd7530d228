//! Recovery of the L1 data a block is anchored to.

use crate::{ChainStateReader, DebugError, Snapshot, storage::read};
use alloy_primitives::B256;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use zkr_batch::RawBatch;
use zkr_primitives::{L1Data, L1InfoTreeData};

/// Resolves block positions and L1 anchors through a [`ChainStateReader`].
#[derive(Debug)]
pub struct AnchorResolver<'a, S> {
    storage: &'a S,
    snapshot: Snapshot,
    cancel: &'a CancellationToken,
}

impl<'a, S> AnchorResolver<'a, S>
where
    S: ChainStateReader,
{
    /// Creates a new [`AnchorResolver`] reading through `snapshot`.
    pub const fn new(storage: &'a S, snapshot: Snapshot, cancel: &'a CancellationToken) -> Self {
        Self { storage, snapshot, cancel }
    }

    /// Returns the position of `block_number` among the `blocks` blocks decoded from batch
    /// `batch_number`.
    pub async fn resolve_first_block_index(
        &self,
        batch_number: u64,
        block_number: u64,
        blocks: usize,
    ) -> Result<usize, DebugError> {
        let first = read(
            self.cancel,
            self.storage.first_l2_block_number_for_batch(batch_number, &self.snapshot),
        )
        .await?;
        let index = block_number.checked_sub(first).ok_or_else(|| {
            DebugError::InvalidInput(format!(
                "block {block_number} precedes the first block {first} of batch {batch_number}"
            ))
        })?;
        if index >= blocks as u64 {
            return Err(DebugError::IndexOutOfRange { batch_number, index, blocks });
        }
        Ok(index as usize)
    }

    /// Collects the L1 data of every L1 info tree index `payload` references.
    ///
    /// Index `0` carries no new anchor, so a payload referencing nothing else yields an empty
    /// map.
    pub async fn resolve_anchor_data(&self, payload: &[u8]) -> Result<L1InfoTreeData, DebugError> {
        let batch = RawBatch::decode(payload)?;
        let mut data = L1InfoTreeData::new();
        for index in batch.l1_info_tree_indices().into_iter().filter(|index| *index != 0) {
            let leaf =
                read(self.cancel, self.storage.l1_info_tree_leaf(index, &self.snapshot)).await?;
            debug!(
                target: "debug_block",
                index,
                global_exit_root = %leaf.global_exit_root,
                "Resolved l1 info tree leaf"
            );
            data.insert(index, L1Data::from(&leaf));
        }
        Ok(data)
    }

    /// Returns the hash of the L1 block batch `batch_number` was sequenced in.
    pub async fn resolve_forced_blockhash(&self, batch_number: u64) -> Result<B256, DebugError> {
        let virtual_batch =
            read(self.cancel, self.storage.virtual_batch(batch_number, &self.snapshot)).await?;
        let block = read(
            self.cancel,
            self.storage.l1_block_by_number(virtual_batch.l1_block_number, &self.snapshot),
        )
        .await?;
        Ok(block.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntryNotFoundError, InMemoryChainState};
    use zkr_batch::build_change_l2_block;
    use zkr_primitives::{L1Block, L1InfoTreeLeaf, VirtualBatch};

    fn state() -> InMemoryChainState {
        let mut state = InMemoryChainState::default();
        for number in 10..13 {
            state.block_batches.insert(number, 3);
        }
        state.l1_info_tree.insert(
            4,
            L1InfoTreeLeaf {
                index: 4,
                global_exit_root: B256::repeat_byte(0x44),
                previous_block_hash: B256::repeat_byte(0x45),
                timestamp: 1_700_000_000,
                ..Default::default()
            },
        );
        state.virtual_batches.insert(3, VirtualBatch { l1_block_number: 77, ..Default::default() });
        state
            .l1_blocks
            .insert(77, L1Block { number: 77, hash: B256::repeat_byte(0x77), ..Default::default() });
        state
    }

    #[tokio::test]
    async fn test_block_index_inside_batch() {
        let state = state();
        let cancel = CancellationToken::new();
        let resolver = AnchorResolver::new(&state, Snapshot::default(), &cancel);
        assert_eq!(resolver.resolve_first_block_index(3, 12, 3).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_block_index_out_of_range() {
        let state = state();
        let cancel = CancellationToken::new();
        let resolver = AnchorResolver::new(&state, Snapshot::default(), &cancel);
        let err = resolver.resolve_first_block_index(3, 12, 2).await.unwrap_err();
        assert!(matches!(err, DebugError::IndexOutOfRange { batch_number: 3, index: 2, blocks: 2 }));
    }

    #[tokio::test]
    async fn test_anchor_data_skips_index_zero() {
        let state = state();
        let cancel = CancellationToken::new();
        let resolver = AnchorResolver::new(&state, Snapshot::default(), &cancel);

        let data = resolver.resolve_anchor_data(&build_change_l2_block(2, 0)).await.unwrap();
        assert!(data.is_empty());

        let data = resolver.resolve_anchor_data(&build_change_l2_block(2, 4)).await.unwrap();
        assert_eq!(
            data.get(&4),
            Some(&L1Data::new(B256::repeat_byte(0x44), B256::repeat_byte(0x45), 1_700_000_000))
        );
    }

    #[tokio::test]
    async fn test_anchor_data_missing_leaf() {
        let state = state();
        let cancel = CancellationToken::new();
        let resolver = AnchorResolver::new(&state, Snapshot::default(), &cancel);
        let err = resolver.resolve_anchor_data(&build_change_l2_block(2, 9)).await.unwrap_err();
        assert!(matches!(err, DebugError::NotFound(EntryNotFoundError::L1InfoTreeLeaf(9))));
    }

    #[tokio::test]
    async fn test_forced_blockhash_and_cancellation() {
        let state = state();
        let cancel = CancellationToken::new();
        let resolver = AnchorResolver::new(&state, Snapshot::default(), &cancel);
        assert_eq!(resolver.resolve_forced_blockhash(3).await.unwrap(), B256::repeat_byte(0x77));

        cancel.cancel();
        let err = resolver.resolve_forced_blockhash(3).await.unwrap_err();
        assert!(matches!(err, DebugError::Cancelled));
    }
}
