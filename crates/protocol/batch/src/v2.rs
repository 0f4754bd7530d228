//! Block-structured batch payloads.
//!
//! From [`FORK_ID_ETROG`] on, a batch payload is a sequence of blocks, each introduced by a
//! change-L2-block header:
//!
//! +---------+----------------------------+
//! | Bytes   | Field                      |
//! +---------+----------------------------+
//! | 1       | Marker (`0x0b`)            |
//! | 4       | DeltaTimestamp (BE)        |
//! | 4       | IndexL1InfoTree (BE)       |
//! +---------+----------------------------+
//!
//! followed by the block's transactions, each carrying its effective percentage byte.
//!
//! [`FORK_ID_ETROG`]: zkr_primitives::FORK_ID_ETROG

use crate::{
    BatchCodecError, RawTransaction,
    tx::{decode_transaction, encode_transaction},
};
use alloy_primitives::Bytes;
use std::collections::BTreeSet;
use tracing::trace;

/// Marker byte introducing a change-L2-block header.
pub const CHANGE_L2_BLOCK_MARK: u8 = 0x0b;

/// Encoded length of a change-L2-block header, marker included.
pub const CHANGE_L2_BLOCK_LENGTH: usize = 1 + 4 + 4;

/// The block boundary pseudo-transaction of a block-structured batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeL2BlockHeader {
    /// Seconds elapsed since the previous L2 block.
    pub delta_timestamp: u32,
    /// L1 info tree leaf the block is anchored to. `0` keeps the previous anchor.
    pub index_l1_info_tree: u32,
}

impl ChangeL2BlockHeader {
    /// Creates a new [`ChangeL2BlockHeader`].
    pub const fn new(delta_timestamp: u32, index_l1_info_tree: u32) -> Self {
        Self { delta_timestamp, index_l1_info_tree }
    }

    /// Encodes the header, marker included.
    pub fn encode(&self) -> [u8; CHANGE_L2_BLOCK_LENGTH] {
        let mut out = [0u8; CHANGE_L2_BLOCK_LENGTH];
        out[0] = CHANGE_L2_BLOCK_MARK;
        out[1..5].copy_from_slice(&self.delta_timestamp.to_be_bytes());
        out[5..9].copy_from_slice(&self.index_l1_info_tree.to_be_bytes());
        out
    }

    /// Decodes the header starting at `pos`, marker included.
    fn decode_at(data: &[u8], pos: usize) -> Result<Self, BatchCodecError> {
        let header = data
            .get(pos..pos + CHANGE_L2_BLOCK_LENGTH)
            .ok_or(BatchCodecError::BlockHeaderTruncated(pos))?;
        let mut delta = [0u8; 4];
        let mut index = [0u8; 4];
        delta.copy_from_slice(&header[1..5]);
        index.copy_from_slice(&header[5..9]);
        Ok(Self::new(u32::from_be_bytes(delta), u32::from_be_bytes(index)))
    }
}

/// Builds the encoded change-L2-block pseudo-transaction.
pub fn build_change_l2_block(delta_timestamp: u32, index_l1_info_tree: u32) -> Bytes {
    Bytes::copy_from_slice(&ChangeL2BlockHeader::new(delta_timestamp, index_l1_info_tree).encode())
}

/// One block of a decoded batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawL2Block {
    /// The block's change-L2-block header.
    pub header: ChangeL2BlockHeader,
    /// The block's transactions.
    pub transactions: Vec<RawTransaction>,
}

/// Decoded view of a block-structured batch payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBatch {
    /// Blocks, in payload order.
    pub blocks: Vec<RawL2Block>,
}

impl RawBatch {
    /// Encodes the batch.
    pub fn encode(&self) -> Result<Bytes, BatchCodecError> {
        if self.blocks.is_empty() {
            return Err(BatchCodecError::EmptyBatch);
        }

        let mut out = Vec::new();
        for block in &self.blocks {
            out.extend_from_slice(&block.header.encode());
            for raw in &block.transactions {
                encode_transaction(&mut out, &raw.tx, Some(raw.efficiency_percentage));
            }
        }
        Ok(out.into())
    }

    /// Decodes a block-structured payload.
    ///
    /// An empty payload decodes to a batch without blocks.
    pub fn decode(data: &[u8]) -> Result<Self, BatchCodecError> {
        let mut blocks: Vec<RawL2Block> = Vec::new();
        let mut pos = 0;
        while pos < data.len() {
            if data[pos] == CHANGE_L2_BLOCK_MARK {
                let header = ChangeL2BlockHeader::decode_at(data, pos)?;
                trace!(
                    target: "batch_codec",
                    position = pos,
                    delta_timestamp = header.delta_timestamp,
                    index_l1_info_tree = header.index_l1_info_tree,
                    "Decoded change l2 block"
                );
                blocks.push(RawL2Block { header, transactions: Vec::new() });
                pos += CHANGE_L2_BLOCK_LENGTH;
                continue;
            }

            let (raw, next) = decode_transaction(data, pos, true)?;
            let Some(block) = blocks.last_mut() else {
                return Err(BatchCodecError::MissingChangeL2Block);
            };
            block.transactions.push(raw);
            pos = next;
        }
        Ok(Self { blocks })
    }

    /// Returns the distinct L1 info tree indices referenced by the batch's blocks.
    pub fn l1_info_tree_indices(&self) -> BTreeSet<u32> {
        self.blocks.iter().map(|block| block.header.index_l1_info_tree).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes};
    use zkr_primitives::test_utils::legacy_tx;

    fn raw(nonce: u64, percentage: u8) -> RawTransaction {
        let to = address!("0x617b3a3528f9cdd6630fd3301b9c8911f7bf063d");
        RawTransaction::new(legacy_tx(nonce, Some(to), bytes!("70a08231"), Some(195)), percentage)
    }

    #[test]
    fn test_change_l2_block_layout() {
        let encoded = build_change_l2_block(0x0102_0304, 7);
        assert_eq!(encoded, bytes!("0b0102030400000007"));
    }

    #[test]
    fn test_batch_roundtrip() {
        let batch = RawBatch {
            blocks: vec![
                RawL2Block {
                    header: ChangeL2BlockHeader::new(12, 3),
                    transactions: vec![raw(0, 255), raw(1, 200)],
                },
                RawL2Block { header: ChangeL2BlockHeader::new(2, 0), transactions: vec![] },
                RawL2Block {
                    header: ChangeL2BlockHeader::new(5, 9),
                    transactions: vec![raw(2, 100)],
                },
            ],
        };

        let decoded = RawBatch::decode(&batch.encode().unwrap()).unwrap();
        assert_eq!(decoded, batch);
        assert_eq!(decoded.l1_info_tree_indices().into_iter().collect::<Vec<_>>(), vec![0, 3, 9]);
    }

    #[test]
    fn test_decode_empty_payload() {
        assert_eq!(RawBatch::decode(&[]).unwrap(), RawBatch::default());
    }

    #[test]
    fn test_encode_empty_batch() {
        assert_eq!(RawBatch::default().encode().unwrap_err(), BatchCodecError::EmptyBatch);
    }

    #[test]
    fn test_decode_without_change_l2_block() {
        let mut out = Vec::new();
        encode_transaction(&mut out, &raw(0, 255).tx, Some(255));
        assert_eq!(RawBatch::decode(&out).unwrap_err(), BatchCodecError::MissingChangeL2Block);
    }

    #[test]
    fn test_decode_garbage_without_change_l2_block() {
        let err = RawBatch::decode(&[0xc5, 0x01]).unwrap_err();
        assert!(err.is_invalid_data());
    }

    #[test]
    fn test_decode_truncated_header() {
        let err = RawBatch::decode(&[CHANGE_L2_BLOCK_MARK, 0, 0, 0]).unwrap_err();
        assert_eq!(err, BatchCodecError::BlockHeaderTruncated(0));
    }
}
