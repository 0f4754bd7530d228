//! L1 anchoring types.

use alloy_primitives::B256;
use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An L1 block header summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L1Block {
    /// Block number.
    pub number: u64,
    /// Block hash.
    pub hash: B256,
    /// Parent block hash.
    pub parent_hash: B256,
    /// Block timestamp, in seconds.
    pub timestamp: u64,
}

/// A leaf of the L1 info tree, as synchronized from L1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L1InfoTreeLeaf {
    /// Position of the leaf in the tree.
    pub index: u32,
    /// Global exit root stored in the leaf.
    pub global_exit_root: B256,
    /// Hash of the L1 block preceding the one that produced the leaf.
    pub previous_block_hash: B256,
    /// Timestamp of the L1 block that produced the leaf.
    pub timestamp: u64,
    /// Root of the L1 info tree once the leaf is appended.
    pub l1_info_root: B256,
}

/// L1 anchor data an L2 block was sequenced against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Constructor, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L1Data {
    /// Global exit root.
    pub global_exit_root: B256,
    /// L1 block hash.
    pub block_hash_l1: B256,
    /// Minimum timestamp the L2 block may carry.
    pub min_timestamp: u64,
}

impl From<&L1InfoTreeLeaf> for L1Data {
    fn from(leaf: &L1InfoTreeLeaf) -> Self {
        Self::new(leaf.global_exit_root, leaf.previous_block_hash, leaf.timestamp)
    }
}

/// L1 info tree index to anchor data.
pub type L1InfoTreeData = BTreeMap<u32, L1Data>;
