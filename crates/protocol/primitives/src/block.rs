//! L2 block and transaction types.

use alloy_consensus::{Signed, TxLegacy};
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// A signed L2 transaction.
///
/// The zkEVM batch format only carries legacy (pre-typed) transactions, optionally protected
/// by an EIP-155 chain id.
pub type L2Transaction = Signed<TxLegacy>;

/// A persisted L2 block.
///
/// Blocks are immutable once stored; the debug engine only ever reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2Block {
    /// Block number.
    pub number: u64,
    /// Block hash.
    pub hash: B256,
    /// Parent block hash.
    pub parent_hash: B256,
    /// Block timestamp, in seconds.
    pub timestamp: u64,
    /// Sequencer coinbase.
    pub coinbase: Address,
    /// State root after the block's transactions are applied.
    pub state_root: B256,
    /// Ordered transactions.
    pub transactions: Vec<L2Transaction>,
}

impl L2Block {
    /// Returns the number of transactions in the block.
    pub const fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Returns the hashes of the block's transactions, in order.
    pub fn transaction_hashes(&self) -> Vec<B256> {
        self.transactions.iter().map(|tx| *tx.hash()).collect()
    }
}
