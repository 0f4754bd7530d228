//! Error types for block debugging.

use alloy_primitives::B256;
use thiserror::Error;
use zkr_batch::BatchCodecError;
use zkr_executor::{AdapterError, ExecutorClientError, ExecutorErrorCode, ReconcileError};
use zkr_tracers::TracerError;

/// A failure of a [`ChainStateReader`](crate::ChainStateReader).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The requested entity is not stored.
    #[error(transparent)]
    NotFound(#[from] EntryNotFoundError),
    /// The backend failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Names the entity a lookup did not find.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryNotFoundError {
    /// No L2 block with the number.
    #[error("l2 block {0} not found")]
    L2Block(u64),
    /// No batch with the number.
    #[error("batch {0} not found")]
    Batch(u64),
    /// No batch contains the L2 block.
    #[error("no batch contains l2 block {0}")]
    BatchForL2Block(u64),
    /// No virtual batch with the number.
    #[error("virtual batch {0} not found")]
    VirtualBatch(u64),
    /// No receipt for the transaction.
    #[error("receipt for transaction {0} not found")]
    Receipt(B256),
    /// No L1 block with the number.
    #[error("l1 block {0} not found")]
    L1Block(u64),
    /// No L1 info tree leaf at the index.
    #[error("l1 info tree leaf {0} not found")]
    L1InfoTreeLeaf(u32),
}

/// The reasons [`BlockDebugger::debug_block`](crate::BlockDebugger::debug_block) fails.
///
/// Every variant is terminal for the request.
#[derive(Debug, Error)]
pub enum DebugError {
    /// A block, batch, receipt or anchor is missing.
    #[error(transparent)]
    NotFound(EntryNotFoundError),
    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(String),
    /// The batch payload is structurally invalid.
    #[error("malformed batch: {0}")]
    MalformedBatch(BatchCodecError),
    /// The inputs to the batch codec or the request are inconsistent.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The block is not part of the batch payload the storage associates it with.
    #[error("block index {index} out of range for batch {batch_number} with {blocks} blocks")]
    IndexOutOfRange {
        /// Batch the block was looked up in.
        batch_number: u64,
        /// Computed position of the block inside the batch.
        index: u64,
        /// Number of blocks decoded from the batch payload.
        blocks: usize,
    },
    /// No configured fork interval covers the batch.
    #[error("no fork id configured for batch {0}")]
    UnknownFork(u64),
    /// The executor could not be reached.
    #[error("executor unavailable: {0}")]
    ExecutorUnavailable(ExecutorClientError),
    /// The executor rejected the batch.
    #[error("executor failed: {0}")]
    ExecutionFailed(ExecutorErrorCode),
    /// The executor returned a different number of results than the block has transactions.
    #[error("executor returned {actual} results for {expected} transactions")]
    ResultCountMismatch {
        /// Number of transactions in the block.
        expected: usize,
        /// Number of results returned.
        actual: usize,
    },
    /// A transaction signature does not recover to a sender.
    #[error("failed to recover sender of {tx_hash}: {reason}")]
    SenderRecoveryFailed {
        /// Hash of the transaction.
        tx_hash: B256,
        /// Recovery error.
        reason: String,
    },
    /// The gas price of an instrumentation context is not a decimal number.
    #[error("failed to parse gas price {0:?}")]
    GasPriceParseFailed(String),
    /// The configured tracer could not be built.
    #[error("failed to build tracer: {0}")]
    TracerConstructionFailed(TracerError),
    /// A tracer failed while producing its trace.
    #[error("tracer failed: {0}")]
    Trace(TracerError),
    /// The request was cancelled.
    #[error("debug request cancelled")]
    Cancelled,
}

impl From<StorageError> for DebugError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(entry) => Self::NotFound(entry),
            StorageError::Backend(reason) => Self::Storage(reason),
        }
    }
}

impl From<BatchCodecError> for DebugError {
    fn from(err: BatchCodecError) -> Self {
        match err {
            BatchCodecError::LengthMismatch { .. } | BatchCodecError::EmptyBatch => {
                Self::InvalidInput(err.to_string())
            }
            err => Self::MalformedBatch(err),
        }
    }
}

impl From<AdapterError> for DebugError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::Unavailable(err) => Self::ExecutorUnavailable(err),
            AdapterError::ExecutionFailed(code) => Self::ExecutionFailed(code),
        }
    }
}

impl From<ReconcileError> for DebugError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::CountMismatch { expected, actual } => {
                Self::ResultCountMismatch { expected, actual }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_errors_split_into_input_and_malformed() {
        let err = DebugError::from(BatchCodecError::LengthMismatch { transactions: 2, percentages: 1 });
        assert!(matches!(err, DebugError::InvalidInput(_)));

        let err = DebugError::from(BatchCodecError::MissingChangeL2Block);
        assert!(matches!(err, DebugError::MalformedBatch(BatchCodecError::MissingChangeL2Block)));
    }

    #[test]
    fn test_storage_not_found_is_not_found() {
        let err = DebugError::from(StorageError::NotFound(EntryNotFoundError::Batch(3)));
        assert!(matches!(err, DebugError::NotFound(EntryNotFoundError::Batch(3))));
        assert_eq!(err.to_string(), "batch 3 not found");
    }
}
