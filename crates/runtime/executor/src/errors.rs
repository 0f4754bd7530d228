//! Error types for the executor crate.

use crate::ExecutorErrorCode;
use thiserror::Error;

/// Transport-level failure talking to the executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorClientError {
    /// The executor could not be reached or the connection broke mid-call.
    #[error("executor transport error: {0}")]
    Transport(String),
    /// The executor answered with a payload that could not be read.
    #[error("invalid executor response: {0}")]
    InvalidResponse(String),
}

/// Failure of a single executor round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// The executor did not produce a response.
    #[error(transparent)]
    Unavailable(#[from] ExecutorClientError),
    /// The executor processed the request and reported an error code.
    #[error("executor failed: {0}")]
    ExecutionFailed(ExecutorErrorCode),
}

/// Failure flattening an executor response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The response does not carry one result per transaction of the block.
    #[error("executor returned {actual} transaction results, block has {expected}")]
    CountMismatch {
        /// Number of transactions in the block.
        expected: usize,
        /// Number of transaction responses returned by the executor.
        actual: usize,
    },
}
