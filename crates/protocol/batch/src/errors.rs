//! Error types for the batch codec.

use thiserror::Error;

/// An error raised while encoding or decoding a batch payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchCodecError {
    /// The transaction and effective percentage sequences differ in length.
    #[error("{transactions} transactions but {percentages} effective percentages")]
    LengthMismatch {
        /// Number of transactions.
        transactions: usize,
        /// Number of effective percentages.
        percentages: usize,
    },
    /// The payload ends before the item starting at `position` is complete.
    #[error("invalid data at position {position}")]
    InvalidData {
        /// Offset of the item being decoded.
        position: usize,
    },
    /// The RLP section of a transaction is malformed.
    #[error("invalid transaction rlp: {0}")]
    Rlp(alloy_rlp::Error),
    /// The signature `v` byte is neither 27 nor 28.
    #[error("invalid signature v value {0}")]
    InvalidSignature(u8),
    /// A change-L2-block header is cut short.
    #[error("change l2 block header truncated at position {0}")]
    BlockHeaderTruncated(usize),
    /// A block-structured payload starts with a transaction.
    #[error("batch v2 does not start with a change l2 block")]
    MissingChangeL2Block,
    /// A block-structured batch without blocks was passed to the encoder.
    #[error("batch v2 has no blocks")]
    EmptyBatch,
    /// The nominal or the effective gas price is zero.
    #[error("gas price or effective gas price is empty")]
    EffectivePercentageEmpty,
}

impl BatchCodecError {
    /// Returns `true` if the error only signals that the payload ran out of data.
    pub const fn is_invalid_data(&self) -> bool {
        matches!(self, Self::InvalidData { .. })
    }
}

impl From<alloy_rlp::Error> for BatchCodecError {
    fn from(err: alloy_rlp::Error) -> Self {
        Self::Rlp(err)
    }
}
