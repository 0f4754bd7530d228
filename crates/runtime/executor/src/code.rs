//! Executor error codes.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Global status code of a batch processed by the executor.
///
/// `0` is success. Codes this crate does not know are preserved in
/// [`ExecutorErrorCode::Unknown`].
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum ExecutorErrorCode {
    /// The batch was processed.
    #[default]
    #[display("no error")]
    NoError,
    /// The executor's state database failed.
    #[display("database error")]
    DbError,
    /// The batch exceeded the step counter.
    #[display("main state machine steps counter overflow")]
    CountersOverflowSteps,
    /// The batch exceeded the keccak counter.
    #[display("keccak counter overflow")]
    CountersOverflowKeccak,
    /// The batch exceeded the binary counter.
    #[display("binary counter overflow")]
    CountersOverflowBinary,
    /// The batch exceeded the memory counter.
    #[display("memory counter overflow")]
    CountersOverflowMemory,
    /// The batch exceeded the arithmetic counter.
    #[display("arith counter overflow")]
    CountersOverflowArith,
    /// The batch exceeded the padding counter.
    #[display("padding counter overflow")]
    CountersOverflowPadding,
    /// The batch exceeded the poseidon counter.
    #[display("poseidon counter overflow")]
    CountersOverflowPoseidon,
    /// The requested fork id is not supported by the executor.
    #[display("unsupported fork id")]
    UnsupportedForkId,
    /// Sender balance check failed.
    #[display("balance mismatch")]
    BalanceMismatch,
    /// The batch payload could not be parsed by the executor.
    #[display("invalid batch l2 data")]
    InvalidBatchL2Data,
    /// L1 info root verification failed.
    #[display("invalid l1 info root")]
    InvalidL1InfoRoot,
    /// The old state root is unknown to the executor.
    #[display("invalid old state root")]
    InvalidOldStateRoot,
    /// A code without a known name.
    #[display("unknown executor error {_0}")]
    Unknown(u32),
}

impl ExecutorErrorCode {
    /// Returns the wire value of the code.
    pub const fn code(&self) -> u32 {
        match self {
            Self::NoError => 0,
            Self::DbError => 1,
            Self::CountersOverflowSteps => 2,
            Self::CountersOverflowKeccak => 3,
            Self::CountersOverflowBinary => 4,
            Self::CountersOverflowMemory => 5,
            Self::CountersOverflowArith => 6,
            Self::CountersOverflowPadding => 7,
            Self::CountersOverflowPoseidon => 8,
            Self::UnsupportedForkId => 9,
            Self::BalanceMismatch => 10,
            Self::InvalidBatchL2Data => 11,
            Self::InvalidL1InfoRoot => 12,
            Self::InvalidOldStateRoot => 13,
            Self::Unknown(code) => *code,
        }
    }

    /// Returns `true` if the code signals success.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::NoError)
    }
}

impl From<u32> for ExecutorErrorCode {
    fn from(code: u32) -> Self {
        match code {
            0 => Self::NoError,
            1 => Self::DbError,
            2 => Self::CountersOverflowSteps,
            3 => Self::CountersOverflowKeccak,
            4 => Self::CountersOverflowBinary,
            5 => Self::CountersOverflowMemory,
            6 => Self::CountersOverflowArith,
            7 => Self::CountersOverflowPadding,
            8 => Self::CountersOverflowPoseidon,
            9 => Self::UnsupportedForkId,
            10 => Self::BalanceMismatch,
            11 => Self::InvalidBatchL2Data,
            12 => Self::InvalidL1InfoRoot,
            13 => Self::InvalidOldStateRoot,
            other => Self::Unknown(other),
        }
    }
}

impl From<ExecutorErrorCode> for u32 {
    fn from(code: ExecutorErrorCode) -> Self {
        code.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, ExecutorErrorCode::NoError)]
    #[case(9, ExecutorErrorCode::UnsupportedForkId)]
    #[case(13, ExecutorErrorCode::InvalidOldStateRoot)]
    #[case(4242, ExecutorErrorCode::Unknown(4242))]
    fn test_code_mapping(#[case] raw: u32, #[case] expected: ExecutorErrorCode) {
        let code = ExecutorErrorCode::from(raw);
        assert_eq!(code, expected);
        assert_eq!(code.code(), raw);
    }

    #[test]
    fn test_only_zero_is_success() {
        assert!(ExecutorErrorCode::from(0).is_success());
        assert!(!ExecutorErrorCode::from(1).is_success());
        assert!(!ExecutorErrorCode::Unknown(99).is_success());
    }

    #[test]
    fn test_code_serde_as_number() {
        let code: ExecutorErrorCode = serde_json::from_str("11").unwrap();
        assert_eq!(code, ExecutorErrorCode::InvalidBatchL2Data);
        assert_eq!(serde_json::to_string(&code).unwrap(), "11");
    }
}
