//! Debugger configuration.

use alloy_primitives::{B256, b256};
use serde::{Deserialize, Serialize};
use zkr_primitives::{FORK_ID_ETROG, ForkIdIntervals};

/// L1 info root sent with every v2 request. The executor is told to skip its verification.
pub const MOCK_L1_INFO_ROOT: B256 =
    b256!("0x090bcaf734c4f06c93954a827b45a6e8c67b8e0fd1e0a35a1c5982d6961828f9");

/// Network parameters the debugger builds executor requests with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// L2 chain id.
    pub chain_id: u64,
    /// First fork id served by the v2 executor protocol.
    pub fork_boundary: u64,
    /// Fork id of every batch range.
    pub fork_intervals: ForkIdIntervals,
    /// L1 info root placed in v2 requests.
    pub mock_l1_info_root: B256,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            chain_id: 0,
            fork_boundary: FORK_ID_ETROG,
            fork_intervals: ForkIdIntervals::default(),
            mock_l1_info_root: MOCK_L1_INFO_ROOT,
        }
    }
}

impl DebugConfig {
    /// Returns the fork id of `batch_number`.
    pub fn fork_id_for_batch(&self, batch_number: u64) -> Option<u64> {
        self.fork_intervals.fork_id_for_batch(batch_number)
    }

    /// Returns `true` if `fork_id` is served by the v2 executor protocol.
    pub const fn is_v2(&self, fork_id: u64) -> bool {
        fork_id >= self.fork_boundary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_toml() {
        let raw = r#"
            chain_id = 1001
            fork_boundary = 8

            [[fork_intervals]]
            from_batch = 0
            to_batch = 10
            fork_id = 6

            [[fork_intervals]]
            from_batch = 11
            to_batch = 1000000
            fork_id = 8
        "#;
        let config: DebugConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.chain_id, 1001);
        assert_eq!(config.fork_id_for_batch(4), Some(6));
        assert_eq!(config.fork_id_for_batch(11), Some(8));
        assert!(!config.is_v2(7));
        assert!(config.is_v2(8));
        assert_eq!(config.mock_l1_info_root, MOCK_L1_INFO_ROOT);
    }

    #[test]
    fn test_default_boundary_is_etrog() {
        let config: DebugConfig = serde_json::from_str(r#"{"chain_id": 1}"#).unwrap();
        assert_eq!(config.fork_boundary, FORK_ID_ETROG);
        assert!(config.fork_intervals.is_empty());
    }
}
