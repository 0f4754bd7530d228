//! Fork identifiers.

use serde::{Deserialize, Serialize};

/// First fork whose batch payload carries the effective gas price percentage byte.
pub const FORK_ID_DRAGONFRUIT: u64 = 5;

/// First fork using the block-structured batch encoding and the v2 executor protocol.
pub const FORK_ID_ETROG: u64 = 7;

/// An inclusive batch-number range sharing one fork id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkIdInterval {
    /// First batch of the interval.
    pub from_batch: u64,
    /// Last batch of the interval.
    pub to_batch: u64,
    /// Fork id applied to the interval.
    pub fork_id: u64,
}

/// The ordered set of fork intervals of a network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForkIdIntervals(Vec<ForkIdInterval>);

impl ForkIdIntervals {
    /// Creates a new table from a list of intervals.
    pub const fn new(intervals: Vec<ForkIdInterval>) -> Self {
        Self(intervals)
    }

    /// Returns the fork id that applies to `batch_number`.
    ///
    /// Later intervals take precedence over earlier overlapping ones.
    pub fn fork_id_for_batch(&self, batch_number: u64) -> Option<u64> {
        self.0
            .iter()
            .rev()
            .find(|interval| (interval.from_batch..=interval.to_batch).contains(&batch_number))
            .map(|interval| interval.fork_id)
    }

    /// Returns `true` if no interval is configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
