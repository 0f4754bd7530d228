#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod block;
pub use block::{L2Block, L2Transaction};

mod batch;
pub use batch::{Batch, VirtualBatch};

mod receipt;
pub use receipt::Receipt;

mod l1;
pub use l1::{L1Block, L1Data, L1InfoTreeData, L1InfoTreeLeaf};

mod fork;
pub use fork::{FORK_ID_DRAGONFRUIT, FORK_ID_ETROG, ForkIdInterval, ForkIdIntervals};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
