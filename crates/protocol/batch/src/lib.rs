#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod errors;
pub use errors::BatchCodecError;

mod tx;
pub use tx::{RawTransaction, decode_transactions, encode_transactions};

mod v2;
pub use v2::{
    CHANGE_L2_BLOCK_LENGTH, CHANGE_L2_BLOCK_MARK, ChangeL2BlockHeader, RawBatch, RawL2Block,
    build_change_l2_block,
};

mod percentage;
pub use percentage::{MAX_EFFECTIVE_PERCENTAGE, effective_gas_price_percentage};
