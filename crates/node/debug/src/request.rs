//! Executor request construction for both protocol generations.

use crate::DebugConfig;
use alloy_primitives::{Address, B256, Bytes};
use zkr_batch::{BatchCodecError, build_change_l2_block, encode_transactions};
use zkr_executor::{BatchRequestBase, ProcessBatchRequestV1, ProcessBatchRequestV2};
use zkr_primitives::{Batch, L1InfoTreeData, L2Block};
use zkr_tracers::TraceConfig;

/// The stored data a request is built from.
#[derive(Debug, Clone, Copy)]
pub struct RequestInputs<'a> {
    /// The batch containing the block.
    pub batch: &'a Batch,
    /// The batch preceding it.
    pub previous_batch: &'a Batch,
    /// The block being debugged.
    pub block: &'a L2Block,
    /// The L2 block preceding it, whose state the block is replayed on.
    pub previous_block: &'a L2Block,
    /// Fork id of the batch.
    pub fork_id: u64,
}

/// How a v2 request anchors its block to L1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum L1Anchor {
    /// The first block of a network that started on the v2 protocol. Its L1 block hash is
    /// forced directly.
    Injected {
        /// Hash of the L1 block the batch was sequenced in.
        forced_blockhash_l1: B256,
    },
    /// The L1 info tree leaves referenced by the payload. Empty when it references none.
    InfoTree(L1InfoTreeData),
}

/// Builds executor requests from stored chain data.
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    config: &'a DebugConfig,
}

impl<'a> RequestBuilder<'a> {
    /// Creates a new [`RequestBuilder`].
    pub const fn new(config: &'a DebugConfig) -> Self {
        Self { config }
    }

    /// Returns the flat payload of the block's transactions.
    pub fn flat_payload(
        block: &L2Block,
        percentages: &[u8],
        fork_id: u64,
    ) -> Result<Bytes, BatchCodecError> {
        encode_transactions(&block.transactions, percentages, fork_id)
    }

    /// Returns the block's transactions behind a change-L2-block header.
    pub fn block_payload(
        block: &L2Block,
        delta_timestamp: u32,
        index_l1_info_tree: u32,
        percentages: &[u8],
        fork_id: u64,
    ) -> Result<Bytes, BatchCodecError> {
        let transactions = encode_transactions(&block.transactions, percentages, fork_id)?;
        let mut payload = build_change_l2_block(delta_timestamp, index_l1_info_tree).to_vec();
        payload.extend_from_slice(&transactions);
        Ok(payload.into())
    }

    /// Builds the fields both protocol generations share.
    ///
    /// Capture is maximal unless the default tracer is selected, in which case the caller's
    /// toggles narrow it.
    pub fn base(
        &self,
        inputs: &RequestInputs<'_>,
        batch_l2_data: Bytes,
        coinbase: Address,
        trace_config: &TraceConfig,
    ) -> BatchRequestBase {
        BatchRequestBase {
            old_batch_num: inputs.previous_batch.batch_number,
            old_state_root: inputs.previous_block.state_root,
            old_acc_input_hash: inputs.previous_batch.acc_input_hash,
            batch_l2_data,
            coinbase,
            chain_id: self.config.chain_id,
            fork_id: inputs.fork_id,
            trace_config: trace_config.capture_config(),
            context_id: new_context_id(),
        }
    }

    /// Builds a request for the pre-boundary executor.
    pub fn build_v1(
        &self,
        inputs: &RequestInputs<'_>,
        payload: Bytes,
        trace_config: &TraceConfig,
    ) -> ProcessBatchRequestV1 {
        ProcessBatchRequestV1 {
            base: self.base(inputs, payload, inputs.batch.coinbase, trace_config),
            global_exit_root: inputs.batch.global_exit_root,
            eth_timestamp: inputs.batch.timestamp,
        }
    }

    /// Builds a request for the post-boundary executor.
    ///
    /// Verification of the L1 info root is skipped whenever the request carries its own
    /// anchors, which were verified when the batch was first processed.
    pub fn build_v2(
        &self,
        inputs: &RequestInputs<'_>,
        payload: Bytes,
        anchor: L1Anchor,
        trace_config: &TraceConfig,
        timestamp_limit: u64,
    ) -> ProcessBatchRequestV2 {
        let (forced_blockhash_l1, l1_info_tree_data) = match anchor {
            L1Anchor::Injected { forced_blockhash_l1 } => {
                (Some(forced_blockhash_l1), L1InfoTreeData::new())
            }
            L1Anchor::InfoTree(data) => (None, data),
        };
        ProcessBatchRequestV2 {
            base: self.base(inputs, payload, inputs.block.coinbase, trace_config),
            l1_info_root: self.config.mock_l1_info_root,
            timestamp_limit,
            skip_first_change_l2_block: false,
            skip_write_block_info_root: true,
            skip_verify_l1_info_root: forced_blockhash_l1.is_some() || !l1_info_tree_data.is_empty(),
            forced_blockhash_l1,
            l1_info_tree_data,
        }
    }
}

/// Returns a fresh identifier correlating a request with the executor's logs.
fn new_context_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::bytes;
    use zkr_batch::{CHANGE_L2_BLOCK_MARK, RawBatch};
    use zkr_primitives::{FORK_ID_ETROG, L1Data, test_utils::legacy_tx};

    struct Fixtures {
        batch: Batch,
        previous_batch: Batch,
        block: L2Block,
        previous_block: L2Block,
    }

    impl Fixtures {
        fn inputs(&self) -> RequestInputs<'_> {
            RequestInputs {
                batch: &self.batch,
                previous_batch: &self.previous_batch,
                block: &self.block,
                previous_block: &self.previous_block,
                fork_id: FORK_ID_ETROG,
            }
        }
    }

    fn fixtures() -> Fixtures {
        let previous = Batch {
            batch_number: 9,
            acc_input_hash: B256::repeat_byte(0x09),
            state_root: B256::repeat_byte(0x19),
            ..Default::default()
        };
        let batch = Batch {
            batch_number: 10,
            coinbase: Address::repeat_byte(0xc0),
            global_exit_root: B256::repeat_byte(0xe0),
            timestamp: 1_700_000_100,
            ..Default::default()
        };
        let block = L2Block {
            number: 21,
            hash: B256::repeat_byte(0x21),
            parent_hash: B256::repeat_byte(0x20),
            timestamp: 1_700_000_105,
            coinbase: Address::repeat_byte(0xb0),
            state_root: B256::repeat_byte(0x31),
            transactions: vec![legacy_tx(
                0,
                Some(Address::repeat_byte(0x01)),
                bytes!("a9059cbb"),
                Some(1001),
            )],
        };
        let previous_block = L2Block {
            number: 20,
            hash: B256::repeat_byte(0x20),
            parent_hash: B256::repeat_byte(0x1f),
            timestamp: 1_700_000_100,
            coinbase: Address::repeat_byte(0xb0),
            state_root: B256::repeat_byte(0x30),
            transactions: Vec::new(),
        };
        Fixtures { batch, previous_batch: previous, block, previous_block }
    }

    #[test]
    fn test_v1_request_fields() {
        let fixtures = fixtures();
        let batch = &fixtures.batch;
        let config = DebugConfig { chain_id: 1001, ..Default::default() };
        let builder = RequestBuilder::new(&config);
        let inputs = RequestInputs { fork_id: 6, ..fixtures.inputs() };
        let payload = RequestBuilder::flat_payload(&fixtures.block, &[255], 6).unwrap();

        let request = builder.build_v1(&inputs, payload.clone(), &TraceConfig::default());
        assert_eq!(request.base.old_batch_num, 9);
        assert_eq!(request.base.old_state_root, B256::repeat_byte(0x30));
        assert_eq!(request.base.old_acc_input_hash, B256::repeat_byte(0x09));
        assert_eq!(request.base.batch_l2_data, payload);
        assert_eq!(request.base.coinbase, batch.coinbase);
        assert_eq!(request.base.chain_id, 1001);
        assert_eq!(request.base.fork_id, 6);
        assert_eq!(request.base.context_id.len(), 32);
        assert_eq!(request.global_exit_root, batch.global_exit_root);
        assert_eq!(request.eth_timestamp, batch.timestamp);
    }

    #[test]
    fn test_v2_block_payload_starts_with_change_l2_block() {
        let block = fixtures().block;
        let payload = RequestBuilder::block_payload(&block, 5, 3, &[200], FORK_ID_ETROG).unwrap();
        assert_eq!(payload[0], CHANGE_L2_BLOCK_MARK);

        let decoded = RawBatch::decode(&payload).unwrap();
        assert_eq!(decoded.blocks.len(), 1);
        assert_eq!(decoded.blocks[0].header.delta_timestamp, 5);
        assert_eq!(decoded.blocks[0].header.index_l1_info_tree, 3);
        assert_eq!(decoded.blocks[0].transactions[0].efficiency_percentage, 200);
    }

    #[test]
    fn test_v2_injected_block_forces_l1_blockhash() {
        let fixtures = fixtures();
        let config = DebugConfig::default();
        let builder = RequestBuilder::new(&config);
        let anchor = L1Anchor::Injected { forced_blockhash_l1: B256::repeat_byte(0x77) };

        let request = builder.build_v2(
            &fixtures.inputs(),
            Bytes::new(),
            anchor,
            &TraceConfig::default(),
            1_800_000_000,
        );
        assert_eq!(request.forced_blockhash_l1, Some(B256::repeat_byte(0x77)));
        assert!(request.l1_info_tree_data.is_empty());
        assert!(request.skip_verify_l1_info_root);
        assert_eq!(request.base.coinbase, fixtures.block.coinbase);
        assert_eq!(request.l1_info_root, config.mock_l1_info_root);
        assert_eq!(request.timestamp_limit, 1_800_000_000);
        assert!(!request.skip_first_change_l2_block);
        assert!(request.skip_write_block_info_root);
    }

    #[test]
    fn test_v2_anchor_data_controls_verification() {
        let fixtures = fixtures();
        let config = DebugConfig::default();
        let builder = RequestBuilder::new(&config);
        let inputs = fixtures.inputs();

        let request = builder.build_v2(
            &inputs,
            Bytes::new(),
            L1Anchor::InfoTree(L1InfoTreeData::new()),
            &TraceConfig::default(),
            0,
        );
        assert!(!request.skip_verify_l1_info_root);
        assert_eq!(request.forced_blockhash_l1, None);

        let data = L1InfoTreeData::from([(3, L1Data::default())]);
        let request = builder.build_v2(
            &inputs,
            Bytes::new(),
            L1Anchor::InfoTree(data.clone()),
            &TraceConfig::default(),
            0,
        );
        assert!(request.skip_verify_l1_info_root);
        assert_eq!(request.l1_info_tree_data, data);
    }

    #[test]
    fn test_non_default_tracer_gets_full_capture() {
        let fixtures = fixtures();
        let config = DebugConfig::default();
        let builder = RequestBuilder::new(&config);
        let trace_config = TraceConfig {
            tracer: Some("callTracer".to_string()),
            disable_storage: true,
            disable_stack: true,
            enable_memory: false,
            enable_return_data: false,
            ..Default::default()
        };
        let base = builder.base(
            &fixtures.inputs(),
            Bytes::new(),
            Address::ZERO,
            &trace_config,
        );
        assert!(base.trace_config.is_full());

        let base = builder.base(
            &fixtures.inputs(),
            Bytes::new(),
            Address::ZERO,
            &TraceConfig { tracer: None, ..trace_config },
        );
        assert!(base.trace_config.disable_storage);
        assert!(!base.trace_config.is_full());
    }
}
