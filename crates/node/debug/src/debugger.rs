//! The block debugging pipeline.

use crate::{
    AnchorResolver, ChainStateReader, DebugConfig, DebugError, L1Anchor, RequestBuilder,
    RequestInputs, Snapshot, TraceDispatcher, instrumentation_context, parse_gas_price,
    recover_sender, storage::read,
};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use zkr_batch::{
    BatchCodecError, MAX_EFFECTIVE_PERCENTAGE, RawBatch, RawTransaction, decode_transactions,
    effective_gas_price_percentage,
};
use zkr_executor::{
    EventLog, ExecutionResult, ExecutionServiceAdapter, ExecutorClient, ProcessBatchRequest,
    ProcessBatchRequestV2, TimedResponse, reconcile,
};
use zkr_primitives::{L2Transaction, Receipt};
use zkr_tracers::{StateView, TraceConfig, TracerContext};

/// Re-executes stored L2 blocks against the stateless executor and traces their
/// transactions.
#[derive(Debug)]
pub struct BlockDebugger<S, V, C, E> {
    config: DebugConfig,
    storage: S,
    state: V,
    adapter: ExecutionServiceAdapter<C, E>,
}

impl<S, V, C, E> BlockDebugger<S, V, C, E>
where
    S: ChainStateReader,
    V: StateView,
    C: ExecutorClient,
    E: EventLog,
{
    /// Creates a new [`BlockDebugger`].
    ///
    /// `state` serves the account reads of replayed tracers; `event_log` records executor
    /// failures.
    pub fn new(config: DebugConfig, storage: S, state: V, client: C, event_log: E) -> Self {
        #[cfg(feature = "metrics")]
        crate::Metrics::init(config.chain_id);

        Self { config, storage, state, adapter: ExecutionServiceAdapter::new(client, event_log) }
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &DebugConfig {
        &self.config
    }

    /// Replays block `block_number` and returns one traced result per transaction, in
    /// transaction order.
    ///
    /// Fails as a whole on the first error, including cancellation through `cancel`.
    pub async fn debug_block(
        &self,
        block_number: u64,
        trace_config: &TraceConfig,
        cancel: CancellationToken,
    ) -> Result<Vec<ExecutionResult>, DebugError> {
        info!(
            target: "debug_block",
            block_number,
            tracer = trace_config.kind().label(),
            "Debugging block"
        );
        let outcome = self.trace_block(block_number, trace_config, &cancel).await;

        #[cfg(feature = "metrics")]
        crate::Metrics::record_outcome(self.config.chain_id, outcome.is_ok());

        match &outcome {
            Ok(results) => {
                info!(target: "debug_block", block_number, transactions = results.len(), "Traced block")
            }
            Err(err) => warn!(target: "debug_block", block_number, %err, "Failed to debug block"),
        }
        outcome
    }

    async fn trace_block(
        &self,
        block_number: u64,
        trace_config: &TraceConfig,
        cancel: &CancellationToken,
    ) -> Result<Vec<ExecutionResult>, DebugError> {
        let snapshot = read(cancel, self.storage.snapshot()).await?;
        let block = read(cancel, self.storage.l2_block_by_number(block_number, &snapshot)).await?;
        // The genesis block is its own predecessor.
        let previous_block = read(
            cancel,
            self.storage.l2_block_by_number(block_number.saturating_sub(1), &snapshot),
        )
        .await?;
        let batch =
            read(cancel, self.storage.batch_by_l2_block_number(block_number, &snapshot)).await?;
        let previous_number = batch.batch_number.checked_sub(1).ok_or_else(|| {
            DebugError::InvalidInput(format!("batch {} has no predecessor", batch.batch_number))
        })?;
        let previous_batch =
            read(cancel, self.storage.batch_by_number(previous_number, &snapshot)).await?;
        let fork_id = self
            .config
            .fork_id_for_batch(batch.batch_number)
            .ok_or(DebugError::UnknownFork(batch.batch_number))?;

        let mut receipts = Vec::with_capacity(block.transaction_count());
        for tx in &block.transactions {
            receipts.push(read(cancel, self.storage.receipt(*tx.hash(), &snapshot)).await?);
        }
        let percentages = block
            .transactions
            .iter()
            .zip(&receipts)
            .map(|(tx, receipt)| effective_percentage(tx, receipt))
            .collect::<Result<Vec<_>, _>>()?;

        let inputs = RequestInputs {
            batch: &batch,
            previous_batch: &previous_batch,
            block: &block,
            previous_block: &previous_block,
            fork_id,
        };
        let request = if self.config.is_v2(fork_id) {
            let request =
                self.build_v2_request(&inputs, &percentages, trace_config, &snapshot, cancel).await?;
            ProcessBatchRequest::V2(request)
        } else {
            let payload = RequestBuilder::flat_payload(&block, &percentages, fork_id)?;
            log_encoded_transactions(&payload, fork_id, false)?;
            ProcessBatchRequest::V1(RequestBuilder::new(&self.config).build_v1(
                &inputs,
                payload,
                trace_config,
            ))
        };

        let TimedResponse { response, elapsed } = tokio::select! {
            biased;

            _ = cancel.cancelled() => return Err(DebugError::Cancelled),
            response = self.adapter.send(&request) => response?,
        };
        #[cfg(feature = "metrics")]
        crate::Metrics::record_executor_latency(self.config.chain_id, fork_id, elapsed.as_secs_f64());

        let mut results = reconcile(response, block.transaction_count())?;

        let old_state_root = previous_block.state_root;
        let dispatcher = TraceDispatcher::new(trace_config, &self.state, batch.state_root);
        for ((tx, receipt), result) in
            block.transactions.iter().zip(&receipts).zip(results.iter_mut())
        {
            let sender = recover_sender(tx)?;
            let context = instrumentation_context(tx, sender, result, old_state_root, elapsed);
            let gas_price = parse_gas_price(&context.gas_price)?;
            result.full_trace.context = context;

            let tracer_context = TracerContext {
                block_hash: receipt.block_hash,
                block_number: receipt.block_number,
                tx_index: receipt.transaction_index,
                tx_hash: *tx.hash(),
            };
            let trace = dispatcher.trace(result, tracer_context, gas_price)?;
            result.trace_result = Some(trace);
        }
        Ok(results)
    }

    /// Builds the v2 request of the block.
    ///
    /// Block `1` of a network that started on the v2 protocol carries the injected batch as
    /// is, unlisted. Any other block is re-encoded behind its own change-L2-block header and
    /// anchored through the L1 info tree leaves it references.
    async fn build_v2_request(
        &self,
        inputs: &RequestInputs<'_>,
        percentages: &[u8],
        trace_config: &TraceConfig,
        snapshot: &Snapshot,
        cancel: &CancellationToken,
    ) -> Result<ProcessBatchRequestV2, DebugError> {
        let RequestInputs { batch, block, previous_block, fork_id, .. } = *inputs;
        let resolver = AnchorResolver::new(&self.storage, *snapshot, cancel);

        let (payload, anchor) = if block.number == 1 {
            let forced_blockhash_l1 = resolver.resolve_forced_blockhash(batch.batch_number).await?;
            debug!(
                target: "debug_block",
                batch_number = batch.batch_number,
                %forced_blockhash_l1,
                "Replaying injected batch"
            );
            (batch.batch_l2_data.clone(), L1Anchor::Injected { forced_blockhash_l1 })
        } else {
            let raw_batch = RawBatch::decode(&batch.batch_l2_data)?;
            let index = resolver
                .resolve_first_block_index(batch.batch_number, block.number, raw_batch.blocks.len())
                .await?;
            let delta_timestamp = block
                .timestamp
                .checked_sub(previous_block.timestamp)
                .and_then(|delta| u32::try_from(delta).ok())
                .ok_or_else(|| {
                    DebugError::InvalidInput(format!(
                        "block {} timestamp {} does not follow its parent's {}",
                        block.number, block.timestamp, previous_block.timestamp
                    ))
                })?;

            let payload = RequestBuilder::block_payload(
                block,
                delta_timestamp,
                raw_batch.blocks[index].header.index_l1_info_tree,
                percentages,
                fork_id,
            )?;
            log_encoded_transactions(&payload, fork_id, true)?;
            let data = resolver.resolve_anchor_data(&payload).await?;
            (payload, L1Anchor::InfoTree(data))
        };

        Ok(RequestBuilder::new(&self.config).build_v2(
            inputs,
            payload,
            anchor,
            trace_config,
            unix_now(),
        ))
    }
}

/// Returns the effective gas price percentage the transaction was charged with.
///
/// A missing effective price on either side yields the maximum percentage.
fn effective_percentage(tx: &L2Transaction, receipt: &Receipt) -> Result<u8, DebugError> {
    let effective = receipt.effective_gas_price.unwrap_or_default();
    match effective_gas_price_percentage(tx.tx().gas_price, effective) {
        Ok(percentage) => Ok(percentage),
        Err(BatchCodecError::EffectivePercentageEmpty) => Ok(MAX_EFFECTIVE_PERCENTAGE),
        Err(err) => Err(err.into()),
    }
}

/// Decodes the request payload back into transactions and logs them.
///
/// Running out of data ends the listing; any other decode error fails the request.
fn log_encoded_transactions(
    payload: &[u8],
    fork_id: u64,
    block_structured: bool,
) -> Result<(), DebugError> {
    let decoded: Result<Vec<RawTransaction>, BatchCodecError> = if block_structured {
        RawBatch::decode(payload)
            .map(|batch| batch.blocks.into_iter().flat_map(|block| block.transactions).collect())
    } else {
        decode_transactions(payload, fork_id)
    };

    match decoded {
        Ok(transactions) => {
            for raw in transactions {
                debug!(
                    target: "debug_block",
                    tx_hash = %raw.tx.hash(),
                    efficiency_percentage = raw.efficiency_percentage,
                    "Encoded transaction"
                );
            }
            Ok(())
        }
        Err(err) if err.is_invalid_data() => {
            debug!(target: "debug_block", %err, "Stopped listing encoded transactions");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::bytes;
    use zkr_primitives::test_utils::legacy_tx;

    #[test]
    fn test_missing_effective_price_is_maximal() {
        let tx = legacy_tx(0, None, bytes!("6080"), None);
        let receipt = Receipt::default();
        assert_eq!(effective_percentage(&tx, &receipt).unwrap(), MAX_EFFECTIVE_PERCENTAGE);

        let receipt = Receipt { effective_gas_price: Some(500_000_000), ..Default::default() };
        assert_eq!(effective_percentage(&tx, &receipt).unwrap(), 127);
    }

    #[test]
    fn test_log_decode_tolerates_truncation_only() {
        let tx = legacy_tx(0, None, bytes!("6080"), Some(1001));
        let payload = encode(&tx);
        assert!(log_encoded_transactions(&payload, 6, false).is_ok());
        assert!(log_encoded_transactions(&payload[..payload.len() - 3], 6, false).is_ok());

        let err = log_encoded_transactions(&payload, 7, true).unwrap_err();
        assert!(matches!(err, DebugError::MalformedBatch(BatchCodecError::MissingChangeL2Block)));
    }

    fn encode(tx: &L2Transaction) -> Vec<u8> {
        zkr_batch::encode_transactions(std::slice::from_ref(tx), &[255], 6).unwrap().to_vec()
    }
}
