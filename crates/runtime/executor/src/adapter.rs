//! Executor round-trip with timing and error mapping.

use crate::{AdapterError, EventLog, ExecutorClient, ProcessBatchRequest, ProcessBatchResponse};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A successful executor response with the measured round-trip time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedResponse {
    /// The executor response.
    pub response: ProcessBatchResponse,
    /// Wall-clock duration of the round-trip.
    pub elapsed: Duration,
}

/// Sends requests to the executor matching their protocol generation.
#[derive(Debug)]
pub struct ExecutionServiceAdapter<C, E> {
    client: C,
    event_log: E,
}

impl<C, E> ExecutionServiceAdapter<C, E>
where
    C: ExecutorClient,
    E: EventLog,
{
    /// Creates a new [`ExecutionServiceAdapter`].
    pub const fn new(client: C, event_log: E) -> Self {
        Self { client, event_log }
    }

    /// Sends `request` and awaits the full response.
    ///
    /// A non-zero executor code is written to the [`EventLog`] before it is returned as
    /// [`AdapterError::ExecutionFailed`].
    pub async fn send(&self, request: &ProcessBatchRequest) -> Result<TimedResponse, AdapterError> {
        let base = request.base();
        debug!(
            target: "executor",
            fork_id = base.fork_id,
            old_batch_num = base.old_batch_num,
            context_id = %base.context_id,
            v2 = request.is_v2(),
            "Sending batch to executor"
        );

        let start = Instant::now();
        let response = match request {
            ProcessBatchRequest::V1(request) => self.client.process_batch(request).await,
            ProcessBatchRequest::V2(request) => self.client.process_batch_v2(request).await,
        };
        let elapsed = start.elapsed();

        let response = response.inspect_err(|err| {
            warn!(target: "executor", %err, "Executor call failed");
        })?;

        if !response.error.is_success() {
            self.event_log.log_executor_error(response.error, request);
            return Err(AdapterError::ExecutionFailed(response.error));
        }

        debug!(
            target: "executor",
            elapsed_ms = elapsed.as_millis() as u64,
            blocks = response.block_responses.len(),
            "Executor processed batch"
        );
        Ok(TimedResponse { response, elapsed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        BatchRequestBase, ExecutorClientError, ExecutorErrorCode, ProcessBatchRequestV1,
        ProcessBatchRequestV2, TraceCaptureConfig,
    };
    use alloy_primitives::{Address, B256, Bytes};
    use async_trait::async_trait;
    use mockall::{mock, predicate::eq};

    mock! {
        #[derive(Debug)]
        pub Client {}

        #[async_trait]
        impl ExecutorClient for Client {
            async fn process_batch(
                &self,
                request: &ProcessBatchRequestV1,
            ) -> Result<ProcessBatchResponse, ExecutorClientError>;

            async fn process_batch_v2(
                &self,
                request: &ProcessBatchRequestV2,
            ) -> Result<ProcessBatchResponse, ExecutorClientError>;
        }
    }

    mock! {
        #[derive(Debug)]
        pub Events {}

        impl EventLog for Events {
            fn log_executor_error(&self, code: ExecutorErrorCode, request: &ProcessBatchRequest);
        }
    }

    fn base() -> BatchRequestBase {
        BatchRequestBase {
            old_batch_num: 4,
            old_state_root: B256::repeat_byte(0x11),
            old_acc_input_hash: B256::repeat_byte(0x22),
            batch_l2_data: Bytes::from_static(&[0xc0]),
            coinbase: Address::repeat_byte(0x33),
            chain_id: 1001,
            fork_id: 6,
            trace_config: TraceCaptureConfig::FULL,
            context_id: "ctx".to_string(),
        }
    }

    fn v1_request() -> ProcessBatchRequest {
        ProcessBatchRequestV1 { base: base(), global_exit_root: B256::ZERO, eth_timestamp: 1 }
            .into()
    }

    fn v2_request() -> ProcessBatchRequest {
        ProcessBatchRequestV2 {
            base: BatchRequestBase { fork_id: 9, ..base() },
            l1_info_root: B256::ZERO,
            timestamp_limit: 10,
            skip_first_change_l2_block: false,
            skip_write_block_info_root: true,
            forced_blockhash_l1: None,
            skip_verify_l1_info_root: false,
            l1_info_tree_data: Default::default(),
        }
        .into()
    }

    #[tokio::test]
    async fn test_send_dispatches_v1() {
        let mut client = MockClient::new();
        client.expect_process_batch().times(1).returning(|_| Ok(ProcessBatchResponse::default()));
        client.expect_process_batch_v2().never();
        let mut events = MockEvents::new();
        events.expect_log_executor_error().never();

        let adapter = ExecutionServiceAdapter::new(client, events);
        let timed = adapter.send(&v1_request()).await.unwrap();
        assert!(timed.response.error.is_success());
    }

    #[tokio::test]
    async fn test_send_dispatches_v2() {
        let mut client = MockClient::new();
        client.expect_process_batch().never();
        client
            .expect_process_batch_v2()
            .withf(|request| request.base.fork_id == 9 && request.skip_write_block_info_root)
            .times(1)
            .returning(|_| Ok(ProcessBatchResponse::default()));
        let events = MockEvents::new();

        let adapter = ExecutionServiceAdapter::new(client, events);
        assert!(adapter.send(&v2_request()).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_non_zero_code_is_audited() {
        let mut client = MockClient::new();
        client.expect_process_batch().returning(|_| {
            Ok(ProcessBatchResponse {
                error: ExecutorErrorCode::BalanceMismatch,
                ..Default::default()
            })
        });
        let mut events = MockEvents::new();
        events
            .expect_log_executor_error()
            .with(eq(ExecutorErrorCode::BalanceMismatch), eq(v1_request()))
            .times(1)
            .return_const(());

        let adapter = ExecutionServiceAdapter::new(client, events);
        let err = adapter.send(&v1_request()).await.unwrap_err();
        assert_eq!(err, AdapterError::ExecutionFailed(ExecutorErrorCode::BalanceMismatch));
    }

    #[tokio::test]
    async fn test_send_transport_failure() {
        let mut client = MockClient::new();
        client
            .expect_process_batch()
            .returning(|_| Err(ExecutorClientError::Transport("connection refused".into())));
        let mut events = MockEvents::new();
        events.expect_log_executor_error().never();

        let adapter = ExecutionServiceAdapter::new(client, events);
        let err = adapter.send(&v1_request()).await.unwrap_err();
        assert!(matches!(err, AdapterError::Unavailable(ExecutorClientError::Transport(_))));
    }
}
