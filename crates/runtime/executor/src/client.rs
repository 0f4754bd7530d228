//! Executor client seam.

use crate::{ExecutorClientError, ProcessBatchRequestV1, ProcessBatchRequestV2, ProcessBatchResponse};
use async_trait::async_trait;
use auto_impl::auto_impl;
use std::fmt::Debug;

/// [`ExecutorClient`] abstracts the request/response boundary to the stateless executor.
///
/// Each call is a single round-trip: the request is fully sent and the full response awaited.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait ExecutorClient: Send + Sync + Debug {
    /// Processes a batch with the pre-Etrog protocol.
    async fn process_batch(
        &self,
        request: &ProcessBatchRequestV1,
    ) -> Result<ProcessBatchResponse, ExecutorClientError>;

    /// Processes a batch with the Etrog protocol.
    async fn process_batch_v2(
        &self,
        request: &ProcessBatchRequestV2,
    ) -> Result<ProcessBatchResponse, ExecutorClientError>;
}
