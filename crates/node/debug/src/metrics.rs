//! Metrics for block debugging.

/// Container for metrics.
#[derive(Debug, Clone)]
pub struct Metrics;

impl Metrics {
    /// Identifier for the counter of successfully traced blocks.
    pub const DEBUG_BLOCK_SUCCESS_TOTAL: &str = "zkr_debug_block_success_total";

    /// Identifier for the counter of failed debug requests.
    pub const DEBUG_BLOCK_ERROR_TOTAL: &str = "zkr_debug_block_error_total";

    /// Identifier for the histogram of executor round-trip latencies.
    pub const EXECUTOR_LATENCY_SECONDS: &str = "zkr_executor_latency_seconds";

    /// Initializes metrics for the debugger.
    ///
    /// This does two things:
    /// * Describes various metrics.
    /// * Initializes metrics to 0 so they can be queried immediately.
    pub fn init(chain_id: u64) {
        Self::describe();
        Self::zero(chain_id);
    }

    /// Describes metrics used in [`zkr_debug`][crate].
    pub fn describe() {
        metrics::describe_counter!(
            Self::DEBUG_BLOCK_SUCCESS_TOTAL,
            metrics::Unit::Count,
            "Number of blocks traced successfully"
        );
        metrics::describe_counter!(
            Self::DEBUG_BLOCK_ERROR_TOTAL,
            metrics::Unit::Count,
            "Number of debug block requests that failed"
        );
        metrics::describe_histogram!(
            Self::EXECUTOR_LATENCY_SECONDS,
            metrics::Unit::Seconds,
            "Latency of executor batch processing round-trips"
        );
    }

    fn zero(chain_id: u64) {
        metrics::counter!(Self::DEBUG_BLOCK_SUCCESS_TOTAL, "chain_id" => chain_id.to_string())
            .increment(0);
        metrics::counter!(Self::DEBUG_BLOCK_ERROR_TOTAL, "chain_id" => chain_id.to_string())
            .increment(0);
    }

    /// Records the outcome of a debug request.
    pub(crate) fn record_outcome(chain_id: u64, success: bool) {
        let name =
            if success { Self::DEBUG_BLOCK_SUCCESS_TOTAL } else { Self::DEBUG_BLOCK_ERROR_TOTAL };
        metrics::counter!(name, "chain_id" => chain_id.to_string()).increment(1);
    }

    /// Records an executor round-trip.
    pub(crate) fn record_executor_latency(chain_id: u64, fork_id: u64, seconds: f64) {
        metrics::histogram!(
            Self::EXECUTOR_LATENCY_SECONDS,
            "chain_id" => chain_id.to_string(),
            "fork_id" => fork_id.to_string()
        )
        .record(seconds);
    }
}
