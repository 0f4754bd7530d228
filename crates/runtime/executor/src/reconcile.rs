//! Flattening of executor responses.

use crate::{ExecutionResult, ProcessBatchResponse, ReconcileError};

/// Flattens `response` into one [`ExecutionResult`] per transaction.
///
/// Fails unless the response carries exactly `expected` transaction results.
pub fn reconcile(
    response: ProcessBatchResponse,
    expected: usize,
) -> Result<Vec<ExecutionResult>, ReconcileError> {
    let actual: usize =
        response.block_responses.iter().map(|block| block.transaction_responses.len()).sum();
    if actual != expected {
        return Err(ReconcileError::CountMismatch { expected, actual });
    }

    Ok(response
        .block_responses
        .into_iter()
        .flat_map(|block| block.transaction_responses)
        .map(ExecutionResult::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlockResponse, TransactionResponse};
    use alloy_primitives::B256;

    fn response(per_block: &[usize]) -> ProcessBatchResponse {
        let mut counter = 0u8;
        let block_responses = per_block
            .iter()
            .enumerate()
            .map(|(number, count)| BlockResponse {
                block_number: number as u64,
                transaction_responses: (0..*count)
                    .map(|_| {
                        counter += 1;
                        TransactionResponse {
                            tx_hash: B256::repeat_byte(counter),
                            gas_used: u64::from(counter),
                            ..Default::default()
                        }
                    })
                    .collect(),
            })
            .collect();
        ProcessBatchResponse { block_responses, ..Default::default() }
    }

    #[test]
    fn test_reconcile_preserves_order() {
        let results = reconcile(response(&[3]), 3).unwrap();
        let gas: Vec<_> = results.iter().map(|result| result.gas_used).collect();
        assert_eq!(gas, vec![1, 2, 3]);
        assert!(results.iter().all(|result| result.trace_result.is_none()));
    }

    #[test]
    fn test_reconcile_flattens_blocks() {
        assert_eq!(reconcile(response(&[1, 2]), 3).unwrap().len(), 3);
    }

    #[test]
    fn test_reconcile_count_mismatch() {
        assert_eq!(
            reconcile(response(&[2]), 3).unwrap_err(),
            ReconcileError::CountMismatch { expected: 3, actual: 2 }
        );
        assert_eq!(
            reconcile(response(&[]), 1).unwrap_err(),
            ReconcileError::CountMismatch { expected: 1, actual: 0 }
        );
    }
}
