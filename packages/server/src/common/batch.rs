//! Batched provider mutations with per-item fallback.

use std::future::Future;

use crate::kernel::{ProviderResult, RetryPolicy};

/// How many items a batched mutation applied and how many it gave up on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub applied: usize,
    pub failed: usize,
}

/// Apply `call` to `items` in chunks of `batch_size`.
///
/// A chunk that still fails after the retry budget is replayed one item at a
/// time, so a single rejected identity does not block the rest of its chunk.
pub async fn apply_in_batches<F, Fut>(
    operation: &str,
    items: &[String],
    batch_size: usize,
    retry: &RetryPolicy,
    call: F,
) -> BatchOutcome
where
    F: Fn(Vec<String>) -> Fut,
    Fut: Future<Output = ProviderResult<()>>,
{
    let mut outcome = BatchOutcome::default();

    for chunk in items.chunks(batch_size.max(1)) {
        let batch_error = match retry.run(operation, || call(chunk.to_vec())).await {
            Ok(()) => {
                outcome.applied += chunk.len();
                continue;
            }
            Err(e) => e,
        };

        if chunk.len() == 1 {
            tracing::error!(operation, item = %chunk[0], error = %batch_error, "Provider call failed");
            outcome.failed += 1;
            continue;
        }

        tracing::warn!(
            operation,
            size = chunk.len(),
            error = %batch_error,
            "Batched call failed, falling back to one item per call"
        );
        for item in chunk {
            match retry.run(operation, || call(vec![item.clone()])).await {
                Ok(()) => outcome.applied += 1,
                Err(e) => {
                    tracing::error!(operation, item = %item, error = %e, "Provider call failed");
                    outcome.failed += 1;
                }
            }
        }
    }

    outcome
}
