use funnel_core::RawImageInput;
use funnel_logging::{funnel_info, funnel_warn};
use futures_util::future::join_all;

use crate::{BatchFailure, BatchOutcome, ImageNormalizer};

/// Normalize every input concurrently and wait for all of them.
///
/// Failed inputs are logged and reported in `failures`; they never abort the
/// rest of the batch. Successful images keep their input order.
pub async fn normalize_batch(
    normalizer: &dyn ImageNormalizer,
    inputs: Vec<RawImageInput>,
) -> BatchOutcome {
    let requested = inputs.len();
    let labels: Vec<String> = inputs.iter().map(|input| input.label.clone()).collect();
    let results = join_all(inputs.into_iter().map(|input| normalizer.normalize(input))).await;

    let mut outcome = BatchOutcome::default();
    for (index, (result, label)) in results.into_iter().zip(labels).enumerate() {
        match result {
            Ok(image) => outcome.images.push(image),
            Err(error) => {
                funnel_warn!("Skipping image {} ({}): {}", index, label, error);
                outcome.failures.push(BatchFailure {
                    index,
                    label,
                    error,
                });
            }
        }
    }

    funnel_info!(
        "Normalized batch: requested={} accepted={} skipped={}",
        requested,
        outcome.images.len(),
        outcome.failures.len()
    );
    outcome
}
