//! Batch conversion orchestrator
//!
//! Fans one conversion per job out concurrently and waits for all of them:
//! a failing item never aborts its siblings, and one item timing out never
//! cancels the rest. Parallelism equals batch size; the batch-size limit is
//! enforced upstream.

use futures::future::join_all;

use super::types::{BatchOutcome, ConversionFailure, RenderJob};
use super::Converter;

impl Converter {
    /// Convert every document in the list, collecting successes and
    /// failures independently.
    ///
    /// `join_all` yields results in submission order, so attribution to the
    /// original index survives arbitrary completion interleaving.
    pub async fn convert_batch(&self, html_list: Vec<String>) -> BatchOutcome {
        let total = html_list.len();
        tracing::info!("Starting batch conversion of {} documents", total);

        let conversions = html_list.into_iter().enumerate().map(|(index, html)| async move {
            let result = self.convert(RenderJob::batched(html, index)).await;
            (index, result)
        });
        let results = join_all(conversions).await;

        let mut successes = Vec::new();
        let mut failures = Vec::new();
        for (index, result) in results {
            match result {
                Ok(pdf) => successes.push((index, pdf)),
                Err(err) => failures.push(ConversionFailure {
                    index,
                    message: err.to_string(),
                    kind: err.kind().to_string(),
                }),
            }
        }

        tracing::info!(
            "Batch conversion finished: {} succeeded, {} failed",
            successes.len(),
            failures.len()
        );
        BatchOutcome { total, successes, failures }
    }
}
