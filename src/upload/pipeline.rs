//! Fan a list of files across upload units and partition the outcomes.

use crate::client::Transport;
use crate::metrics::{UploadMetrics, UploadMetricsSnapshot};
use crate::models::FileRef;
use crate::upload::types::{RetryPolicy, UploadBatchResult, UploadError, UploadOutcome};
use crate::upload::unit::upload_file;
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;

/// Uploads batches of files with bounded concurrency.
///
/// Each file runs its own retry sequence; a failing file never aborts its siblings. Concurrency
/// only bounds how many files are in flight, results always come back in input order.
pub struct UploadPipeline<T: ?Sized> {
    transport: Arc<T>,
    policy: RetryPolicy,
    concurrency: usize,
    metrics: Arc<UploadMetrics>,
}

impl<T> UploadPipeline<T>
where
    T: Transport + ?Sized,
{
    /// Build a pipeline over a shared transport.
    pub fn new(transport: Arc<T>, policy: RetryPolicy, concurrency: usize) -> Self {
        Self {
            transport,
            policy,
            concurrency: concurrency.max(1),
            metrics: Arc::new(UploadMetrics::new()),
        }
    }

    /// Retry settings applied to every file.
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Upload every file into `batch_id` and partition the outcomes.
    pub async fn append_batch(
        &self,
        batch_id: &str,
        files: &[FileRef],
    ) -> Result<UploadBatchResult, UploadError> {
        validate_batch_id(batch_id)?;
        if files.is_empty() {
            return Err(UploadError::NoFiles);
        }

        tracing::info!(
            batch_id,
            files = files.len(),
            max_retries = self.policy.max_retries,
            concurrency = self.concurrency,
            "Appending files to batch"
        );

        let transport = self.transport.as_ref();
        let policy = self.policy;
        let metrics = self.metrics.as_ref();
        let mut outcomes: Vec<(usize, UploadOutcome)> =
            stream::iter(files.iter().enumerate().map(|(index, file)| async move {
                let outcome = upload_file(transport, file, batch_id, policy, Some(metrics)).await;
                (index, outcome)
            }))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;
        outcomes.sort_by_key(|(index, _)| *index);

        let result: UploadBatchResult = outcomes.into_iter().map(|(_, outcome)| outcome).collect();
        tracing::info!(
            batch_id,
            successful = result.successful.len(),
            failed = result.failed.len(),
            "Batch append finished"
        );
        Ok(result)
    }

    /// Counters accumulated across every batch this pipeline ran.
    pub fn metrics_snapshot(&self) -> UploadMetricsSnapshot {
        self.metrics.snapshot()
    }
}

fn validate_batch_id(batch_id: &str) -> Result<(), UploadError> {
    if batch_id.trim().is_empty() {
        return Err(UploadError::EmptyBatchId);
    }
    if batch_id.contains(['/', '?', '#']) || batch_id.trim() != batch_id {
        return Err(UploadError::InvalidBatchId(batch_id.to_string()));
    }
    Ok(())
}
