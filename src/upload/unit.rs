//! Single-file upload with bounded fixed-delay retry.

use crate::client::{Transport, UploadReceipt};
use crate::metrics::UploadMetrics;
use crate::models::FileRef;
use crate::upload::types::{RetryPolicy, UploadOutcome};

/// Upload `file` into `batch_id`, retrying refusals and transport errors.
///
/// Each attempt makes exactly one transport call. The delay is slept between attempts only.
/// Errors that retrying cannot fix (rejected credentials, bad base URL) end the sequence early.
pub async fn upload_file<T>(
    transport: &T,
    file: &FileRef,
    batch_id: &str,
    policy: RetryPolicy,
    metrics: Option<&UploadMetrics>,
) -> UploadOutcome
where
    T: Transport + ?Sized,
{
    let attempts = policy.attempts();
    let mut last_error = String::from("max retries reached");

    for attempt in 1..=attempts {
        if let Some(metrics) = metrics {
            metrics.record_attempt();
        }

        match transport.upload_file(batch_id, file).await {
            Ok(UploadReceipt::Accepted { uuid }) => {
                tracing::debug!(batch_id, file = file.filename(), attempt, %uuid, "File uploaded");
                return finish(
                    metrics,
                    UploadOutcome::Uploaded {
                        file_name: file.filename().to_string(),
                        uuid,
                    },
                );
            }
            Ok(UploadReceipt::Refused { message }) => {
                tracing::warn!(batch_id, file = file.filename(), attempt, attempts, %message, "Upload refused");
                last_error = message;
            }
            Err(error) => {
                tracing::warn!(batch_id, file = file.filename(), attempt, attempts, error = %error, "Upload request failed");
                let fatal = error.is_fatal();
                last_error = error.to_string();
                if fatal {
                    break;
                }
            }
        }

        if attempt < attempts {
            tokio::time::sleep(policy.retry_delay).await;
        }
    }

    tracing::error!(batch_id, file = file.filename(), error = %last_error, "Upload failed");
    finish(
        metrics,
        UploadOutcome::Failed {
            file_name: file.filename().to_string(),
            error_message: last_error,
        },
    )
}

fn finish(metrics: Option<&UploadMetrics>, outcome: UploadOutcome) -> UploadOutcome {
    if let Some(metrics) = metrics {
        metrics.record_outcome(outcome.is_success());
    }
    outcome
}
