//! Outcomes, batch results and retry settings for uploads.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Input errors that abort an upload batch before any request is sent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    /// Batch identifier was empty or whitespace.
    #[error("batch id must not be empty")]
    EmptyBatchId,
    /// Batch identifier cannot be used as a single path segment.
    #[error("invalid batch id '{0}'")]
    InvalidBatchId(String),
    /// Nothing to upload.
    #[error("at least one file is required")]
    NoFiles,
}

/// Terminal result of one file's attempt sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum UploadOutcome {
    /// The service stored the file.
    Uploaded {
        /// Filename reported to the service.
        file_name: String,
        /// UUID assigned to the new document.
        uuid: String,
    },
    /// Every attempt failed.
    Failed {
        /// Filename reported to the service.
        file_name: String,
        /// Detail from the most recent attempt.
        error_message: String,
    },
}

impl UploadOutcome {
    /// Whether the file was stored.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Uploaded { .. })
    }

    /// Filename reported to the service.
    pub fn file_name(&self) -> &str {
        match self {
            Self::Uploaded { file_name, .. } | Self::Failed { file_name, .. } => file_name,
        }
    }

    /// Assigned document UUID, for successful uploads.
    pub fn uuid(&self) -> Option<&str> {
        match self {
            Self::Uploaded { uuid, .. } => Some(uuid),
            Self::Failed { .. } => None,
        }
    }

    /// Last error detail, for failed uploads.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Uploaded { .. } => None,
            Self::Failed { error_message, .. } => Some(error_message),
        }
    }
}

/// Partition of a batch upload. Both lists follow input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadBatchResult {
    /// Files stored by the service.
    pub successful: Vec<UploadOutcome>,
    /// Files that exhausted their attempts.
    pub failed: Vec<UploadOutcome>,
}

impl UploadBatchResult {
    /// Total number of files accounted for.
    pub fn len(&self) -> usize {
        self.successful.len() + self.failed.len()
    }

    /// Whether the batch contained no files.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every file was stored.
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

impl FromIterator<UploadOutcome> for UploadBatchResult {
    fn from_iter<I: IntoIterator<Item = UploadOutcome>>(iter: I) -> Self {
        let (successful, failed) = iter.into_iter().partition(UploadOutcome::is_success);
        Self { successful, failed }
    }
}

/// Bounded fixed-delay retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per file. Zero behaves like one.
    pub max_retries: u32,
    /// Pause between consecutive attempts.
    pub retry_delay: Duration,
}

impl RetryPolicy {
    /// Build a policy.
    pub const fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
        }
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(5))
    }
}
