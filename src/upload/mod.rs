//! Resilient batch uploads.

pub mod pipeline;
pub mod types;
pub mod unit;

pub use pipeline::UploadPipeline;
pub use types::{RetryPolicy, UploadBatchResult, UploadError, UploadOutcome};
pub use unit::upload_file;
