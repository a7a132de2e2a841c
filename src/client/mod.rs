//! Service transport: HTTP client, error types and the core-facing contract.

pub mod http;
pub mod transport;
pub mod types;

pub use http::IntegratorClient;
pub use transport::Transport;
pub use types::{ClientError, UploadReceipt};
