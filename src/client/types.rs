//! Shared types used by the HTTP client and the transport contract.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Errors returned while interacting with the service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Credentials were refused.
    #[error("Service rejected credentials ({status}): {body}")]
    Unauthorized {
        /// HTTP status returned by the service.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Service responded with an unexpected status code.
    #[error("Unexpected service response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the service.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Response body did not match the expected shape.
    #[error("Failed to decode service response: {0}")]
    Decode(#[from] serde_json::Error),
    /// Service answered `status: false`.
    #[error("Service rejected the request: {0}")]
    Rejected(String),
    /// The file to upload carries metadata that cannot be sent.
    #[error("Invalid upload file: {0}")]
    InvalidFile(String),
}

impl ClientError {
    /// Whether retrying the same request cannot succeed without reconfiguration.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl(_) | Self::Unauthorized { .. } | Self::InvalidFile(_)
        )
    }
}

/// Terminal answer of a single upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadReceipt {
    /// The service stored the file under this document UUID.
    Accepted {
        /// Assigned document UUID.
        uuid: String,
    },
    /// The service answered but refused the file.
    Refused {
        /// Message provided by the service.
        message: String,
    },
}

/// `{status, payload}` wrapper every endpoint answers with.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub(crate) status: bool,
    pub(crate) payload: Option<T>,
}

/// Render an arbitrary payload as a human readable message.
pub(crate) fn payload_message(payload: Option<&Value>, fallback: &str) -> String {
    match payload {
        Some(Value::String(text)) if !text.is_empty() => text.clone(),
        Some(Value::Null) | None => fallback.to_string(),
        Some(Value::String(_)) => fallback.to_string(),
        Some(other) => other.to_string(),
    }
}

impl UploadReceipt {
    /// Interpret the append-to-batch envelope.
    pub(crate) fn from_envelope(envelope: Envelope<Value>) -> Self {
        if envelope.status {
            let uuid = match envelope.payload {
                Some(Value::Array(items)) => items.into_iter().next(),
                Some(other) => Some(other),
                None => None,
            }
            .and_then(|value| match value {
                Value::String(uuid) if !uuid.is_empty() => Some(uuid),
                _ => None,
            });
            match uuid {
                Some(uuid) => Self::Accepted { uuid },
                None => Self::Refused {
                    message: "response did not include a document uuid".to_string(),
                },
            }
        } else {
            Self::Refused {
                message: payload_message(envelope.payload.as_ref(), "unknown error"),
            }
        }
    }
}
