#![deny(missing_docs)]

//! Client library for the NebuIA document processing service.

/// HTTP transport, error types and the transport seam used by the core.
pub mod client;
/// Environment-driven configuration management.
pub mod config;
/// Caller-facing facade.
pub mod integrator;
/// Status listener engine.
pub mod listener;
/// Structured logging and tracing setup.
pub mod logging;
/// Listener and upload metrics helpers.
pub mod metrics;
/// MIME type detection for uploads.
pub mod mime;
/// Wire data model.
pub mod models;
/// Resilient batch uploads.
pub mod upload;

#[cfg(test)]
pub(crate) mod test_support;
