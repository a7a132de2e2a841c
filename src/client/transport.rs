//! Contract between the core subsystems and the service.

use crate::client::http::IntegratorClient;
use crate::client::types::{ClientError, UploadReceipt};
use crate::models::{BatchType, DocumentPage, FileRef, StatusDocument};
use async_trait::async_trait;

/// The two service calls the listener and the upload pipeline depend on.
///
/// [`IntegratorClient`] is the production implementation; tests drive the core with scripted
/// implementations instead.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch one page of documents in `status`, optionally restricted to a batch type.
    async fn fetch_documents_by_status(
        &self,
        status: StatusDocument,
        batch_type: Option<BatchType>,
        page: u32,
        limit: u32,
    ) -> Result<DocumentPage, ClientError>;

    /// Perform exactly one upload request for `file`.
    async fn upload_file(&self, batch_id: &str, file: &FileRef)
    -> Result<UploadReceipt, ClientError>;
}

#[async_trait]
impl Transport for IntegratorClient {
    async fn fetch_documents_by_status(
        &self,
        status: StatusDocument,
        batch_type: Option<BatchType>,
        page: u32,
        limit: u32,
    ) -> Result<DocumentPage, ClientError> {
        self.get_documents_by_status(status, batch_type, page, limit)
            .await
    }

    async fn upload_file(
        &self,
        batch_id: &str,
        file: &FileRef,
    ) -> Result<UploadReceipt, ClientError> {
        self.append_file(batch_id, file).await
    }
}
