//! Caller-facing entry point tying the client, the upload pipeline and the listener together.

use crate::client::{ClientError, IntegratorClient};
use crate::config::Config;
use crate::listener::ListenerEngine;
use crate::metrics::UploadMetricsSnapshot;
use crate::models::{
    BatchType, Document, DocumentPage, DocumentType, EntityDocumentExtractor, EntityTextExtractor,
    ExtractedEntities, FileRef, ResultsSearch, Search, SearchDocument, SearchParameters,
    StatusDocument,
};
use crate::upload::{RetryPolicy, UploadBatchResult, UploadError, UploadPipeline};
use std::sync::Arc;

/// Facade over the document processing service.
///
/// ```no_run
/// # async fn demo() -> anyhow::Result<()> {
/// use nebuia_copilot::config::Config;
/// use nebuia_copilot::integrator::Integrator;
/// use nebuia_copilot::listener::Subscription;
/// use nebuia_copilot::models::{FileRef, StatusDocument};
///
/// let integrator = Integrator::from_config(&Config::new("https://ia.nebuia.com/api/v1", "key", "secret"))?;
/// let files = [FileRef::url("https://domain.com/x.pdf", "type-1")];
/// let result = integrator.append_to_batch("batch-1", &files).await?;
/// println!("{} uploaded", result.successful.len());
///
/// let mut listener = integrator.listener();
/// listener.set_on_document_handler(|status, doc| println!("{status}: {}", doc.uuid));
/// listener.add_listener(Subscription::new(StatusDocument::WaitingQa))?;
/// listener.run().await?;
/// # Ok(())
/// # }
/// ```
pub struct Integrator {
    client: Arc<IntegratorClient>,
    pipeline: UploadPipeline<IntegratorClient>,
}

impl Integrator {
    /// Build a facade from the globally loaded configuration.
    pub fn new() -> Result<Self, ClientError> {
        Self::from_config(crate::config::get_config())
    }

    /// Build a facade from an explicit configuration.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let client = Arc::new(IntegratorClient::from_config(config)?);
        let policy = RetryPolicy::new(config.upload_max_retries, config.upload_retry_delay);
        let pipeline = UploadPipeline::new(client.clone(), policy, config.upload_concurrency);
        Ok(Self { client, pipeline })
    }

    /// The underlying HTTP client.
    pub fn client(&self) -> &IntegratorClient {
        &self.client
    }

    /// Upload `files` into `batch_id`, retrying each file independently.
    pub async fn append_to_batch(
        &self,
        batch_id: &str,
        files: &[FileRef],
    ) -> Result<UploadBatchResult, UploadError> {
        self.pipeline.append_batch(batch_id, files).await
    }

    /// Upload counters accumulated by this facade.
    pub fn upload_metrics(&self) -> UploadMetricsSnapshot {
        self.pipeline.metrics_snapshot()
    }

    /// A fresh, idle listener sharing this facade's client.
    pub fn listener(&self) -> ListenerEngine<IntegratorClient> {
        ListenerEngine::new(self.client.clone())
    }

    /// See [`IntegratorClient::create_batch`].
    pub async fn create_batch(
        &self,
        name: &str,
        batch_type: BatchType,
    ) -> Result<String, ClientError> {
        self.client.create_batch(name, batch_type).await
    }

    /// See [`IntegratorClient::delete_batch`].
    pub async fn delete_batch(&self, batch_id: &str) -> Result<bool, ClientError> {
        self.client.delete_batch(batch_id).await
    }

    /// See [`IntegratorClient::delete_document`].
    pub async fn delete_document(&self, uuid: &str) -> Result<bool, ClientError> {
        self.client.delete_document(uuid).await
    }

    /// See [`IntegratorClient::clear_document`].
    pub async fn clear_document(&self, uuid: &str) -> Result<bool, ClientError> {
        self.client.clear_document(uuid).await
    }

    /// See [`IntegratorClient::set_document_status`].
    pub async fn set_document_status(
        &self,
        uuid: &str,
        status: StatusDocument,
    ) -> Result<bool, ClientError> {
        self.client.set_document_status(uuid, status).await
    }

    /// See [`IntegratorClient::get_document_by_uuid`].
    pub async fn get_document_by_uuid(&self, uuid: &str) -> Result<Document, ClientError> {
        self.client.get_document_by_uuid(uuid).await
    }

    /// See [`IntegratorClient::get_documents_by_batch`].
    pub async fn get_documents_by_batch(
        &self,
        batch_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<DocumentPage, ClientError> {
        self.client.get_documents_by_batch(batch_id, page, limit).await
    }

    /// See [`IntegratorClient::get_documents_by_status`].
    pub async fn get_documents_by_status(
        &self,
        status: StatusDocument,
        batch_type: Option<BatchType>,
        page: u32,
        limit: u32,
    ) -> Result<DocumentPage, ClientError> {
        self.client
            .get_documents_by_status(status, batch_type, page, limit)
            .await
    }

    /// See [`IntegratorClient::get_document_types`].
    pub async fn get_document_types(&self) -> Result<Vec<DocumentType>, ClientError> {
        self.client.get_document_types().await
    }

    /// See [`IntegratorClient::search_in_brain`].
    pub async fn search_in_brain(
        &self,
        params: &SearchParameters,
    ) -> Result<ResultsSearch, ClientError> {
        self.client.search_in_brain(params).await
    }

    /// See [`IntegratorClient::search_in_document`].
    pub async fn search_in_document(&self, search: &Search) -> Result<SearchDocument, ClientError> {
        self.client.search_in_document(search).await
    }

    /// See [`IntegratorClient::extract_entities_from_text`].
    pub async fn extract_entities_from_text(
        &self,
        extractor: &EntityTextExtractor,
    ) -> Result<ExtractedEntities, ClientError> {
        self.client.extract_entities_from_text(extractor).await
    }

    /// See [`IntegratorClient::extract_entities_from_document`].
    pub async fn extract_entities_from_document(
        &self,
        uuid: &str,
        extractor: &EntityDocumentExtractor,
    ) -> Result<ExtractedEntities, ClientError> {
        self.client
            .extract_entities_from_document(uuid, extractor)
            .await
    }

    /// See [`IntegratorClient::process_batch`].
    pub async fn process_batch(&self, batch_id: &str) -> Result<bool, ClientError> {
        self.client.process_batch(batch_id).await
    }
}
