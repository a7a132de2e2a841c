//! HTTP client wrapper for the integrator API.

use crate::client::types::{ClientError, Envelope, UploadReceipt, payload_message};
use crate::config::{Config, get_config};
use crate::mime;
use crate::models::{
    BatchType, Document, DocumentPage, DocumentType, EntityDocumentExtractor, EntityTextExtractor,
    ExtractedEntities, FileRef, FileSource, ResultsSearch, Search, SearchDocument,
    SearchParameters, StatusDocument,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

// Enough leading bytes for every signature `infer` checks.
const SNIFF_LEN: usize = 512;

/// Lightweight HTTP client for the integrator endpoints.
#[derive(Clone)]
pub struct IntegratorClient {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
    pub(crate) api_key: String,
    pub(crate) api_secret: String,
}

impl IntegratorClient {
    /// Construct a new client using the globally loaded configuration.
    pub fn new() -> Result<Self, ClientError> {
        Self::from_config(get_config())
    }

    /// Construct a new client from an explicit configuration.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(concat!("nebuia-copilot/", env!("CARGO_PKG_VERSION")))
            .timeout(config.http_timeout)
            .build()?;

        let base_url = normalize_base_url(&config.base_url).map_err(ClientError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            has_credentials = !config.api_key.is_empty() && !config.api_secret.is_empty(),
            "Initialized integrator HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    /// Fetch one page of documents in the given status, optionally restricted to a batch type.
    pub async fn get_documents_by_status(
        &self,
        status: StatusDocument,
        batch_type: Option<BatchType>,
        page: u32,
        limit: u32,
    ) -> Result<DocumentPage, ClientError> {
        let segments: Vec<&str> = match batch_type {
            Some(batch_type) => vec![
                "integrator",
                "documents",
                "by",
                batch_type.as_str(),
                "status",
                status.as_str(),
            ],
            None => vec!["integrator", "documents", "by", "status", status.as_str()],
        };

        let request = self
            .request(Method::GET, &segments)?
            .query(&[("page", page), ("limit", limit)]);
        let page = self.payload::<DocumentPage>(request).await?;
        tracing::debug!(
            %status,
            batch_type = ?batch_type,
            returned = page.documents.len(),
            total = page.total,
            "Fetched documents by status"
        );
        Ok(page)
    }

    /// Fetch one page of documents appended to a batch.
    pub async fn get_documents_by_batch(
        &self,
        batch_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<DocumentPage, ClientError> {
        let request = self
            .request(
                Method::GET,
                &["integrator", "documents", "by", "id", "batch", batch_id],
            )?
            .query(&[("page", page), ("limit", limit)]);
        self.payload(request).await
    }

    /// Retrieve a single document by UUID.
    pub async fn get_document_by_uuid(&self, uuid: &str) -> Result<Document, ClientError> {
        let request = self.request(
            Method::GET,
            &["integrator", "document", "get", "by", "uuid", uuid],
        )?;
        self.payload(request).await
    }

    /// Move a document to a new status.
    pub async fn set_document_status(
        &self,
        uuid: &str,
        status: StatusDocument,
    ) -> Result<bool, ClientError> {
        let request = self.request(
            Method::GET,
            &["integrator", "documents", "set", "status", uuid, status.as_str()],
        )?;
        self.status(request).await
    }

    /// Reset a document so the service processes it again.
    pub async fn clear_document(&self, uuid: &str) -> Result<bool, ClientError> {
        let request = self.request(Method::GET, &["integrator", "clear", "document", uuid])?;
        self.status(request).await
    }

    /// Delete a batch and its documents.
    pub async fn delete_batch(&self, batch_id: &str) -> Result<bool, ClientError> {
        let request = self.request(Method::DELETE, &["integrator", "delete", "batch", batch_id])?;
        self.status(request).await
    }

    /// Delete a single document.
    pub async fn delete_document(&self, uuid: &str) -> Result<bool, ClientError> {
        let request = self.request(Method::DELETE, &["integrator", "delete", "by", "uuid", uuid])?;
        self.status(request).await
    }

    /// List the document types configured for the account.
    pub async fn get_document_types(&self) -> Result<Vec<DocumentType>, ClientError> {
        let request = self.request(
            Method::GET,
            &["integrator", "documents", "type", "all", "user"],
        )?;
        let types: Option<Vec<DocumentType>> = self.envelope(request).await?.payload;
        Ok(types.unwrap_or_default())
    }

    /// Create a batch and return its identifier.
    pub async fn create_batch(
        &self,
        name: &str,
        batch_type: BatchType,
    ) -> Result<String, ClientError> {
        let request = self
            .request(Method::POST, &["integrator", "create", "batch"])?
            .json(&json!({ "batch_name": name, "batch_type": batch_type }));
        let envelope: Envelope<Value> = self.envelope(request).await?;

        if !envelope.status {
            let message = payload_message(envelope.payload.as_ref(), "batch was not created");
            tracing::warn!(name, %batch_type, %message, "Batch creation rejected");
            return Err(ClientError::Rejected(message));
        }

        let batch_id = match envelope.payload {
            Some(Value::String(id)) => id,
            Some(other) => other.to_string(),
            None => return Err(ClientError::Rejected("response did not include a batch id".into())),
        };
        tracing::info!(name, %batch_type, %batch_id, "Created batch");
        Ok(batch_id)
    }

    /// Perform a single append-to-batch request for one file.
    pub async fn append_file(
        &self,
        batch_id: &str,
        file: &FileRef,
    ) -> Result<UploadReceipt, ClientError> {
        let form = build_upload_form(file)?;
        let request = self
            .request(
                Method::POST,
                &["integrator", "append", "to", "batch", batch_id],
            )?
            .multipart(form);
        let envelope: Envelope<Value> = self.envelope(request).await?;
        Ok(UploadReceipt::from_envelope(envelope))
    }

    /// Query a brain. A rejected search yields an empty result set.
    pub async fn search_in_brain(
        &self,
        params: &SearchParameters,
    ) -> Result<ResultsSearch, ClientError> {
        let request = self
            .request(Method::POST, &["integrator", "search", "brain"])?
            .json(params);
        let envelope: Envelope<Value> = self.envelope(request).await?;
        if !envelope.status {
            tracing::debug!(batch = %params.batch, "Brain search returned no status");
            return Ok(ResultsSearch::default());
        }
        match envelope.payload {
            Some(payload @ Value::Object(_)) => Ok(serde_json::from_value(payload)?),
            _ => Ok(ResultsSearch::default()),
        }
    }

    /// Full-text search inside a processed document.
    pub async fn search_in_document(&self, search: &Search) -> Result<SearchDocument, ClientError> {
        let request = self
            .request(Method::POST, &["integrator", "document", "search"])?
            .json(search);
        self.payload(request).await
    }

    /// Extract entities from free text.
    pub async fn extract_entities_from_text(
        &self,
        extractor: &EntityTextExtractor,
    ) -> Result<ExtractedEntities, ClientError> {
        let request = self
            .request(Method::POST, &["integrator", "extractor", "from", "text"])?
            .json(extractor);
        self.payload(request).await
    }

    /// Extract entities from a processed document.
    pub async fn extract_entities_from_document(
        &self,
        uuid: &str,
        extractor: &EntityDocumentExtractor,
    ) -> Result<ExtractedEntities, ClientError> {
        let request = self
            .request(
                Method::POST,
                &["integrator", "extractor", "from", "document", uuid],
            )?
            .json(extractor);
        self.payload(request).await
    }

    /// Run quality assurance over every document of a batch.
    pub async fn process_batch(&self, batch_id: &str) -> Result<bool, ClientError> {
        let request = self.request(
            Method::POST,
            &["integrator", "run", "qa", "batch", "all", batch_id],
        )?;
        self.status(request).await
    }

    /// Check that a remote file is reachable and has a type the service can process.
    ///
    /// Returns the sniffed MIME type, or `None` when the file is unreachable or unsupported.
    pub async fn check_downloadable(&self, url: &str) -> Option<String> {
        let head = self.client.head(url).send().await.ok()?;
        if !head.status().is_success() && !head.status().is_redirection() {
            tracing::debug!(url, status = %head.status(), "Remote file HEAD failed");
            return None;
        }
        let mut response = self.client.get(url).send().await.ok()?;
        if !response.status().is_success() {
            tracing::debug!(url, status = %response.status(), "Remote file GET failed");
            return None;
        }
        let mut head = Vec::with_capacity(SNIFF_LEN);
        while head.len() < SNIFF_LEN {
            match response.chunk().await.ok()? {
                Some(chunk) => head.extend_from_slice(&chunk),
                None => break,
            }
        }
        let mime_type = mime::sniff(&head)?;
        mime::is_processable(&mime_type).then_some(mime_type)
    }

    fn request(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        let url = endpoint(&self.base_url, segments)?;
        Ok(self
            .client
            .request(method, url)
            .header("key", &self.api_key)
            .header("secret", &self.api_secret))
    }

    async fn envelope<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Envelope<T>, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            let error = ClientError::Unauthorized { status, body };
            tracing::error!(error = %error, "Service refused credentials");
            return Err(error);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = ClientError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Service request failed");
            return Err(error);
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn payload<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let envelope: Envelope<Value> = self.envelope(request).await?;
        match envelope.payload {
            Some(payload) if !payload.is_null() => Ok(serde_json::from_value(payload)?),
            other => Err(ClientError::Rejected(payload_message(
                other.as_ref(),
                "response did not include a payload",
            ))),
        }
    }

    async fn status(&self, request: reqwest::RequestBuilder) -> Result<bool, ClientError> {
        let envelope: Envelope<Value> = self.envelope(request).await?;
        Ok(envelope.status)
    }
}

fn build_upload_form(file: &FileRef) -> Result<Form, ClientError> {
    let form = match file.source() {
        FileSource::Bytes(data) => {
            let part = Part::bytes(data.clone())
                .file_name(file.filename().to_string())
                .mime_str(file.mime_type())
                .map_err(|_| {
                    ClientError::InvalidFile(format!(
                        "'{}' is not a valid MIME type for {}",
                        file.mime_type(),
                        file.filename()
                    ))
                })?;
            Form::new().part("file", part)
        }
        FileSource::Url(url) => Form::new()
            .text("file_url", url.clone())
            .text("file_name", file.filename().to_string())
            .text("mime_type", file.mime_type().to_string()),
    };
    Ok(form.text("type_document", file.type_document().to_string()))
}

fn normalize_base_url(url: &str) -> Result<Url, String> {
    let mut parsed = Url::parse(url).map_err(|err| err.to_string())?;
    if parsed.cannot_be_a_base() {
        return Err(format!("{url} cannot be used as a base URL"));
    }
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed)
}

fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ClientError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
