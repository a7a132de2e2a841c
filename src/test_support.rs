//! Scripted transport used by the core unit tests.

use crate::client::{ClientError, Transport, UploadReceipt};
use crate::models::{BatchType, Document, DocumentPage, FileRef, StatusDocument};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use time::macros::datetime;

/// One scripted answer to a fetch.
#[derive(Debug, Clone)]
pub(crate) enum FetchStep {
    Page(Vec<&'static str>),
    Fail,
    Unauthorized,
}

/// One scripted answer to an upload attempt.
#[derive(Debug, Clone)]
pub(crate) enum UploadStep {
    Accept,
    Refuse(&'static str),
    Fail,
    Unauthorized,
}

#[derive(Default)]
pub(crate) struct ScriptedTransport {
    fetches: Mutex<HashMap<StatusDocument, VecDeque<FetchStep>>>,
    uploads: Mutex<HashMap<String, VecDeque<UploadStep>>>,
    upload_delays: Mutex<HashMap<String, Duration>>,
    fetch_delay: Option<Duration>,
    fetch_calls: AtomicUsize,
    upload_calls: Mutex<HashMap<String, usize>>,
    seen_filters: Mutex<Vec<(StatusDocument, Option<BatchType>, u32, u32)>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    pub(crate) fn script_fetches(
        self,
        status: StatusDocument,
        steps: impl IntoIterator<Item = FetchStep>,
    ) -> Self {
        self.fetches
            .lock()
            .unwrap()
            .insert(status, steps.into_iter().collect());
        self
    }

    pub(crate) fn script_uploads(
        self,
        filename: &str,
        steps: impl IntoIterator<Item = UploadStep>,
    ) -> Self {
        self.uploads
            .lock()
            .unwrap()
            .insert(filename.to_string(), steps.into_iter().collect());
        self
    }

    pub(crate) fn delay_upload(self, filename: &str, delay: Duration) -> Self {
        self.upload_delays
            .lock()
            .unwrap()
            .insert(filename.to_string(), delay);
        self
    }

    pub(crate) fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn upload_calls(&self, filename: &str) -> usize {
        self.upload_calls
            .lock()
            .unwrap()
            .get(filename)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn seen_filters(&self) -> Vec<(StatusDocument, Option<BatchType>, u32, u32)> {
        self.seen_filters.lock().unwrap().clone()
    }
}

pub(crate) fn document(id: &str, status: StatusDocument) -> Document {
    Document {
        id: id.to_string(),
        batch_id: "batch-1".to_string(),
        user: "user-1".to_string(),
        uuid: format!("uuid-{id}"),
        url: format!("https://files.example/{id}.pdf"),
        file_name: format!("{id}.pdf"),
        type_document: "type-1".to_string(),
        status_document: status.as_str().to_string(),
        uploaded: datetime!(2024-07-27 17:00 UTC),
        reviewed_at: None,
        source_type: "url".to_string(),
        entities: None,
    }
}

fn server_error() -> ClientError {
    ClientError::UnexpectedStatus {
        status: StatusCode::BAD_GATEWAY,
        body: "upstream unavailable".to_string(),
    }
}

fn unauthorized() -> ClientError {
    ClientError::Unauthorized {
        status: StatusCode::UNAUTHORIZED,
        body: "invalid key".to_string(),
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch_documents_by_status(
        &self,
        status: StatusDocument,
        batch_type: Option<BatchType>,
        page: u32,
        limit: u32,
    ) -> Result<DocumentPage, ClientError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_filters
            .lock()
            .unwrap()
            .push((status, batch_type, page, limit));
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }

        let step = self
            .fetches
            .lock()
            .unwrap()
            .get_mut(&status)
            .and_then(VecDeque::pop_front)
            .unwrap_or(FetchStep::Page(Vec::new()));

        match step {
            FetchStep::Page(ids) => Ok(DocumentPage {
                total: ids.len() as u64,
                documents: ids.into_iter().map(|id| document(id, status)).collect(),
            }),
            FetchStep::Fail => Err(server_error()),
            FetchStep::Unauthorized => Err(unauthorized()),
        }
    }

    async fn upload_file(
        &self,
        _batch_id: &str,
        file: &FileRef,
    ) -> Result<UploadReceipt, ClientError> {
        let filename = file.filename().to_string();
        *self
            .upload_calls
            .lock()
            .unwrap()
            .entry(filename.clone())
            .or_default() += 1;

        let delay = self.upload_delays.lock().unwrap().get(&filename).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let step = self
            .uploads
            .lock()
            .unwrap()
            .get_mut(&filename)
            .and_then(VecDeque::pop_front)
            .unwrap_or(UploadStep::Accept);

        match step {
            UploadStep::Accept => Ok(UploadReceipt::Accepted {
                uuid: format!("uuid-{filename}"),
            }),
            UploadStep::Refuse(message) => Ok(UploadReceipt::Refused {
                message: message.to_string(),
            }),
            UploadStep::Fail => Err(server_error()),
            UploadStep::Unauthorized => Err(unauthorized()),
        }
    }
}
