//! Files handed to the upload pipeline.

use crate::mime;
use std::path::Path;

/// Where the bytes of a file come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// The service downloads the file itself; no bytes leave the client.
    Url(String),
    /// Raw payload sent as a multipart part.
    Bytes(Vec<u8>),
}

/// A file to append to a batch, tagged with its document type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    source: FileSource,
    filename: String,
    mime_type: String,
    type_document: String,
}

impl FileRef {
    /// Reference a remote file. The filename is the last URL path segment and the MIME type is
    /// guessed from its extension.
    pub fn url(url: impl Into<String>, type_document: impl Into<String>) -> Self {
        let url = url.into();
        let filename = filename_from_url(&url);
        let mime_type = mime::guess_from_name(&filename);
        Self {
            source: FileSource::Url(url),
            filename,
            mime_type,
            type_document: type_document.into(),
        }
    }

    /// Wrap an in-memory payload.
    pub fn bytes(
        data: Vec<u8>,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        type_document: impl Into<String>,
    ) -> Self {
        Self {
            source: FileSource::Bytes(data),
            filename: filename.into(),
            mime_type: mime_type.into(),
            type_document: type_document.into(),
        }
    }

    /// Read a local file, sniffing its MIME type from content and falling back to the extension.
    pub async fn from_path(
        path: impl AsRef<Path>,
        type_document: impl Into<String>,
    ) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let mime_type = mime::sniff(&data).unwrap_or_else(|| mime::guess_from_name(&filename));
        tracing::debug!(path = %path.display(), %mime_type, size = data.len(), "Loaded local file");
        Ok(Self::bytes(data, filename, mime_type, type_document))
    }

    /// Override the filename sent to the service.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Override the declared MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Payload source.
    pub fn source(&self) -> &FileSource {
        &self.source
    }

    /// Filename reported to the service.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Declared MIME type.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Document type identifier the service classifies the file under.
    pub fn type_document(&self) -> &str {
        &self.type_document
    }
}

fn filename_from_url(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .unwrap_or("file")
        .to_string()
}
