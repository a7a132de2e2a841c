//! Documents, statuses and batch metadata returned by the service.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Processing status of a document as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusDocument {
    /// Uploaded and queued for processing.
    WaitingProcess,
    /// Text extraction in progress.
    #[serde(rename = "working_extractor")]
    WorkingOcr,
    /// Extraction finished.
    Processed,
    /// Pipeline finished.
    Complete,
    /// The remote file could not be downloaded.
    #[serde(rename = "error_download_link")]
    ErrorLink,
    /// Extraction failed.
    #[serde(rename = "error_on_extraction")]
    ErrorOcr,
    /// Assigned to a reviewer.
    Assigned,
    /// Awaiting quality assurance.
    WaitingQa,
    /// Quality assurance in progress.
    WorkingQa,
    /// Quality assurance finished.
    #[serde(rename = "complete_qa")]
    QaComplete,
    /// No pipeline is configured for the document type.
    NoPipelineDefined,
    /// Rejected during review.
    Rejected,
    /// Under human review.
    InReview,
    /// Human review finished.
    Reviewed,
    /// Assignment failed.
    WithErrorOnAssign,
}

impl StatusDocument {
    /// Every status known to the service, in lifecycle order.
    pub const ALL: [StatusDocument; 15] = [
        Self::WaitingProcess,
        Self::WorkingOcr,
        Self::Processed,
        Self::Complete,
        Self::ErrorLink,
        Self::ErrorOcr,
        Self::Assigned,
        Self::WaitingQa,
        Self::WorkingQa,
        Self::QaComplete,
        Self::NoPipelineDefined,
        Self::Rejected,
        Self::InReview,
        Self::Reviewed,
        Self::WithErrorOnAssign,
    ];

    /// Wire representation used in URLs and payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WaitingProcess => "waiting_process",
            Self::WorkingOcr => "working_extractor",
            Self::Processed => "processed",
            Self::Complete => "complete",
            Self::ErrorLink => "error_download_link",
            Self::ErrorOcr => "error_on_extraction",
            Self::Assigned => "assigned",
            Self::WaitingQa => "waiting_qa",
            Self::WorkingQa => "working_qa",
            Self::QaComplete => "complete_qa",
            Self::NoPipelineDefined => "no_pipeline_defined",
            Self::Rejected => "rejected",
            Self::InReview => "in_review",
            Self::Reviewed => "reviewed",
            Self::WithErrorOnAssign => "with_error_on_assign",
        }
    }
}

impl fmt::Display for StatusDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusDocument {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("unknown document status '{s}'"))
    }
}

/// Kind of batch a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchType {
    /// Production batches.
    Execution,
    /// Batches used to try out pipelines.
    Testing,
}

impl BatchType {
    /// Wire representation used in URLs and payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Execution => "execution",
            Self::Testing => "testing",
        }
    }
}

impl fmt::Display for BatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "execution" => Ok(Self::Execution),
            "testing" => Ok(Self::Testing),
            other => Err(format!(
                "invalid batch type '{other}', expected 'execution' or 'testing'"
            )),
        }
    }
}

/// Entity extracted from a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity identifier.
    pub id: String,
    /// Schema key the entity answers.
    pub key: String,
    /// Extracted value.
    pub value: String,
    /// Page the value was found on.
    pub page: i64,
    /// Identifier of the extraction core that produced it.
    pub id_core: String,
    /// Whether a reviewer accepted the value.
    pub is_valid: bool,
}

/// Document metadata as returned by the listing endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Service identifier, used for listener deduplication.
    pub id: String,
    /// Batch the document was appended to.
    pub batch_id: String,
    /// Owning user.
    pub user: String,
    /// Document UUID used by the per-document endpoints.
    pub uuid: String,
    /// Source URL of the stored file.
    pub url: String,
    /// Original file name.
    pub file_name: String,
    /// Declared document type identifier.
    pub type_document: String,
    /// Current status, kept verbatim.
    pub status_document: String,
    /// Upload timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub uploaded: OffsetDateTime,
    /// Review timestamp, absent until a reviewer touches the document.
    #[serde(
        default,
        deserialize_with = "deserialize_review_timestamp",
        serialize_with = "time::serde::rfc3339::option::serialize"
    )]
    pub reviewed_at: Option<OffsetDateTime>,
    /// Source kind reported by the service.
    #[serde(default)]
    pub source_type: String,
    /// Extracted entities, present only when the service includes them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<Entity>>,
}

/// One page of documents plus the total across all pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentPage {
    /// Documents in server order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub documents: Vec<Document>,
    /// Total number of matching documents.
    #[serde(default)]
    pub total: u64,
}

/// Document type configured for the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentType {
    /// Record identifier.
    pub id: String,
    /// Owning user.
    pub user: String,
    /// Human readable key.
    pub key: String,
    /// Identifier to pass as `type_document` on upload.
    pub id_type_document: String,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
}

// Unreviewed documents carry the zero timestamp `0001-01-01T00:00:00Z`.
fn deserialize_review_timestamp<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
        return Ok(None);
    };
    let parsed = OffsetDateTime::parse(&raw, &time::format_description::well_known::Rfc3339)
        .map_err(serde::de::Error::custom)?;
    if parsed.year() <= 1 {
        Ok(None)
    } else {
        Ok(Some(parsed))
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
