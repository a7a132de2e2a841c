//! Request and response shapes for search and entity extraction.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of search executed against a brain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    /// Embedding similarity.
    Semantic,
    /// Exact term matching.
    Literal,
}

/// Parameters for a brain search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParameters {
    /// Brain (batch) identifier.
    pub batch: String,
    /// Query text.
    pub param: String,
    /// Number of results to return.
    pub k: u32,
    /// Search kind.
    pub type_search: SearchKind,
}

/// A single brain search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Document UUID the hit belongs to.
    pub uuid: String,
    /// Matched content.
    pub content: String,
    /// Optional source name.
    #[serde(default)]
    pub name: Option<String>,
    /// Source reference; the service sends either a page number or a string.
    #[serde(default)]
    pub source: Value,
    /// Number of literal coincidences.
    #[serde(default)]
    pub coincidences: i64,
    /// Relevance score.
    #[serde(default)]
    pub score: f64,
}

/// Results of a brain search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsSearch {
    /// Hits in relevance order.
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// Full-text search inside one processed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Search {
    /// Query text.
    pub matches: String,
    /// Document UUID.
    pub uuid: String,
    /// Maximum number of hits.
    pub max_results: u32,
}

/// Hit metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitMeta {
    /// Source name.
    #[serde(default)]
    pub name: String,
    /// Source page.
    #[serde(default)]
    pub source: i64,
}

/// Highlighted version of a hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormattedHit {
    /// Highlighted content.
    #[serde(default)]
    pub content: String,
    /// Hit identifier as text.
    #[serde(default)]
    pub id: String,
    /// Hit metadata.
    #[serde(default)]
    pub meta: HitMeta,
}

/// One full-text hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Highlighted content.
    #[serde(rename = "_formatted", default)]
    pub formatted: FormattedHit,
    /// Raw content.
    pub content: String,
    /// Hit identifier.
    pub id: i64,
    /// Hit metadata.
    #[serde(default)]
    pub meta: HitMeta,
}

/// Result of a search inside a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocument {
    /// Hits in relevance order.
    #[serde(default)]
    pub hits: Vec<Hit>,
    /// Estimated number of hits.
    #[serde(default)]
    pub estimated_total_hits: u64,
    /// Applied limit.
    #[serde(default)]
    pub limit: u64,
    /// Server-side processing time.
    #[serde(default)]
    pub processing_time_ms: u64,
    /// Echoed query.
    #[serde(default)]
    pub query: String,
}

/// Extraction request over free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTextExtractor {
    /// Text to extract from.
    pub text: String,
    /// Extraction schema, either a JSON object of keys or a textual description.
    pub schema: Value,
}

/// Extraction request over a processed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDocumentExtractor {
    /// Passage selector inside the document.
    pub matches: String,
    /// Extraction schema, either a JSON object of keys or a textual description.
    pub schema: Value,
}

/// Extracted entities keyed by schema field.
pub type ExtractedEntities = Map<String, Value>;
