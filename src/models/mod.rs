//! Domain types exchanged with the document-processing service.

pub mod document;
pub mod file;
pub mod search;

pub use document::{BatchType, Document, DocumentPage, DocumentType, Entity, StatusDocument};
pub use file::{FileRef, FileSource};
pub use search::{
    EntityDocumentExtractor, EntityTextExtractor, ExtractedEntities, FormattedHit, Hit, HitMeta,
    ResultsSearch, Search, SearchDocument, SearchKind, SearchParameters, SearchResult,
};
