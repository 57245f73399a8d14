//! Retrieval units and source attribution.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Document categories recognized by the retrieval filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Bill,
    Hansard,
    Vote,
    Member,
    Report,
    Other,
}

impl DocumentType {
    /// Wire representation used in vector store payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bill => "bill",
            Self::Hansard => "hansard",
            Self::Vote => "vote",
            Self::Member => "member",
            Self::Report => "report",
            Self::Other => "other",
        }
    }

    /// Parse a document type, falling back to `Other` for unknown values.
    pub fn parse_or_other(s: &str) -> Self {
        match s {
            "bill" => Self::Bill,
            "hansard" => Self::Hansard,
            "vote" => Self::Vote,
            "member" => Self::Member,
            "report" => Self::Report,
            _ => Self::Other,
        }
    }
}

/// A text span produced by ingestion, stored with an embedding and metadata.
///
/// Metadata may include `date`, `document_type`, `source_name`, `source_url`,
/// and `source_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: Uuid,
    pub document_id: Uuid,
    pub text: String,

    /// Order within the source document.
    pub position: usize,

    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Chunk {
    /// Create a chunk with a fresh id and empty metadata.
    pub fn new(document_id: Uuid, text: impl Into<String>, position: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            text: text.into(),
            position,
            metadata: HashMap::new(),
        }
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A deduplicated document citation derived from retrieved chunks.
///
/// Sources are always derived from chunk metadata, never from LLM output,
/// so citations cannot be hallucinated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReference {
    pub document_id: String,
    pub source_name: String,
    pub source_url: Option<String>,
    pub source_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_roundtrip() {
        assert_eq!(DocumentType::parse_or_other("hansard"), DocumentType::Hansard);
        assert_eq!(DocumentType::parse_or_other("press_release"), DocumentType::Other);
        assert_eq!(DocumentType::Vote.as_str(), "vote");
    }

    #[test]
    fn test_chunk_metadata_builder() {
        let chunk = Chunk::new(Uuid::new_v4(), "text", 0).with_metadata("date", "2024-01-01");
        assert_eq!(chunk.metadata.get("date").map(String::as_str), Some("2024-01-01"));
    }
}
