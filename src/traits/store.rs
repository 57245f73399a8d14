//! Vector store capability.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::chunk::{Chunk, DocumentType};

/// Filters applied to a vector search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    /// Match chunks whose `document_type` is any of these.
    pub document_types: Vec<DocumentType>,

    /// Inclusive lower bound on the chunk `date` payload (`YYYY-MM-DD`).
    pub date_from: Option<String>,

    /// Inclusive upper bound on the chunk `date` payload (`YYYY-MM-DD`).
    pub date_to: Option<String>,
}

impl SearchFilters {
    /// Whether no filter condition is set.
    pub fn is_empty(&self) -> bool {
        self.document_types.is_empty() && self.date_from.is_none() && self.date_to.is_none()
    }
}

/// Vector store capability.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Search for the `k` chunks most similar to `vector`, in descending
    /// similarity order. `YYYY-MM-DD` string ordering is assumed for the
    /// date range filter.
    async fn search(
        &self,
        vector: &[f32],
        k: usize,
        filters: Option<&SearchFilters>,
    ) -> Result<Vec<Chunk>>;
}

#[async_trait]
impl<T: VectorStore + ?Sized> VectorStore for std::sync::Arc<T> {
    async fn search(
        &self,
        vector: &[f32],
        k: usize,
        filters: Option<&SearchFilters>,
    ) -> Result<Vec<Chunk>> {
        (**self).search(vector, k, filters).await
    }
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched dimensions or zero-magnitude vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}
