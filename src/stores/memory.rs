//! In-memory storage implementations for testing and development.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::cache::Cache;
use crate::traits::store::{cosine_similarity, SearchFilters, VectorStore};
use crate::types::chunk::Chunk;
use crate::types::result::RagResult;

/// In-memory vector store with brute-force cosine search.
///
/// Useful for testing and development. Not suitable for production as
/// data is lost on restart and search is O(n).
#[derive(Default)]
pub struct MemoryVectorStore {
    entries: RwLock<Vec<(Vec<f32>, Chunk)>>,
}

impl MemoryVectorStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a chunk with its embedding.
    pub fn add(&self, embedding: Vec<f32>, chunk: Chunk) {
        self.entries.write().unwrap().push((embedding, chunk));
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// Remove all indexed chunks.
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }
}

fn matches_filters(chunk: &Chunk, filters: &SearchFilters) -> bool {
    if !filters.document_types.is_empty() {
        let document_type = chunk.metadata.get("document_type").map(String::as_str);
        let matched = filters
            .document_types
            .iter()
            .any(|dt| Some(dt.as_str()) == document_type);
        if !matched {
            return false;
        }
    }

    if filters.date_from.is_some() || filters.date_to.is_some() {
        let Some(date) = chunk.metadata.get("date") else {
            return false;
        };
        if let Some(from) = &filters.date_from {
            if date.as_str() < from.as_str() {
                return false;
            }
        }
        if let Some(to) = &filters.date_to {
            if date.as_str() > to.as_str() {
                return false;
            }
        }
    }

    true
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn search(
        &self,
        vector: &[f32],
        k: usize,
        filters: Option<&SearchFilters>,
    ) -> Result<Vec<Chunk>> {
        let entries = self.entries.read().unwrap();

        let mut scored: Vec<(f32, &Chunk)> = entries
            .iter()
            .filter(|(_, chunk)| filters.map_or(true, |f| matches_filters(chunk, f)))
            .map(|(embedding, chunk)| (cosine_similarity(vector, embedding), chunk))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored.into_iter().take(k).map(|(_, c)| c.clone()).collect())
    }
}

/// In-memory TTL cache for pipeline results.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (RagResult, Instant)>>,
}

impl MemoryCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries (expired entries included until read).
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<RagResult>> {
        let mut entries = self.entries.write().unwrap();

        match entries.get(key) {
            Some((_, expires)) if *expires <= Instant::now() => {
                entries.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &RagResult, ttl_seconds: u64) -> Result<()> {
        let expires = Instant::now() + Duration::from_secs(ttl_seconds);
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), (value.clone(), expires));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}
