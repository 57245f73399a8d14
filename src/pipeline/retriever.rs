//! Intent-driven context retrieval.
//!
//! Four strategies, selected by the planner:
//! - `single_focus`: one embedding search with intent-derived filters
//! - `multi_entity`: parallel searches per rewritten query, merged and deduped
//! - `chronological`: filtered search sorted ascending by chunk date
//! - `broad`: wider search keeping only the document-type filter

use std::collections::HashSet;

use futures::future::join_all;
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::Result;
use crate::traits::embed::Embedder;
use crate::traits::store::{SearchFilters, VectorStore};
use crate::types::chunk::Chunk;
use crate::types::intent::{Intent, RetrievalStrategy};
use crate::types::result::RetrievalResult;

/// Chunks without a date sort after every real `YYYY-MM-DD` value.
const MISSING_DATE_SENTINEL: &str = "9999-99-99";

/// Retriever that lets the classified intent pick the search strategy.
pub struct IntentRetriever<E, S> {
    embedder: E,
    store: S,
    default_top_k: usize,
    min_chunks_for_sufficiency: usize,
}

impl<E: Embedder, S: VectorStore> IntentRetriever<E, S> {
    pub fn new(embedder: E, store: S) -> Self {
        Self {
            embedder,
            store,
            default_top_k: 10,
            min_chunks_for_sufficiency: 3,
        }
    }

    /// Set the per-search result count.
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.default_top_k = k;
        self
    }

    /// Set the sufficiency threshold.
    pub fn with_min_chunks(mut self, min: usize) -> Self {
        self.min_chunks_for_sufficiency = min;
        self
    }

    /// Retrieve context chunks for a query under its classified intent.
    pub async fn retrieve(&self, query: &str, intent: &Intent) -> Result<RetrievalResult> {
        let strategy = intent.retrieval_strategy;
        debug!(strategy = strategy.as_str(), "Retrieving context");

        match strategy {
            RetrievalStrategy::MultiEntity => self.retrieve_multi_entity(query, intent).await,
            RetrievalStrategy::Chronological => self.retrieve_chronological(query, intent).await,
            RetrievalStrategy::Broad => self.retrieve_broad(query, intent).await,
            RetrievalStrategy::SingleFocus => self.retrieve_single_focus(query, intent).await,
        }
    }

    /// Standard single embedding search.
    async fn retrieve_single_focus(&self, query: &str, intent: &Intent) -> Result<RetrievalResult> {
        let embedding = self.embedder.embed_single(query).await?;
        let filters = build_filters(intent);

        let chunks = self
            .store
            .search(&embedding, self.default_top_k, filters.as_ref())
            .await?;

        Ok(self.finish(
            chunks,
            RetrievalStrategy::SingleFocus,
            IndexMap::new(),
            "Few relevant documents found",
        ))
    }

    /// Parallel searches for each rewritten query, merged and deduped by
    /// chunk id. Merge order is first occurrence across the fan-out, so
    /// results for earlier rewritten queries come first.
    async fn retrieve_multi_entity(&self, query: &str, intent: &Intent) -> Result<RetrievalResult> {
        let rewritten: Vec<&str> = if intent.rewritten_queries.is_empty() {
            vec![query]
        } else {
            intent.rewritten_queries.iter().map(String::as_str).collect()
        };

        let searches = rewritten.iter().map(|rq| self.search_single(rq, intent));
        let results = join_all(searches).await;

        let mut all_chunks: Vec<Chunk> = Vec::new();
        let mut seen_ids = HashSet::new();
        let mut coverage = IndexMap::new();

        for (rq, result) in rewritten.iter().zip(results) {
            let query_chunks = match result {
                Ok(chunks) => chunks,
                Err(e) => {
                    warn!(rewritten_query = rq, error = %e, "Sub-search failed, skipping");
                    continue;
                }
            };

            coverage.insert(
                (*rq).to_string(),
                query_chunks.len() as f32 / self.default_top_k as f32,
            );

            for chunk in query_chunks {
                if seen_ids.insert(chunk.id) {
                    all_chunks.push(chunk);
                }
            }
        }

        all_chunks.truncate(self.default_top_k * 2);

        Ok(self.finish(
            all_chunks,
            RetrievalStrategy::MultiEntity,
            coverage,
            "Limited coverage for some entities",
        ))
    }

    /// Date-filtered search sorted ascending by chunk date; undated chunks
    /// sort last.
    async fn retrieve_chronological(&self, query: &str, intent: &Intent) -> Result<RetrievalResult> {
        let embedding = self.embedder.embed_single(query).await?;
        let filters = build_filters(intent);

        let mut chunks = self
            .store
            .search(&embedding, self.default_top_k, filters.as_ref())
            .await?;

        chunks.sort_by(|a, b| date_key(a).cmp(date_key(b)));

        Ok(self.finish(
            chunks,
            RetrievalStrategy::Chronological,
            IndexMap::new(),
            "Few chronological events found",
        ))
    }

    /// Wider search for analytical queries; only the document-type filter
    /// applies.
    async fn retrieve_broad(&self, query: &str, intent: &Intent) -> Result<RetrievalResult> {
        let embedding = self.embedder.embed_single(query).await?;

        let filters = (!intent.entities.document_types.is_empty()).then(|| SearchFilters {
            document_types: intent.entities.document_types.clone(),
            ..Default::default()
        });

        let chunks = self
            .store
            .search(&embedding, self.default_top_k + 10, filters.as_ref())
            .await?;

        Ok(self.finish(
            chunks,
            RetrievalStrategy::Broad,
            IndexMap::new(),
            "Limited diverse content found",
        ))
    }

    /// One embed + search for a rewritten query; used by the fan-out.
    async fn search_single(&self, rewritten_query: &str, intent: &Intent) -> Result<Vec<Chunk>> {
        let embedding = self.embedder.embed_single(rewritten_query).await?;
        let filters = build_filters(intent);

        self.store
            .search(&embedding, self.default_top_k / 2, filters.as_ref())
            .await
    }

    fn finish(
        &self,
        chunks: Vec<Chunk>,
        strategy: RetrievalStrategy,
        coverage: IndexMap<String, f32>,
        insufficiency_warning: &str,
    ) -> RetrievalResult {
        let is_sufficient = chunks.len() >= self.min_chunks_for_sufficiency;

        RetrievalResult {
            chunks,
            strategy_used: strategy,
            coverage,
            is_sufficient,
            warnings: if is_sufficient {
                Vec::new()
            } else {
                vec![insufficiency_warning.to_string()]
            },
        }
    }
}

/// The sort key for chronological ordering.
fn date_key(chunk: &Chunk) -> &str {
    chunk
        .metadata
        .get("date")
        .map_or(MISSING_DATE_SENTINEL, String::as_str)
}

/// Build vector store filters from intent entities.
fn build_filters(intent: &Intent) -> Option<SearchFilters> {
    let filters = SearchFilters {
        document_types: intent.entities.document_types.clone(),
        date_from: intent.entities.date_from.clone(),
        date_to: intent.entities.date_to.clone(),
    };

    (!filters.is_empty()).then_some(filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockEmbedder, MockVectorStore};
    use crate::types::chunk::DocumentType;
    use crate::types::intent::ExtractedEntities;
    use std::sync::Arc;
    use uuid::Uuid;

    fn chunk_with_date(text: &str, date: Option<&str>) -> Chunk {
        let mut chunk = Chunk::new(Uuid::new_v4(), text, 0);
        if let Some(date) = date {
            chunk = chunk.with_metadata("date", date);
        }
        chunk
    }

    fn intent_with_strategy(strategy: RetrievalStrategy) -> Intent {
        Intent {
            retrieval_strategy: strategy,
            ..Intent::default_factual("test query")
        }
    }

    #[tokio::test]
    async fn test_single_focus_sufficient() {
        let store = Arc::new(MockVectorStore::new().with_results(vec![
            chunk_with_date("a", None),
            chunk_with_date("b", None),
            chunk_with_date("c", None),
        ]));
        let embedder = Arc::new(MockEmbedder::new(8));

        let retriever = IntentRetriever::new(embedder.clone(), store);
        let intent = intent_with_strategy(RetrievalStrategy::SingleFocus);
        let result = retriever.retrieve("test query", &intent).await.unwrap();

        assert!(result.is_sufficient);
        assert_eq!(result.strategy_used, RetrievalStrategy::SingleFocus);
        assert_eq!(embedder.embedded_texts(), vec!["test query"]);
    }

    #[tokio::test]
    async fn test_single_focus_insufficient_attaches_warning() {
        let store = Arc::new(MockVectorStore::new().with_results(vec![chunk_with_date("only", None)]));
        let retriever = IntentRetriever::new(Arc::new(MockEmbedder::new(8)), store);

        let intent = intent_with_strategy(RetrievalStrategy::SingleFocus);
        let result = retriever.retrieve("test query", &intent).await.unwrap();

        assert!(!result.is_sufficient);
        assert_eq!(result.chunks.len(), 1);
        assert!(!result.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_multi_entity_merges_and_dedupes_in_first_occurrence_order() {
        let x = chunk_with_date("x", None);
        let y = chunk_with_date("y", None);
        let z = chunk_with_date("z", None);

        let store = Arc::new(
            MockVectorStore::new()
                .with_results(vec![x.clone(), y.clone()])
                .with_results(vec![y.clone(), z.clone()]),
        );
        let embedder = Arc::new(MockEmbedder::new(8));

        let retriever =
            IntentRetriever::new(embedder.clone(), store).with_min_chunks(2);

        let mut intent = intent_with_strategy(RetrievalStrategy::MultiEntity);
        intent.rewritten_queries = vec!["A".to_string(), "B".to_string()];

        let result = retriever.retrieve("compare", &intent).await.unwrap();

        let ids: Vec<_> = result.chunks.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![x.id, y.id, z.id]);
        assert_eq!(embedder.embedded_texts(), vec!["A", "B"]);
        assert_eq!(result.coverage.len(), 2);
    }

    #[tokio::test]
    async fn test_multi_entity_skips_failed_sub_search() {
        let x = chunk_with_date("x", None);
        let y = chunk_with_date("y", None);
        let z = chunk_with_date("z", None);

        // First search fails; the second still contributes
        let store = Arc::new(
            MockVectorStore::new()
                .with_error("index offline")
                .with_results(vec![x, y, z]),
        );

        let retriever = IntentRetriever::new(Arc::new(MockEmbedder::new(8)), store);
        let mut intent = intent_with_strategy(RetrievalStrategy::MultiEntity);
        intent.rewritten_queries = vec!["A".to_string(), "B".to_string()];

        let result = retriever.retrieve("compare", &intent).await.unwrap();

        assert_eq!(result.chunks.len(), 3);
        assert_eq!(result.coverage.len(), 1);
        assert!(result.coverage.contains_key("B"));
    }

    #[tokio::test]
    async fn test_multi_entity_requests_half_k() {
        let store = Arc::new(MockVectorStore::new().with_results(vec![]));
        let retriever =
            IntentRetriever::new(Arc::new(MockEmbedder::new(8)), store.clone()).with_top_k(10);

        let mut intent = intent_with_strategy(RetrievalStrategy::MultiEntity);
        intent.rewritten_queries = vec!["A".to_string()];

        retriever.retrieve("q", &intent).await.unwrap();

        assert_eq!(store.search_ks(), vec![5]);
    }

    #[tokio::test]
    async fn test_chronological_sorts_by_date_missing_last() {
        let store = Arc::new(MockVectorStore::new().with_results(vec![
            chunk_with_date("march", Some("2024-03-01")),
            chunk_with_date("january", Some("2024-01-01")),
            chunk_with_date("undated", None),
            chunk_with_date("february", Some("2024-02-01")),
        ]));

        let retriever = IntentRetriever::new(Arc::new(MockEmbedder::new(8)), store);
        let intent = intent_with_strategy(RetrievalStrategy::Chronological);
        let result = retriever.retrieve("history", &intent).await.unwrap();

        let texts: Vec<_> = result.chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["january", "february", "march", "undated"]);
    }

    #[tokio::test]
    async fn test_broad_requests_extra_chunks_and_drops_date_filters() {
        let store = Arc::new(MockVectorStore::new().with_results(vec![]));
        let retriever =
            IntentRetriever::new(Arc::new(MockEmbedder::new(8)), store.clone()).with_top_k(10);

        let mut intent = intent_with_strategy(RetrievalStrategy::Broad);
        intent.entities = ExtractedEntities {
            document_types: vec![DocumentType::Report],
            date_from: Some("2024-01-01".to_string()),
            ..Default::default()
        };

        retriever.retrieve("analysis", &intent).await.unwrap();

        assert_eq!(store.search_ks(), vec![20]);
        let filters = store.search_filters();
        let filter = filters[0].as_ref().unwrap();
        assert_eq!(filter.document_types, vec![DocumentType::Report]);
        assert_eq!(filter.date_from, None);
    }

    #[tokio::test]
    async fn test_build_filters() {
        let mut intent = intent_with_strategy(RetrievalStrategy::SingleFocus);
        intent.entities = ExtractedEntities {
            document_types: vec![DocumentType::Vote, DocumentType::Bill],
            date_from: Some("2024-01-01".to_string()),
            date_to: Some("2024-12-31".to_string()),
            ..Default::default()
        };

        let filters = build_filters(&intent).unwrap();
        assert_eq!(filters.document_types, vec![DocumentType::Vote, DocumentType::Bill]);
        assert_eq!(filters.date_from.as_deref(), Some("2024-01-01"));
        assert_eq!(filters.date_to.as_deref(), Some("2024-12-31"));

        let empty = build_filters(&intent_with_strategy(RetrievalStrategy::SingleFocus));
        assert!(empty.is_none());
    }
}
