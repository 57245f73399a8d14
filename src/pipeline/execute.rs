//! The pipeline orchestrator.
//!
//! Sequences cache lookup, planning, retrieval, parallel extraction,
//! composition, optional verification, source aggregation, costing, and the
//! cache write. Never raises to its caller: every failure path yields a
//! structured result.

use std::time::Instant;

use futures::future::join_all;
use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::Result;
use crate::pipeline::composer::ResponseComposer;
use crate::pipeline::extractor::DataExtractor;
use crate::pipeline::planner::QueryPlanner;
use crate::pipeline::retriever::IntentRetriever;
use crate::pipeline::verifier::ResponseVerifier;
use crate::traits::cache::Cache;
use crate::traits::embed::Embedder;
use crate::traits::llm::LlmClient;
use crate::traits::store::VectorStore;
use crate::types::chunk::{Chunk, SourceReference};
use crate::types::component::{
    Component, Layout, Notice, NoticeLevel, Section, TextBlock, TextFormat,
};
use crate::types::config::PipelineConfig;
use crate::types::cost::CostBreakdown;
use crate::types::intent::RetrievalStrategy;
use crate::types::query::Query;
use crate::types::result::{QueryMetadata, RagResult, RetrievalResult, VerificationResult};

/// Result of one pipeline execution.
#[derive(Debug, Clone)]
pub struct ExecuteQueryResult {
    pub result: RagResult,
    pub cost: CostBreakdown,
}

/// The agent-based RAG pipeline.
///
/// 1. Planner classifies intent and extracts entities
/// 2. Retriever gathers context using intent-driven strategies
/// 3. Extractor pulls grounded data from context for each component
/// 4. Composer formats extracted data into a typed layout
/// 5. Verifier (optional) checks claims against context
pub struct QueryPipeline<L, E, S, C> {
    planner: QueryPlanner<L>,
    retriever: IntentRetriever<E, S>,
    extractor: DataExtractor<L>,
    composer: ResponseComposer<L>,
    verifier: Option<ResponseVerifier<L>>,
    cache: C,
    config: PipelineConfig,
}

impl<L, E, S, C> QueryPipeline<L, E, S, C>
where
    L: LlmClient,
    E: Embedder,
    S: VectorStore,
    C: Cache,
{
    /// Build a pipeline sharing one LLM client across all agents.
    ///
    /// Use [`QueryPipeline::from_parts`] to give agents individually
    /// configured clients (different models or temperatures).
    pub fn new(llm: L, embedder: E, store: S, cache: C, config: PipelineConfig) -> Self
    where
        L: Clone,
    {
        let retriever = IntentRetriever::new(embedder, store)
            .with_top_k(config.default_top_k)
            .with_min_chunks(config.min_chunks_for_sufficiency);

        Self {
            planner: QueryPlanner::new(llm.clone()),
            retriever,
            extractor: DataExtractor::new(llm.clone()),
            composer: ResponseComposer::new(llm.clone()),
            verifier: config.verifier_enabled.then(|| ResponseVerifier::new(llm)),
            cache,
            config,
        }
    }

    /// Build a pipeline from individually constructed agents.
    pub fn from_parts(
        planner: QueryPlanner<L>,
        retriever: IntentRetriever<E, S>,
        extractor: DataExtractor<L>,
        composer: ResponseComposer<L>,
        verifier: Option<ResponseVerifier<L>>,
        cache: C,
        config: PipelineConfig,
    ) -> Self {
        Self {
            planner,
            retriever,
            extractor,
            composer,
            verifier,
            cache,
            config,
        }
    }

    /// Execute the pipeline for a query. Never fails; every error path
    /// yields a structured result with a warning notice.
    pub async fn execute(&self, query: &Query) -> ExecuteQueryResult {
        let start = Instant::now();
        let cache_key = self.cache.query_key(query);

        match self.cache.get(&cache_key).await {
            Ok(Some(mut cached)) => {
                debug!(key = %cache_key, "Cache hit");
                cached.cached = true;
                return ExecuteQueryResult {
                    result: cached,
                    cost: CostBreakdown::zero(),
                };
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Cache lookup failed, proceeding uncached"),
        }

        match self.run(query, &cache_key, start).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Pipeline error");
                self.error_response(start)
            }
        }
    }

    /// Execute with cooperative cancellation. A cancelled request yields
    /// the error response rather than a partial result.
    pub async fn execute_with_cancel(
        &self,
        query: &Query,
        cancel: CancellationToken,
    ) -> ExecuteQueryResult {
        let start = Instant::now();

        tokio::select! {
            result = self.execute(query) => result,
            _ = cancel.cancelled() => self.error_response(start),
        }
    }

    async fn run(
        &self,
        query: &Query,
        cache_key: &str,
        start: Instant,
    ) -> Result<ExecuteQueryResult> {
        // Step 1: Plan
        let intent = self.planner.analyze(&query.text).await;
        debug!(
            query_type = intent.query_type.as_str(),
            components = ?intent.expected_components,
            "Planned"
        );

        // Step 2: Retrieve
        let retrieval = self.retriever.retrieve(&query.text, &intent).await?;

        // Step 3: Sufficiency gate
        if !retrieval.is_sufficient {
            return Ok(self.insufficient_data_response(query, &retrieval, start));
        }

        // Step 4: Extract, one task per expected component
        let context = retrieval.context_texts();
        let extraction_tasks = intent
            .expected_components
            .iter()
            .map(|component_type| self.extractor.extract(component_type, &context, &intent));
        let extractions = join_all(extraction_tasks).await;

        for extraction in &extractions {
            debug!(
                component_type = %extraction.component_type,
                completeness = extraction.completeness,
                "Extracted"
            );
        }

        // Step 5: Compose
        let (layout, mut components, usage) =
            match self.composer.compose(&query.text, &intent, &extractions).await {
                Ok(output) => output,
                Err(e) => {
                    warn!(error = %e, "Composer failed");
                    return Ok(self.composer_fallback_response(start));
                }
            };

        let model_used = if usage.model.is_empty() {
            "unknown".to_string()
        } else {
            usage.model.clone()
        };

        // Step 6: Verify
        if let Some(verifier) = &self.verifier {
            if !context.is_empty() {
                let verification = verifier.verify(&layout, &components, &context).await;
                if !verification.is_valid {
                    warn!(
                        claims = verification.unsupported_claims.len(),
                        "Verification found issues"
                    );
                }
                components = annotate_unsupported_claims(components, &verification);
            }
        }

        // Step 7: Aggregate sources and cost
        let sources = aggregate_sources(&retrieval.chunks);
        let documents_retrieved = sources.len();

        let embedding_tokens =
            query.text.split_whitespace().count() as u64 * intent.rewritten_queries.len() as u64;
        let vector_queries = if intent.retrieval_strategy == RetrievalStrategy::MultiEntity {
            intent.rewritten_queries.len() as u64
        } else {
            1
        };

        let cost = CostBreakdown::calculate(
            embedding_tokens,
            usage.input_tokens,
            usage.output_tokens,
            vector_queries,
            self.config.cost_margin,
        );

        let result = RagResult {
            layout,
            components,
            metadata: QueryMetadata {
                documents_retrieved,
                chunks_used: retrieval.chunks.len(),
                processing_time_ms: start.elapsed().as_millis() as u64,
                model: model_used,
            },
            sources,
            cached: false,
            cost: cost.clone(),
        };

        // Step 8: Cache
        if let Err(e) = self
            .cache
            .set(cache_key, &result, self.config.cache_ttl_seconds)
            .await
        {
            warn!(error = %e, "Cache write failed");
        }

        Ok(ExecuteQueryResult { result, cost })
    }

    /// Response when retrieval found too little context. Not cached.
    fn insufficient_data_response(
        &self,
        query: &Query,
        retrieval: &RetrievalResult,
        start: Instant,
    ) -> ExecuteQueryResult {
        let warning_text = if retrieval.warnings.is_empty() {
            "Limited relevant information found.".to_string()
        } else {
            retrieval.warnings.join("; ")
        };

        let notice = Component::create(Notice {
            message: format!("Unable to fully answer this query: {warning_text}"),
            level: NoticeLevel::Warning,
            title: Some("Limited Information".to_string()),
        });

        let text = Component::create(TextBlock {
            content: format!(
                "The query '{}' could not be fully answered. Try:\n\
                 - Using different keywords\n\
                 - Narrowing the date range\n\
                 - Specifying particular politicians or parties",
                query.text
            ),
            title: None,
            format: TextFormat::Markdown,
        });

        let section = Section {
            component_ids: vec![notice.id, text.id],
            title: None,
            layout: None,
        };

        let result = RagResult {
            layout: Layout {
                sections: vec![section],
                title: Some("Unable to Answer Query".to_string()),
                subtitle: Some("Insufficient information available".to_string()),
            },
            components: vec![notice, text],
            metadata: QueryMetadata {
                documents_retrieved: 0,
                chunks_used: 0,
                processing_time_ms: start.elapsed().as_millis() as u64,
                model: "none".to_string(),
            },
            sources: Vec::new(),
            cached: false,
            cost: CostBreakdown::zero(),
        };

        ExecuteQueryResult {
            result,
            cost: CostBreakdown::zero(),
        }
    }

    /// Response when the composer's LLM call failed outright. Not cached.
    fn composer_fallback_response(&self, start: Instant) -> ExecuteQueryResult {
        let text = Component::create(TextBlock {
            content: "An error occurred while generating the response. Please try again."
                .to_string(),
            title: None,
            format: TextFormat::Markdown,
        });

        let section = Section {
            component_ids: vec![text.id],
            title: None,
            layout: None,
        };

        let result = RagResult {
            layout: Layout {
                sections: vec![section],
                title: Some("Error".to_string()),
                subtitle: None,
            },
            components: vec![text],
            metadata: QueryMetadata {
                documents_retrieved: 0,
                chunks_used: 0,
                processing_time_ms: start.elapsed().as_millis() as u64,
                model: "error".to_string(),
            },
            sources: Vec::new(),
            cached: false,
            cost: CostBreakdown::zero(),
        };

        ExecuteQueryResult {
            result,
            cost: CostBreakdown::zero(),
        }
    }

    /// Response for any unhandled pipeline failure. Not cached.
    fn error_response(&self, start: Instant) -> ExecuteQueryResult {
        let notice = Component::create(Notice {
            message: "An error occurred while processing your query. Please try again."
                .to_string(),
            level: NoticeLevel::Warning,
            title: Some("Error".to_string()),
        });

        let section = Section {
            component_ids: vec![notice.id],
            title: None,
            layout: None,
        };

        let result = RagResult {
            layout: Layout {
                sections: vec![section],
                title: Some("Error Processing Query".to_string()),
                subtitle: None,
            },
            components: vec![notice],
            metadata: QueryMetadata {
                documents_retrieved: 0,
                chunks_used: 0,
                processing_time_ms: start.elapsed().as_millis() as u64,
                model: "error".to_string(),
            },
            sources: Vec::new(),
            cached: false,
            cost: CostBreakdown::zero(),
        };

        ExecuteQueryResult {
            result,
            cost: CostBreakdown::zero(),
        }
    }
}

/// Insert a verification notice when any unsupported claim carries error
/// severity. Components are never removed.
fn annotate_unsupported_claims(
    mut components: Vec<Component>,
    verification: &VerificationResult,
) -> Vec<Component> {
    if !verification.has_errors() {
        return components;
    }

    let notice = Component::create(Notice {
        message: "Some information could not be fully verified against source documents. \
                  Please verify critical facts independently."
            .to_string(),
        level: NoticeLevel::Warning,
        title: Some("Verification Warning".to_string()),
    });

    let index = 1.min(components.len());
    components.insert(index, notice);
    components
}

/// Deduplicate chunk document ids into source references, first occurrence
/// first. Metadata drives the citation fields.
fn aggregate_sources(chunks: &[Chunk]) -> Vec<SourceReference> {
    let mut seen: IndexMap<String, SourceReference> = IndexMap::new();

    for chunk in chunks {
        let doc_id = chunk.document_id.to_string();
        seen.entry(doc_id.clone()).or_insert_with(|| SourceReference {
            document_id: doc_id,
            source_name: chunk
                .metadata
                .get("source_name")
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string()),
            source_url: chunk.metadata.get("source_url").cloned(),
            source_date: chunk.metadata.get("source_date").cloned(),
        });
    }

    seen.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::result::{ClaimSeverity, UnsupportedClaim};
    use uuid::Uuid;

    fn notice_component() -> Component {
        Component::create(Notice {
            message: "m".to_string(),
            level: NoticeLevel::Info,
            title: None,
        })
    }

    #[test]
    fn test_aggregate_sources_dedupes_by_document() {
        let doc_a = Uuid::new_v4();
        let doc_b = Uuid::new_v4();

        let chunks = vec![
            Chunk::new(doc_a, "one", 0).with_metadata("source_name", "Hansard"),
            Chunk::new(doc_a, "two", 1).with_metadata("source_name", "Hansard"),
            Chunk::new(doc_b, "three", 0)
                .with_metadata("source_name", "Votes")
                .with_metadata("source_url", "https://example.com/votes"),
        ];

        let sources = aggregate_sources(&chunks);

        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].source_name, "Hansard");
        assert_eq!(sources[1].source_name, "Votes");
        assert_eq!(sources[1].source_url.as_deref(), Some("https://example.com/votes"));
    }

    #[test]
    fn test_aggregate_sources_defaults_unknown_name() {
        let chunks = vec![Chunk::new(Uuid::new_v4(), "text", 0)];
        let sources = aggregate_sources(&chunks);
        assert_eq!(sources[0].source_name, "Unknown");
    }

    #[test]
    fn test_annotate_inserts_notice_on_error_claims() {
        let components = vec![notice_component(), notice_component(), notice_component()];
        let verification = VerificationResult::invalid(vec![UnsupportedClaim {
            claim_text: "wrong".to_string(),
            component_id: None,
            severity: ClaimSeverity::Error,
        }]);

        let annotated = annotate_unsupported_claims(components, &verification);

        assert_eq!(annotated.len(), 4);
        match &annotated[1].content {
            crate::types::component::ComponentContent::Notice(n) => {
                assert_eq!(n.title.as_deref(), Some("Verification Warning"));
                assert_eq!(n.level, NoticeLevel::Warning);
            }
            other => panic!("expected notice, got {}", other.type_name()),
        }
    }

    #[test]
    fn test_annotate_ignores_warning_only_claims() {
        let components = vec![notice_component()];
        let verification = VerificationResult::invalid(vec![UnsupportedClaim {
            claim_text: "soft".to_string(),
            component_id: None,
            severity: ClaimSeverity::Warning,
        }]);

        let annotated = annotate_unsupported_claims(components, &verification);
        assert_eq!(annotated.len(), 1);
    }

    #[test]
    fn test_annotate_empty_components_inserts_at_front() {
        let verification = VerificationResult::invalid(vec![UnsupportedClaim {
            claim_text: "wrong".to_string(),
            component_id: None,
            severity: ClaimSeverity::Error,
        }]);

        let annotated = annotate_unsupported_claims(Vec::new(), &verification);
        assert_eq!(annotated.len(), 1);
    }
}
