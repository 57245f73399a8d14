//! End-to-end pipeline tests against mock capabilities.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use rag_pipeline::{
    Chunk, Component, ComponentContent, CostBreakdown, Layout, MemoryCache, MockEmbedder, MockLlm,
    MockVectorStore, NoticeLevel, PipelineConfig, Query, QueryMetadata, QueryPipeline, RagResult,
};

type TestPipeline =
    QueryPipeline<Arc<MockLlm>, Arc<MockEmbedder>, Arc<MockVectorStore>, Arc<MemoryCache>>;

fn build_pipeline(
    llm: Arc<MockLlm>,
    store: Arc<MockVectorStore>,
    cache: Arc<MemoryCache>,
    config: PipelineConfig,
) -> (TestPipeline, Arc<MockEmbedder>) {
    let embedder = Arc::new(MockEmbedder::new(8));
    let pipeline = QueryPipeline::new(llm, embedder.clone(), store, cache, config);
    (pipeline, embedder)
}

fn chunk(document_id: Uuid, text: &str) -> Chunk {
    Chunk::new(document_id, text, 0).with_metadata("source_name", "Hansard")
}

fn factual_planner_output(query: &str) -> serde_json::Value {
    json!({
        "query_type": "factual",
        "entities": {},
        "expected_components": ["text_block"],
        "retrieval_strategy": "single_focus",
        "rewritten_queries": [query],
        "confidence": 0.8
    })
}

fn text_block_extraction() -> serde_json::Value {
    json!({
        "title": "Money Bills",
        "summary_focus": "definition",
        "key_points": [{"point": "A money bill deals with taxation", "quote": "money bills impose taxation"}],
        "source_quotes": ["money bills impose taxation"],
        "completeness": 0.9,
        "warnings": []
    })
}

fn component_types(components: &[Component]) -> Vec<&'static str> {
    components.iter().map(|c| c.content.type_name()).collect()
}

// A factual query on a cold cache produces a single text block.
#[tokio::test]
async fn test_factual_query_end_to_end() {
    let query_text = "What is a money bill?";

    let llm = Arc::new(
        MockLlm::new()
            .with_structured(factual_planner_output(query_text))
            .with_structured(text_block_extraction())
            .with_response(
                json!({
                    "title": "Money Bills Explained",
                    "sections": [{
                        "components": [{
                            "type": "text_block",
                            "content": "A money bill is legislation that imposes taxation."
                        }]
                    }]
                })
                .to_string(),
            ),
    );

    let doc_a = Uuid::new_v4();
    let doc_b = Uuid::new_v4();
    let store = Arc::new(MockVectorStore::new().with_results(vec![
        chunk(doc_a, "money bills impose taxation"),
        chunk(doc_a, "origin in the lower house"),
        chunk(doc_b, "senate may not amend"),
        chunk(doc_b, "appropriation bills"),
        chunk(doc_b, "constitutional basis"),
    ]));
    let cache = Arc::new(MemoryCache::new());

    let (pipeline, _) = build_pipeline(
        llm,
        store,
        cache.clone(),
        PipelineConfig::default().with_verifier(false),
    );

    let outcome = pipeline.execute(&Query::new(query_text)).await;

    assert!(!outcome.result.cached);
    assert_eq!(outcome.result.metadata.chunks_used, 5);
    assert!(outcome.result.metadata.documents_retrieved <= 5);
    assert_eq!(component_types(&outcome.result.components), vec!["text_block"]);
    assert!(outcome.cost.total_credits > 0);
    assert!(!outcome.result.sources.is_empty());
    assert!(!cache.is_empty());
}

// A cache hit returns the cached result with zero cost and no
// capability calls.
#[tokio::test]
async fn test_cache_hit_short_circuits() {
    let llm = Arc::new(MockLlm::new());
    let store = Arc::new(MockVectorStore::new());
    let cache = Arc::new(MemoryCache::new());

    let query = Query::new("cached question");
    let canned = RagResult {
        layout: Layout {
            sections: Vec::new(),
            title: Some("Canned".to_string()),
            subtitle: None,
        },
        components: Vec::new(),
        metadata: QueryMetadata {
            documents_retrieved: 2,
            chunks_used: 4,
            processing_time_ms: 10,
            model: "canned-model".to_string(),
        },
        sources: Vec::new(),
        cached: false,
        cost: CostBreakdown::zero(),
    };

    {
        use rag_pipeline::Cache;
        cache.set(&rag_pipeline::query_key(&query), &canned, 60).await.unwrap();
    }

    let (pipeline, embedder) =
        build_pipeline(llm.clone(), store.clone(), cache, PipelineConfig::default());

    let outcome = pipeline.execute(&query).await;

    assert!(outcome.result.cached);
    assert_eq!(outcome.result.layout.title.as_deref(), Some("Canned"));
    assert_eq!(outcome.cost.total_cents, 0);
    assert!(llm.calls().is_empty());
    assert!(embedder.embedded_texts().is_empty());
    assert_eq!(store.search_count(), 0);
}

// An LLM that emits ill-formed planner output still yields a
// structured response via the default factual intent.
#[tokio::test]
async fn test_planner_fallback_still_produces_response() {
    let llm = Arc::new(
        MockLlm::new()
            .with_structured(json!("this is not an intent"))
            .with_structured(text_block_extraction())
            .with_response(
                json!({
                    "title": "Answer",
                    "sections": [{
                        "components": [{"type": "text_block", "content": "Grounded answer."}]
                    }]
                })
                .to_string(),
            ),
    );

    let doc = Uuid::new_v4();
    let store = Arc::new(MockVectorStore::new().with_results(vec![
        chunk(doc, "a"),
        chunk(doc, "b"),
        chunk(doc, "c"),
    ]));

    let (pipeline, _) = build_pipeline(
        llm.clone(),
        store,
        Arc::new(MemoryCache::new()),
        PipelineConfig::default().with_verifier(false),
    );

    let outcome = pipeline.execute(&Query::new("some question")).await;

    assert_eq!(component_types(&outcome.result.components), vec!["text_block"]);
    // Planner plus exactly one extraction for the default text_block component
    assert_eq!(llm.structured_call_count(), 2);
}

// A comparative query fans out, dedupes, and produces both components.
#[tokio::test]
async fn test_comparative_multi_entity_end_to_end() {
    let llm = Arc::new(
        MockLlm::new()
            .with_structured(json!({
                "query_type": "comparative",
                "entities": {"parties": ["Labor", "Liberal"]},
                "expected_components": ["text_block", "comparison"],
                "retrieval_strategy": "multi_entity",
                "rewritten_queries": ["Labor climate policy", "Liberal climate policy"],
                "confidence": 0.9
            }))
            .with_structured(text_block_extraction())
            .with_structured(json!({
                "title": "Climate Policy",
                "items": [{"name": "Labor"}, {"name": "Liberal"}],
                "attributes": [{"name": "2035 target", "values": ["60%", "35%"]}],
                "source_quotes": ["Labor targets 60%", "Liberal targets 35%"],
                "completeness": 0.8,
                "warnings": []
            }))
            .with_response(
                json!({
                    "title": "Climate Policy Comparison",
                    "sections": [{
                        "components": [
                            {"type": "text_block", "content": "The parties differ on climate."},
                            {"type": "comparison",
                             "items": [{"name": "Labor"}, {"name": "Liberal"}],
                             "attributes": [{"name": "2035 target", "values": ["60%", "35%"]}]}
                        ]
                    }]
                })
                .to_string(),
            ),
    );

    let x = chunk(Uuid::new_v4(), "labor policy");
    let y = chunk(Uuid::new_v4(), "shared context");
    let z = chunk(Uuid::new_v4(), "liberal policy");

    let store = Arc::new(
        MockVectorStore::new()
            .with_results(vec![x.clone(), y.clone()])
            .with_results(vec![y, z]),
    );

    let (pipeline, embedder) = build_pipeline(
        llm,
        store.clone(),
        Arc::new(MemoryCache::new()),
        PipelineConfig::default().with_verifier(false),
    );

    let outcome = pipeline
        .execute(&Query::new("Compare Labor and Liberal climate policies"))
        .await;

    assert_eq!(
        embedder.embedded_texts(),
        vec!["Labor climate policy", "Liberal climate policy"]
    );
    assert_eq!(store.search_count(), 2);
    // y deduped across the two searches
    assert_eq!(outcome.result.metadata.chunks_used, 3);
    assert_eq!(
        component_types(&outcome.result.components),
        vec!["text_block", "comparison"]
    );
    assert_eq!(outcome.cost.vector_queries, 2);

    match &outcome.result.components[1].content {
        ComponentContent::Comparison(c) => {
            assert!(c.items.len() >= 2);
            assert!(!c.attributes.is_empty());
        }
        other => panic!("expected comparison, got {}", other.type_name()),
    }
}

// A voting query produces a validated voting_breakdown with matching totals.
#[tokio::test]
async fn test_voting_breakdown_end_to_end() {
    let llm = Arc::new(
        MockLlm::new()
            .with_structured(json!({
                "query_type": "voting",
                "entities": {"bills": ["2024 housing bill"]},
                "expected_components": ["voting_breakdown"],
                "retrieval_strategy": "single_focus",
                "rewritten_queries": ["2024 housing bill vote"],
                "confidence": 0.85
            }))
            .with_structured(json!({
                "bill_name": "Housing Bill 2024",
                "total_for": 85,
                "total_against": 60,
                "party_breakdown": [
                    {"party": "Labor", "votes_for": 68, "votes_against": 2, "abstentions": 1, "not_voting": 0},
                    {"party": "Liberal", "votes_for": 12, "votes_against": 45, "abstentions": 2, "not_voting": 0},
                    {"party": "Greens", "votes_for": 5, "votes_against": 0, "abstentions": 0, "not_voting": 0}
                ],
                "source_quotes": ["The bill passed 85 votes to 60"],
                "completeness": 0.95,
                "warnings": []
            }))
            .with_response(
                json!({
                    "title": "Housing Bill Vote",
                    "sections": [{
                        "components": [{
                            "type": "voting_breakdown",
                            "total_for": 85,
                            "total_against": 60,
                            "party_breakdown": [
                                {"party": "Labor", "votes_for": 68, "votes_against": 2, "abstentions": 1},
                                {"party": "Liberal", "votes_for": 12, "votes_against": 45, "abstentions": 2},
                                {"party": "Greens", "votes_for": 5, "votes_against": 0, "abstentions": 0}
                            ]
                        }]
                    }]
                })
                .to_string(),
            ),
    );

    let doc = Uuid::new_v4();
    let store = Arc::new(MockVectorStore::new().with_results(vec![
        chunk(doc, "The bill passed 85 votes to 60"),
        chunk(doc, "Labor voted 68 for"),
        chunk(doc, "Liberal voted 45 against"),
    ]));

    let (pipeline, _) = build_pipeline(
        llm,
        store,
        Arc::new(MemoryCache::new()),
        PipelineConfig::default().with_verifier(false),
    );

    let outcome = pipeline
        .execute(&Query::new("How did parties vote on the 2024 housing bill?"))
        .await;

    assert_eq!(
        component_types(&outcome.result.components),
        vec!["voting_breakdown"]
    );
    match &outcome.result.components[0].content {
        ComponentContent::VotingBreakdown(v) => {
            assert_eq!(v.total_for, 85);
            assert_eq!(v.total_against, 60);
            assert_eq!(v.party_breakdown.len(), 3);
        }
        other => panic!("expected voting_breakdown, got {}", other.type_name()),
    }
}

// Insufficient retrieval short-circuits before extraction.
#[tokio::test]
async fn test_insufficient_retrieval_path() {
    let llm = Arc::new(
        MockLlm::new().with_structured(factual_planner_output("obscure question")),
    );

    let store =
        Arc::new(MockVectorStore::new().with_results(vec![chunk(Uuid::new_v4(), "only one")]));
    let cache = Arc::new(MemoryCache::new());

    let (pipeline, _) = build_pipeline(llm.clone(), store, cache.clone(), PipelineConfig::default());

    let outcome = pipeline.execute(&Query::new("obscure question")).await;

    let types = component_types(&outcome.result.components);
    assert_eq!(types, vec!["notice", "text_block"]);

    match &outcome.result.components[0].content {
        ComponentContent::Notice(n) => {
            assert_eq!(n.level, NoticeLevel::Warning);
            assert_eq!(n.title.as_deref(), Some("Limited Information"));
        }
        other => panic!("expected notice, got {}", other.type_name()),
    }

    assert_eq!(outcome.result.metadata.chunks_used, 0);
    assert_eq!(outcome.cost.total_credits, 0);
    // Only the planner ran: no extractor or composer calls
    assert_eq!(llm.calls().len(), 1);
    // Not cached
    assert!(cache.is_empty());
}

// Verification inserts a notice but never removes components.
#[tokio::test]
async fn test_verifier_error_inserts_notice_without_deleting() {
    let llm = Arc::new(
        MockLlm::new()
            .with_structured(factual_planner_output("q"))
            .with_structured(text_block_extraction())
            .with_response(
                json!({
                    "title": "Answer",
                    "sections": [{
                        "components": [
                            {"type": "text_block", "content": "First claim."},
                            {"type": "text_block", "content": "Second claim."},
                            {"type": "notice", "level": "info", "message": "Context note."}
                        ]
                    }]
                })
                .to_string(),
            )
            // Verifier flags an unsupported claim at error severity
            .with_response(
                json!({
                    "is_valid": false,
                    "unsupported_claims": [
                        {"claim_text": "First claim.", "severity": "error"}
                    ],
                    "confidence_score": 0.3,
                    "warnings": []
                })
                .to_string(),
            ),
    );

    let doc = Uuid::new_v4();
    let store = Arc::new(MockVectorStore::new().with_results(vec![
        chunk(doc, "a"),
        chunk(doc, "b"),
        chunk(doc, "c"),
    ]));

    let (pipeline, _) = build_pipeline(
        llm,
        store,
        Arc::new(MemoryCache::new()),
        PipelineConfig::default(),
    );

    let outcome = pipeline.execute(&Query::new("q")).await;

    let types = component_types(&outcome.result.components);
    assert_eq!(types, vec!["text_block", "notice", "text_block", "notice"]);

    // Inserted at index min(1, 3) = 1 with the verification title
    match &outcome.result.components[1].content {
        ComponentContent::Notice(n) => {
            assert_eq!(n.title.as_deref(), Some("Verification Warning"));
        }
        other => panic!("expected notice, got {}", other.type_name()),
    }
}

// A pie chart violating the slice limit is dropped and its section
// elided when nothing else survives in it.
#[tokio::test]
async fn test_pie_constraint_elides_empty_section() {
    let slices: Vec<_> = (0..9)
        .map(|i| json!({"label": format!("Party {i}"), "value": i + 1}))
        .collect();

    let llm = Arc::new(
        MockLlm::new()
            .with_structured(factual_planner_output("q"))
            .with_structured(text_block_extraction())
            .with_response(
                json!({
                    "title": "Seats",
                    "sections": [
                        {
                            "title": "Distribution",
                            "components": [{
                                "type": "chart",
                                "chart_type": "pie",
                                "series": [{"name": "Seats", "data": slices}]
                            }]
                        },
                        {
                            "title": "Summary",
                            "components": [{"type": "text_block", "content": "Nine parties hold seats."}]
                        }
                    ]
                })
                .to_string(),
            ),
    );

    let doc = Uuid::new_v4();
    let store = Arc::new(MockVectorStore::new().with_results(vec![
        chunk(doc, "a"),
        chunk(doc, "b"),
        chunk(doc, "c"),
    ]));

    let (pipeline, _) = build_pipeline(
        llm,
        store,
        Arc::new(MemoryCache::new()),
        PipelineConfig::default().with_verifier(false),
    );

    let outcome = pipeline.execute(&Query::new("q")).await;

    assert_eq!(outcome.result.layout.sections.len(), 1);
    assert_eq!(
        outcome.result.layout.sections[0].title.as_deref(),
        Some("Summary")
    );
    assert_eq!(component_types(&outcome.result.components), vec!["text_block"]);
}

// A second execution of the same query is served from the cache.
#[tokio::test]
async fn test_second_execution_hits_cache() {
    let query_text = "What is a money bill?";

    let llm = Arc::new(
        MockLlm::new()
            .with_structured(factual_planner_output(query_text))
            .with_structured(text_block_extraction())
            .with_response(
                json!({
                    "title": "Answer",
                    "sections": [{
                        "components": [{"type": "text_block", "content": "Taxation legislation."}]
                    }]
                })
                .to_string(),
            ),
    );

    let doc = Uuid::new_v4();
    let store = Arc::new(MockVectorStore::new().with_results(vec![
        chunk(doc, "a"),
        chunk(doc, "b"),
        chunk(doc, "c"),
    ]));

    let (pipeline, _) = build_pipeline(
        llm.clone(),
        store,
        Arc::new(MemoryCache::new()),
        PipelineConfig::default().with_verifier(false),
    );

    let first = pipeline.execute(&Query::new(query_text)).await;
    assert!(!first.result.cached);
    assert!(first.cost.total_credits > 0);

    let calls_after_first = llm.calls().len();

    let second = pipeline.execute(&Query::new(query_text)).await;
    assert!(second.result.cached);
    assert_eq!(second.cost.total_credits, 0);
    assert_eq!(llm.calls().len(), calls_after_first);
}

// Retriever failure yields the error response, never a panic or partial
// result.
#[tokio::test]
async fn test_total_retrieval_failure_yields_error_response() {
    let llm = Arc::new(MockLlm::new().with_structured(factual_planner_output("q")));
    let store = Arc::new(MockVectorStore::new().with_error("index offline"));
    let cache = Arc::new(MemoryCache::new());

    let (pipeline, _) = build_pipeline(llm, store, cache.clone(), PipelineConfig::default());

    let outcome = pipeline.execute(&Query::new("q")).await;

    assert_eq!(component_types(&outcome.result.components), vec!["notice"]);
    assert_eq!(
        outcome.result.layout.title.as_deref(),
        Some("Error Processing Query")
    );
    assert_eq!(outcome.cost.total_credits, 0);
    assert!(cache.is_empty());
}

// Composer LLM failure yields the fallback response and skips the cache
// write.
#[tokio::test]
async fn test_composer_failure_yields_fallback_uncached() {
    let llm = Arc::new(
        MockLlm::new()
            .with_structured(factual_planner_output("q"))
            .with_structured(text_block_extraction()),
        // No text response queued: the composer call fails
    );

    let doc = Uuid::new_v4();
    let store = Arc::new(MockVectorStore::new().with_results(vec![
        chunk(doc, "a"),
        chunk(doc, "b"),
        chunk(doc, "c"),
    ]));
    let cache = Arc::new(MemoryCache::new());

    let (pipeline, _) = build_pipeline(
        llm,
        store,
        cache.clone(),
        PipelineConfig::default().with_verifier(false),
    );

    let outcome = pipeline.execute(&Query::new("q")).await;

    assert_eq!(component_types(&outcome.result.components), vec!["text_block"]);
    assert_eq!(outcome.result.layout.title.as_deref(), Some("Error"));
    assert!(cache.is_empty());
}
