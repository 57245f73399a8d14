//! Factory wiring the pipeline's agents to OpenAI-backed clients.

use crate::pipeline::{
    DataExtractor, IntentRetriever, QueryPipeline, QueryPlanner, ResponseComposer,
    ResponseVerifier,
};
use crate::traits::cache::Cache;
use crate::traits::store::VectorStore;
use crate::types::config::PipelineConfig;

use super::openai::OpenAi;

/// Build a pipeline where each agent gets its own configured client.
///
/// Models come from the config; temperatures follow the per-agent policy
/// (planner 0.1, extractor 0.1, composer 0.3, verifier 0.1).
pub fn build_pipeline<S, C>(
    api_key: &str,
    store: S,
    cache: C,
    config: PipelineConfig,
) -> QueryPipeline<OpenAi, OpenAi, S, C>
where
    S: VectorStore,
    C: Cache,
{
    let planner = QueryPlanner::new(
        OpenAi::new(api_key)
            .with_model(&config.planner_model)
            .with_temperature(0.1),
    );

    let embedder = OpenAi::new(api_key).with_embedding_model(&config.embedding_model);
    let retriever = IntentRetriever::new(embedder, store)
        .with_top_k(config.default_top_k)
        .with_min_chunks(config.min_chunks_for_sufficiency);

    let extractor = DataExtractor::new(
        OpenAi::new(api_key)
            .with_model(&config.extractor_model)
            .with_temperature(0.1),
    );

    let composer = ResponseComposer::new(
        OpenAi::new(api_key)
            .with_model(&config.composer_model)
            .with_temperature(0.3),
    );

    let verifier = config.verifier_enabled.then(|| {
        ResponseVerifier::new(
            OpenAi::new(api_key)
                .with_model(&config.verifier_model)
                .with_temperature(0.1),
        )
    });

    QueryPipeline::from_parts(planner, retriever, extractor, composer, verifier, cache, config)
}
