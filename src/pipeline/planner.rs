//! LLM-backed query planner: intent classification and entity extraction.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::pipeline::prompts::{format_planner_prompt, PLANNER_SYSTEM};
use crate::pipeline::schemas::{planner_schema, PlannerOutput};
use crate::traits::llm::LlmClient;
use crate::types::chunk::DocumentType;
use crate::types::intent::{
    ExtractedEntities, Intent, QueryType, ResponseDepth, RetrievalStrategy,
};

/// Classifies queries with a schema-constrained LLM call.
///
/// The planner is cheap and its output drives the rest of the pipeline, so
/// every failure degrades to the default factual intent instead of erroring.
pub struct QueryPlanner<L> {
    llm: L,
}

impl<L: LlmClient> QueryPlanner<L> {
    pub fn new(llm: L) -> Self {
        Self { llm }
    }

    /// Classify query intent and extract entities.
    pub async fn analyze(&self, query: &str) -> Intent {
        let prompt = format_planner_prompt(query);

        let response = match self
            .llm
            .invoke_structured(PLANNER_SYSTEM, &prompt, planner_schema())
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Planner failed, using default intent");
                return Intent::default_factual(query);
            }
        };

        match serde_json::from_value::<PlannerOutput>(response.value) {
            Ok(output) => self.build_intent(output, query),
            Err(e) => {
                warn!(error = %e, "Planner output did not match schema, using default intent");
                Intent::default_factual(query)
            }
        }
    }

    fn build_intent(&self, output: PlannerOutput, original_query: &str) -> Intent {
        let query_type = QueryType::parse_or_default(&output.query_type);
        let retrieval_strategy = RetrievalStrategy::parse_or_default(&output.retrieval_strategy);
        let response_depth =
            ResponseDepth::parse_or_default(output.response_depth.as_deref().unwrap_or("standard"));

        let entities = ExtractedEntities {
            parties: output.entities.parties,
            members: output.entities.members,
            bills: output.entities.bills,
            topics: output.entities.topics,
            date_from: valid_date(output.entities.date_from),
            date_to: valid_date(output.entities.date_to),
            document_types: output
                .entities
                .document_types
                .iter()
                .map(|s| DocumentType::parse_or_other(s))
                .collect(),
        };

        let expected_components = if output.expected_components.is_empty() {
            vec!["text_block".to_string()]
        } else {
            output.expected_components
        };

        let rewritten_queries = if output.rewritten_queries.is_empty() {
            vec![original_query.to_string()]
        } else {
            output.rewritten_queries
        };

        debug!(
            query_type = query_type.as_str(),
            strategy = retrieval_strategy.as_str(),
            components = ?expected_components,
            "Classified intent"
        );

        Intent {
            query_type,
            response_depth,
            entities,
            expected_components,
            retrieval_strategy,
            rewritten_queries,
            confidence: output.confidence.clamp(0.0, 1.0),
        }
    }
}

/// Keep only syntactically valid YYYY-MM-DD dates.
fn valid_date(date: Option<String>) -> Option<String> {
    date.filter(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").is_ok())
}
