//! Token-to-credit cost model.
//!
//! Costs are modeled in US cents; one credit is one cent. Each nonzero
//! category floors at one cent so small queries are never free.

use serde::{Deserialize, Serialize};

/// Embedding rate per 1K tokens, in cents.
const EMBEDDING_RATE_CENTS: f64 = 0.01;

/// LLM input rate per 1K tokens, in cents.
const LLM_INPUT_RATE_CENTS: f64 = 1.0;

/// LLM output rate per 1K tokens, in cents.
const LLM_OUTPUT_RATE_CENTS: f64 = 3.0;

/// Rate per vector store query, in cents.
const VECTOR_QUERY_RATE_CENTS: f64 = 0.01;

/// Itemized cost of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub embedding_tokens: u64,
    pub embedding_cost_cents: u64,
    pub llm_input_tokens: u64,
    pub llm_output_tokens: u64,
    pub llm_cost_cents: u64,
    pub vector_queries: u64,
    pub vector_cost_cents: u64,
    pub margin_cents: u64,
    pub total_cents: u64,

    /// 1 credit = 1 cent.
    pub total_credits: u64,
}

impl CostBreakdown {
    /// A zero-cost breakdown (cache hits, degraded responses).
    pub fn zero() -> Self {
        Self::default()
    }

    /// Price a run from raw usage counts.
    ///
    /// Float arithmetic throughout, rounded to cents at the end so small
    /// per-category values are not lost before the margin is applied.
    pub fn calculate(
        embedding_tokens: u64,
        llm_input_tokens: u64,
        llm_output_tokens: u64,
        vector_queries: u64,
        margin: f64,
    ) -> Self {
        let embedding_cost_f = (embedding_tokens as f64 / 1000.0) * EMBEDDING_RATE_CENTS;
        let llm_input_cost_f = (llm_input_tokens as f64 / 1000.0) * LLM_INPUT_RATE_CENTS;
        let llm_output_cost_f = (llm_output_tokens as f64 / 1000.0) * LLM_OUTPUT_RATE_CENTS;
        let llm_cost_f = llm_input_cost_f + llm_output_cost_f;
        let vector_cost_f = vector_queries as f64 * VECTOR_QUERY_RATE_CENTS;

        let subtotal_f = embedding_cost_f + llm_cost_f + vector_cost_f;
        let margin_f = subtotal_f * margin;
        let total_f = subtotal_f + margin_f;

        let embedding_cost_cents = if embedding_tokens > 0 {
            (embedding_cost_f.round() as u64).max(1)
        } else {
            0
        };
        let llm_cost_cents = if llm_input_tokens + llm_output_tokens > 0 {
            (llm_cost_f.round() as u64).max(1)
        } else {
            0
        };
        let vector_cost_cents = if vector_queries > 0 {
            (vector_cost_f.round() as u64).max(1)
        } else {
            0
        };
        let margin_cents = if margin > 0.0 && subtotal_f > 0.0 {
            (margin_f.round() as u64).max(1)
        } else {
            0
        };
        let total_cents = if total_f > 0.0 { total_f.round() as u64 } else { 0 };

        Self {
            embedding_tokens,
            embedding_cost_cents,
            llm_input_tokens,
            llm_output_tokens,
            llm_cost_cents,
            vector_queries,
            vector_cost_cents,
            margin_cents,
            total_cents,
            total_credits: total_cents,
        }
    }
}
