//! LLM client capability.
//!
//! Implementations wrap a specific provider and handle transport,
//! authentication, and per-call timeouts. Model and temperature are
//! configured on the implementation; each agent holds its own client
//! instance.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Token usage reported by an LLM call.
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub model: String,
}

impl TokenUsage {
    /// Usage for a call that never reached the LLM.
    pub fn none() -> Self {
        Self::default()
    }
}

/// A free-text completion plus its usage.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub usage: TokenUsage,
}

/// A schema-constrained completion plus its usage.
#[derive(Debug, Clone)]
pub struct StructuredResponse {
    pub value: Value,
    pub usage: TokenUsage,
}

/// LLM client capability.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Free-text completion.
    async fn invoke(&self, system: &str, user: &str) -> Result<LlmResponse>;

    /// Completion constrained to a JSON schema. The returned value
    /// matches the schema; implementations retry or fail, never return
    /// non-conforming output.
    async fn invoke_structured(
        &self,
        system: &str,
        user: &str,
        schema: Value,
    ) -> Result<StructuredResponse>;
}

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for std::sync::Arc<T> {
    async fn invoke(&self, system: &str, user: &str) -> Result<LlmResponse> {
        (**self).invoke(system, user).await
    }

    async fn invoke_structured(
        &self,
        system: &str,
        user: &str,
        schema: Value,
    ) -> Result<StructuredResponse> {
        (**self).invoke_structured(system, user, schema).await
    }
}
