//! Testing utilities including mock capability implementations.
//!
//! These are useful for testing applications that use the pipeline without
//! making real LLM, embedding, or vector store calls.

use std::collections::VecDeque;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{PipelineError, Result};
use crate::traits::embed::Embedder;
use crate::traits::llm::{LlmClient, LlmResponse, StructuredResponse, TokenUsage};
use crate::traits::store::{SearchFilters, VectorStore};
use crate::types::chunk::Chunk;

/// Record of a call made to the mock LLM.
#[derive(Debug, Clone)]
pub enum MockLlmCall {
    Invoke { system: String, user: String },
    InvokeStructured { system: String, user: String },
}

/// A mock LLM returning queued canned responses.
///
/// Responses are consumed in FIFO order per method. A call with no queued
/// response fails, which exercises the pipeline's degradation paths.
#[derive(Default)]
pub struct MockLlm {
    text_responses: RwLock<VecDeque<String>>,
    structured_responses: RwLock<VecDeque<Value>>,
    usage: RwLock<TokenUsage>,
    calls: RwLock<Vec<MockLlmCall>>,
}

impl MockLlm {
    /// Create a mock with no canned responses and default usage numbers.
    pub fn new() -> Self {
        Self {
            usage: RwLock::new(TokenUsage {
                input_tokens: 120,
                output_tokens: 340,
                model: "mock-model".to_string(),
            }),
            ..Default::default()
        }
    }

    /// Queue a free-text response.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.text_responses.write().unwrap().push_back(content.into());
        self
    }

    /// Queue a structured response value.
    pub fn with_structured(self, value: Value) -> Self {
        self.structured_responses.write().unwrap().push_back(value);
        self
    }

    /// Set the usage reported by every subsequent call.
    pub fn with_usage(self, input_tokens: u64, output_tokens: u64, model: &str) -> Self {
        *self.usage.write().unwrap() = TokenUsage {
            input_tokens,
            output_tokens,
            model: model.to_string(),
        };
        self
    }

    /// All calls made to this mock.
    pub fn calls(&self) -> Vec<MockLlmCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of structured calls made.
    pub fn structured_call_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MockLlmCall::InvokeStructured { .. }))
            .count()
    }

    fn usage(&self) -> TokenUsage {
        self.usage.read().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, system: &str, user: &str) -> Result<LlmResponse> {
        self.calls.write().unwrap().push(MockLlmCall::Invoke {
            system: system.to_string(),
            user: user.to_string(),
        });

        match self.text_responses.write().unwrap().pop_front() {
            Some(content) => Ok(LlmResponse {
                content,
                usage: self.usage(),
            }),
            None => Err(PipelineError::llm("no canned text response")),
        }
    }

    async fn invoke_structured(
        &self,
        system: &str,
        user: &str,
        _schema: Value,
    ) -> Result<StructuredResponse> {
        self.calls
            .write()
            .unwrap()
            .push(MockLlmCall::InvokeStructured {
                system: system.to_string(),
                user: user.to_string(),
            });

        match self.structured_responses.write().unwrap().pop_front() {
            Some(value) => Ok(StructuredResponse {
                value,
                usage: self.usage(),
            }),
            None => Err(PipelineError::llm("no canned structured response")),
        }
    }
}

/// A mock embedder producing deterministic hash-based vectors.
#[derive(Default)]
pub struct MockEmbedder {
    dimensions: usize,
    texts: RwLock<Vec<String>>,
}

impl MockEmbedder {
    /// Create a mock producing vectors of the given dimension.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            texts: RwLock::new(Vec::new()),
        }
    }

    /// All texts embedded so far, in call order.
    pub fn embedded_texts(&self) -> Vec<String> {
        self.texts.read().unwrap().clone()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_single(&self, text: &str) -> Result<Vec<f32>> {
        self.texts.write().unwrap().push(text.to_string());

        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let hash = hasher.finalize();

        Ok((0..self.dimensions)
            .map(|i| {
                let byte = hash[i % 32] as f32;
                // Normalize to [-1, 1]
                (byte / 127.5) - 1.0
            })
            .collect())
    }
}

enum MockSearchOutcome {
    Chunks(Vec<Chunk>),
    Error(String),
}

/// A mock vector store returning queued search results.
///
/// Outcomes are consumed in FIFO order; once the queue is empty, searches
/// return no chunks.
#[derive(Default)]
pub struct MockVectorStore {
    outcomes: RwLock<VecDeque<MockSearchOutcome>>,
    ks: RwLock<Vec<usize>>,
    filters: RwLock<Vec<Option<SearchFilters>>>,
}

impl MockVectorStore {
    /// Create a mock with no queued results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful search result.
    pub fn with_results(self, chunks: Vec<Chunk>) -> Self {
        self.outcomes
            .write()
            .unwrap()
            .push_back(MockSearchOutcome::Chunks(chunks));
        self
    }

    /// Queue a failing search.
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.outcomes
            .write()
            .unwrap()
            .push_back(MockSearchOutcome::Error(message.into()));
        self
    }

    /// The `k` argument of every search so far.
    pub fn search_ks(&self) -> Vec<usize> {
        self.ks.read().unwrap().clone()
    }

    /// The filters of every search so far.
    pub fn search_filters(&self) -> Vec<Option<SearchFilters>> {
        self.filters.read().unwrap().clone()
    }

    /// Number of searches made.
    pub fn search_count(&self) -> usize {
        self.ks.read().unwrap().len()
    }
}

#[async_trait]
impl VectorStore for MockVectorStore {
    async fn search(
        &self,
        _vector: &[f32],
        k: usize,
        filters: Option<&SearchFilters>,
    ) -> Result<Vec<Chunk>> {
        self.ks.write().unwrap().push(k);
        self.filters.write().unwrap().push(filters.cloned());

        match self.outcomes.write().unwrap().pop_front() {
            Some(MockSearchOutcome::Chunks(chunks)) => Ok(chunks),
            Some(MockSearchOutcome::Error(message)) => Err(PipelineError::vector_store(message)),
            None => Ok(Vec::new()),
        }
    }
}
