//! Typed errors for the pipeline library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur during pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// LLM service unavailable or failed
    #[error("LLM error: {0}")]
    Llm(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Embedding generation failed
    #[error("embedding error: {0}")]
    Embedding(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Vector store search failed
    #[error("vector store error: {0}")]
    VectorStore(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Cache operation failed
    #[error("cache error: {0}")]
    Cache(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Operation was cancelled
    #[error("operation cancelled")]
    Cancelled,

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PipelineError {
    /// Wrap an arbitrary error message as an LLM failure.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into().into())
    }

    /// Wrap an arbitrary error message as an embedding failure.
    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into().into())
    }

    /// Wrap an arbitrary error message as a vector store failure.
    pub fn vector_store(msg: impl Into<String>) -> Self {
        Self::VectorStore(msg.into().into())
    }

    /// Wrap an arbitrary error message as a cache failure.
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into().into())
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
