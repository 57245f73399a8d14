//! # Agentic RAG Query Pipeline
//!
//! A multi-stage orchestration engine that turns a natural-language question
//! about parliamentary information into a typed, component-based structured
//! response grounded in retrieved source documents.
//!
//! ## Architecture
//!
//! ```text
//! Query ──► [Cache lookup] ──hit──► Result
//!             │miss
//!             ▼
//!         [Planner]    intent: type, entities, strategy, rewrites
//!             ▼
//!         [Retriever]  strategy-driven search, sufficiency gate
//!             ▼
//!         [Extractor × N]  parallel grounded extraction per component
//!             ▼
//!         [Composer]   validated layout of typed components
//!             ▼
//!         [Verifier]   optional claim checking (annotates, never censors)
//!             ▼
//!         [Cost] ──► [Cache store] ──► Result
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rag_pipeline::{MemoryCache, MemoryVectorStore, PipelineConfig, Query, QueryPipeline};
//! use rag_pipeline::ai::OpenAi;
//!
//! let llm = OpenAi::from_env()?;
//! let store = MemoryVectorStore::new();
//! let cache = MemoryCache::new();
//!
//! let pipeline = QueryPipeline::new(llm.clone(), llm, store, cache, PipelineConfig::default());
//! let outcome = pipeline.execute(&Query::new("What is a money bill?")).await;
//!
//! for component in &outcome.result.components {
//!     println!("{}", component.content.type_name());
//! }
//! println!("credits: {}", outcome.cost.total_credits);
//! ```
//!
//! ## Modules
//!
//! - [`traits`] - Capability contracts (LlmClient, Embedder, VectorStore, Cache)
//! - [`types`] - Domain types (Query, Intent, Chunk, components, cost)
//! - [`pipeline`] - The five agents, constraint validation, and the orchestrator
//! - [`stores`] - In-memory vector store and cache
//! - [`testing`] - Mock capabilities for testing
//! - `ai` - OpenAI-compatible reference adapter (feature = "openai")

pub mod error;
pub mod pipeline;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use error::{PipelineError, Result};
pub use traits::{
    cache::{query_key, Cache, CACHE_KEY_VERSION},
    embed::Embedder,
    llm::{LlmClient, LlmResponse, StructuredResponse, TokenUsage},
    store::{cosine_similarity, SearchFilters, VectorStore},
};
pub use types::{
    chunk::{Chunk, DocumentType, SourceReference},
    component::{
        Chart, ChartDataPoint, ChartSeries, ChartType, Comparison, ComparisonAttribute,
        ComparisonItem, Component, ComponentContent, ComponentSize, DataTable, Layout,
        MemberProfile, MemberProfiles, Notice, NoticeLevel, PartyVote, Section, SectionLayout,
        TableColumn, TextBlock, TextFormat, Timeline, TimelineEvent, VoteResult, VotingBreakdown,
    },
    config::PipelineConfig,
    cost::CostBreakdown,
    intent::{
        ExtractedEntities, Intent, QueryType, ResponseDepth, RetrievalStrategy,
    },
    query::{Query, QueryFilters},
    result::{
        ClaimSeverity, ExtractionResult, QueryMetadata, RagResult, RetrievalResult,
        UnsupportedClaim, VerificationResult,
    },
};

// Re-export pipeline components
pub use pipeline::{
    normalize_type, parse_component, validate_component, ConstraintViolation, DataExtractor,
    ExecuteQueryResult, IntentRetriever, QueryPipeline, QueryPlanner, ResponseComposer,
    ResponseVerifier, ValidationResult,
};

// Re-export stores
pub use stores::{MemoryCache, MemoryVectorStore};

// Re-export testing utilities
pub use testing::{MockEmbedder, MockLlm, MockLlmCall, MockVectorStore};
