//! Stage outputs and the final pipeline result.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::chunk::{Chunk, SourceReference};
use super::component::{Component, Layout};
use super::cost::CostBreakdown;
use super::intent::RetrievalStrategy;

/// Output of the retriever: chunks plus a sufficiency judgment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub chunks: Vec<Chunk>,
    pub strategy_used: RetrievalStrategy,

    /// Per-rewritten-query coverage scores in `[0, 1]`, keyed by the
    /// search string, in fan-out order.
    #[serde(default)]
    pub coverage: IndexMap<String, f32>,

    pub is_sufficient: bool,

    #[serde(default)]
    pub warnings: Vec<String>,
}

impl RetrievalResult {
    /// An empty, insufficient result carrying the reason as a warning.
    pub fn insufficient(reason: impl Into<String>) -> Self {
        Self {
            chunks: Vec::new(),
            strategy_used: RetrievalStrategy::SingleFocus,
            coverage: IndexMap::new(),
            is_sufficient: false,
            warnings: vec![reason.into()],
        }
    }

    /// The chunk texts, in retrieval order.
    pub fn context_texts(&self) -> Vec<String> {
        self.chunks.iter().map(|c| c.text.clone()).collect()
    }
}

/// Output of one grounded extraction for one component type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub component_type: String,

    /// Schema-shaped record extracted from the context.
    pub extracted_data: Map<String, Value>,

    /// Exact quotes from the context supporting the extraction.
    pub source_quotes: Vec<String>,

    /// Self-reported completeness in `[0, 1]`.
    pub completeness: f32,

    pub warnings: Vec<String>,
}

impl ExtractionResult {
    /// An empty extraction carrying the failure reason as a warning.
    pub fn empty(component_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            extracted_data: Map::new(),
            source_quotes: Vec::new(),
            completeness: 0.0,
            warnings: vec![reason.into()],
        }
    }

    /// Whether the extraction is usable by the composer.
    pub fn is_complete(&self) -> bool {
        !self.extracted_data.is_empty() && self.completeness >= 0.5
    }
}

/// Severity of an unsupported claim found during verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimSeverity {
    Warning,
    Error,
}

/// A claim the verifier could not ground in the source context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsupportedClaim {
    pub claim_text: String,
    pub component_id: Option<String>,
    pub severity: ClaimSeverity,
}

/// Output of the verifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub is_valid: bool,
    pub unsupported_claims: Vec<UnsupportedClaim>,

    /// Verifier confidence in `[0, 1]`.
    pub confidence_score: f32,

    pub warnings: Vec<String>,
}

impl VerificationResult {
    /// A fully valid result.
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            unsupported_claims: Vec::new(),
            confidence_score: 1.0,
            warnings: Vec::new(),
        }
    }

    /// An invalid result carrying the unsupported claims.
    pub fn invalid(unsupported_claims: Vec<UnsupportedClaim>) -> Self {
        Self {
            is_valid: false,
            unsupported_claims,
            confidence_score: 0.0,
            warnings: Vec::new(),
        }
    }

    /// Whether any claim carries error severity.
    pub fn has_errors(&self) -> bool {
        self.unsupported_claims
            .iter()
            .any(|c| c.severity == ClaimSeverity::Error)
    }
}

/// Execution statistics attached to every result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMetadata {
    pub documents_retrieved: usize,
    pub chunks_used: usize,
    pub processing_time_ms: u64,
    pub model: String,
}

/// The pipeline's final structured response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResult {
    pub layout: Layout,
    pub components: Vec<Component>,
    pub metadata: QueryMetadata,

    #[serde(default)]
    pub sources: Vec<SourceReference>,

    pub cached: bool,

    #[serde(default)]
    pub cost: CostBreakdown,
}
