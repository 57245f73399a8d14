//! The planner's structured description of what a query is asking for.

use serde::{Deserialize, Serialize};

use super::chunk::DocumentType;

/// Classified query type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Factual,
    Comparative,
    Timeline,
    Voting,
    Analytical,
}

impl QueryType {
    /// Parse a query type, falling back to `Factual` for unknown values.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "comparative" => Self::Comparative,
            "timeline" => Self::Timeline,
            "voting" => Self::Voting,
            "analytical" => Self::Analytical,
            _ => Self::Factual,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Factual => "factual",
            Self::Comparative => "comparative",
            Self::Timeline => "timeline",
            Self::Voting => "voting",
            Self::Analytical => "analytical",
        }
    }
}

/// How much detail the response should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseDepth {
    Brief,
    Standard,
    Comprehensive,
}

impl ResponseDepth {
    /// Parse a depth, falling back to `Standard` for unknown values.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "brief" => Self::Brief,
            "comprehensive" => Self::Comprehensive,
            _ => Self::Standard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brief => "brief",
            Self::Standard => "standard",
            Self::Comprehensive => "comprehensive",
        }
    }
}

/// Retrieval strategy chosen by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStrategy {
    /// Single embedding search with intent-derived filters.
    SingleFocus,

    /// Parallel searches for each rewritten query, merged and deduped.
    MultiEntity,

    /// Date-filtered search sorted ascending by chunk date.
    Chronological,

    /// Wider search with only document-type filtering.
    Broad,
}

impl RetrievalStrategy {
    /// Parse a strategy, falling back to `SingleFocus` for unknown values.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "multi_entity" => Self::MultiEntity,
            "chronological" => Self::Chronological,
            "broad" => Self::Broad,
            _ => Self::SingleFocus,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleFocus => "single_focus",
            Self::MultiEntity => "multi_entity",
            Self::Chronological => "chronological",
            Self::Broad => "broad",
        }
    }
}

/// Entities the planner extracted from the query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedEntities {
    #[serde(default)]
    pub parties: Vec<String>,

    #[serde(default)]
    pub members: Vec<String>,

    #[serde(default)]
    pub bills: Vec<String>,

    #[serde(default)]
    pub topics: Vec<String>,

    /// Start date in `YYYY-MM-DD` format.
    pub date_from: Option<String>,

    /// End date in `YYYY-MM-DD` format.
    pub date_to: Option<String>,

    #[serde(default)]
    pub document_types: Vec<DocumentType>,
}

impl ExtractedEntities {
    /// Whether any entity list is non-empty.
    pub fn has_entities(&self) -> bool {
        !self.parties.is_empty()
            || !self.members.is_empty()
            || !self.bills.is_empty()
            || !self.topics.is_empty()
    }
}

/// The planner's output: classified intent plus strategy hints for the
/// retriever and extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub query_type: QueryType,
    pub response_depth: ResponseDepth,
    pub entities: ExtractedEntities,

    /// Component-type tags the extractor should target, in order.
    pub expected_components: Vec<String>,

    pub retrieval_strategy: RetrievalStrategy,

    /// Search strings for the vector store; never empty.
    pub rewritten_queries: Vec<String>,

    /// Classification confidence in `[0, 1]`.
    pub confidence: f32,
}

impl Intent {
    /// The planner's failure mode: a plain factual lookup of the raw query.
    pub fn default_factual(query: &str) -> Self {
        Self {
            query_type: QueryType::Factual,
            response_depth: ResponseDepth::Standard,
            entities: ExtractedEntities::default(),
            expected_components: vec!["text_block".to_string()],
            retrieval_strategy: RetrievalStrategy::SingleFocus,
            rewritten_queries: vec![query.to_string()],
            confidence: 0.5,
        }
    }
}
