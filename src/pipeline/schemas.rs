//! Structured-output schemas for the planner and extractor.
//!
//! Each schema is derived with `schemars` and handed to the LLM client as a
//! JSON schema value. Extraction schemas all share the grounding fields
//! (`source_quotes`, `completeness`, `warnings`); everything else becomes
//! the extraction's `extracted_data` record.

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keys shared by every extraction schema, stripped out of `extracted_data`.
pub const BASE_EXTRACTION_KEYS: [&str; 3] = ["source_quotes", "completeness", "warnings"];

fn default_completeness() -> f32 {
    1.0
}

/// Grounding fields common to every extraction output.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct BaseExtractionFields {
    /// Exact quotes from context supporting the extraction
    #[serde(default)]
    pub source_quotes: Vec<String>,

    /// Data completeness score 0-1
    #[serde(default = "default_completeness")]
    pub completeness: f32,

    /// Any data quality issues or missing fields
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Entities extracted from a query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PlannerEntities {
    /// Political party names mentioned or implied
    #[serde(default)]
    pub parties: Vec<String>,

    /// Politician names mentioned
    #[serde(default)]
    pub members: Vec<String>,

    /// Bill or legislation names
    #[serde(default)]
    pub bills: Vec<String>,

    /// Policy topics or themes
    #[serde(default)]
    pub topics: Vec<String>,

    /// Start date in YYYY-MM-DD format
    pub date_from: Option<String>,

    /// End date in YYYY-MM-DD format
    pub date_to: Option<String>,

    /// Document types: bill, hansard, vote, member, report
    #[serde(default)]
    pub document_types: Vec<String>,
}

/// Schema for planner output.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlannerOutput {
    /// Query type: factual, comparative, timeline, voting, or analytical
    pub query_type: String,

    /// Response depth: brief, standard, or comprehensive
    #[serde(default)]
    pub response_depth: Option<String>,

    /// Extracted entities
    #[serde(default)]
    pub entities: PlannerEntities,

    /// Component types to include in the response
    #[serde(default)]
    pub expected_components: Vec<String>,

    /// Retrieval strategy: single_focus, multi_entity, chronological, or broad
    pub retrieval_strategy: String,

    /// Optimized queries for vector search
    #[serde(default)]
    pub rewritten_queries: Vec<String>,

    /// Confidence score 0-1
    #[serde(default = "planner_default_confidence")]
    pub confidence: f32,
}

fn planner_default_confidence() -> f32 {
    0.8
}

/// Schema for text block extraction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TextBlockExtraction {
    /// Section title
    pub title: Option<String>,

    /// Key facts with supporting quotes
    #[serde(default)]
    pub key_points: Vec<KeyPoint>,

    /// Main topic of the text
    pub summary_focus: Option<String>,

    #[serde(flatten)]
    pub base: BaseExtractionFields,
}

/// A key fact with its supporting quote.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KeyPoint {
    /// The fact
    pub point: String,

    /// Exact supporting sentence from the context
    pub quote: Option<String>,
}

/// Schema for voting breakdown extraction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VotingExtraction {
    /// Exact bill name from text
    pub bill_name: Option<String>,

    /// Vote date in YYYY-MM-DD format
    pub vote_date: Option<String>,

    /// Vote result: passed, rejected, or tied
    pub result: Option<String>,

    /// Number of votes in favor
    pub total_for: Option<i64>,

    /// Number of votes against
    pub total_against: Option<i64>,

    /// Number of abstentions
    pub total_abstentions: Option<i64>,

    /// Per-party vote breakdown
    #[serde(default)]
    pub party_breakdown: Vec<PartyVoteFields>,

    #[serde(flatten)]
    pub base: BaseExtractionFields,
}

/// Per-party vote counts.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PartyVoteFields {
    /// Party name
    pub party: String,

    #[serde(default)]
    pub votes_for: i64,

    #[serde(default)]
    pub votes_against: i64,

    #[serde(default)]
    pub abstentions: i64,

    #[serde(default)]
    pub not_voting: i64,
}

/// Schema for a timeline event.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TimelineEventFields {
    /// Event date in YYYY-MM-DD format
    pub date: String,

    /// Short event name
    pub label: String,

    /// Event description from text
    pub description: Option<String>,

    /// Exact sentence from source
    pub source_quote: Option<String>,
}

/// Schema for timeline extraction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TimelineExtraction {
    /// Timeline title
    pub title: Option<String>,

    /// Chronological events
    #[serde(default)]
    pub events: Vec<TimelineEventFields>,

    #[serde(flatten)]
    pub base: BaseExtractionFields,
}

/// Schema for a comparison attribute.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ComparisonAttributeFields {
    /// Attribute being compared
    pub name: String,

    /// Values for each entity, in item order
    pub values: Vec<String>,

    /// Sources for each value
    #[serde(default)]
    pub source_quotes: Vec<String>,
}

/// Schema for comparison extraction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ComparisonExtraction {
    /// Comparison title
    pub title: Option<String>,

    /// Entities being compared
    #[serde(default)]
    pub items: Vec<ComparisonItemFields>,

    /// Comparison attributes
    #[serde(default)]
    pub attributes: Vec<ComparisonAttributeFields>,

    #[serde(flatten)]
    pub base: BaseExtractionFields,
}

/// An entity being compared.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ComparisonItemFields {
    /// Entity name
    pub name: String,

    /// Optional description
    pub description: Option<String>,
}

/// Schema for a chart data point.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChartPointFields {
    /// Category label
    pub label: String,

    /// Numerical value from text
    pub value: f64,
}

/// Schema for a chart series.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChartSeriesFields {
    /// Series name
    pub name: String,

    /// Data points in the series
    pub data: Vec<ChartPointFields>,
}

/// Schema for chart extraction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChartExtraction {
    /// Chart type: bar, line, pie, horizontal_bar, stacked_bar
    pub chart_type: String,

    /// Chart title
    pub title: Option<String>,

    /// Chart data series
    #[serde(default)]
    pub series: Vec<ChartSeriesFields>,

    /// X-axis label
    pub x_axis_label: Option<String>,

    /// Y-axis label
    pub y_axis_label: Option<String>,

    #[serde(flatten)]
    pub base: BaseExtractionFields,
}

/// Schema for a table column.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TableColumnFields {
    /// Column header
    pub header: String,

    /// Row key for this column
    pub key: String,
}

/// Schema for data table extraction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DataTableExtraction {
    /// Table title
    pub title: Option<String>,

    /// Column definitions
    #[serde(default)]
    pub columns: Vec<TableColumnFields>,

    /// Table rows mapping column keys to values
    #[serde(default)]
    pub rows: Vec<std::collections::HashMap<String, String>>,

    #[serde(flatten)]
    pub base: BaseExtractionFields,
}

/// Schema for a member profile.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MemberFields {
    /// Full name from text
    pub name: String,

    /// Party affiliation
    pub party: Option<String>,

    /// Electorate
    pub constituency: Option<String>,

    /// Positions or roles
    #[serde(default)]
    pub roles: Vec<String>,

    /// Source sentence
    pub source_quote: Option<String>,
}

/// Schema for member profiles extraction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MemberProfilesExtraction {
    /// Section title
    pub title: Option<String>,

    /// Member profiles
    #[serde(default)]
    pub members: Vec<MemberFields>,

    #[serde(flatten)]
    pub base: BaseExtractionFields,
}

/// Schema for a notice.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NoticeFields {
    /// Notice level: info, warning, important
    pub level: String,

    /// Notice title
    pub title: Option<String>,

    /// Notice message from text
    pub message: String,

    /// Source sentence
    pub source_quote: Option<String>,
}

/// Schema for notice extraction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NoticeExtraction {
    /// Extracted notices
    #[serde(default)]
    pub notices: Vec<NoticeFields>,

    #[serde(flatten)]
    pub base: BaseExtractionFields,
}

/// Schema for generic extraction when no specific schema exists.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenericExtraction {
    /// Extracted data
    #[serde(default)]
    pub data: std::collections::HashMap<String, Value>,

    #[serde(flatten)]
    pub base: BaseExtractionFields,
}

fn to_value<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or(Value::Null)
}

/// The planner's output schema as a JSON schema value.
pub fn planner_schema() -> Value {
    to_value::<PlannerOutput>()
}

/// The extraction schema for a component type as a JSON schema value.
pub fn extraction_schema(component_type: &str) -> Value {
    match component_type {
        "text_block" => to_value::<TextBlockExtraction>(),
        "voting_breakdown" => to_value::<VotingExtraction>(),
        "timeline" => to_value::<TimelineExtraction>(),
        "comparison" => to_value::<ComparisonExtraction>(),
        "chart" => to_value::<ChartExtraction>(),
        "data_table" => to_value::<DataTableExtraction>(),
        "member_profiles" => to_value::<MemberProfilesExtraction>(),
        "notice" => to_value::<NoticeExtraction>(),
        _ => to_value::<GenericExtraction>(),
    }
}
