//! Typed UI components, the closed tagged union the composer emits.
//!
//! Components arrive from the LLM as free-form JSON and are parsed into
//! these variants after constraint validation (see `pipeline::components`
//! and `pipeline::constraints`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rendering format for text content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    Plain,
    Markdown,
}

/// Notice prominence level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Important,
}

impl NoticeLevel {
    /// Parse a level, falling back to `Info` for unknown values.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "warning" => Self::Warning,
            "important" => Self::Important,
            _ => Self::Info,
        }
    }
}

/// Chart rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Doughnut,
    HorizontalBar,
    StackedBar,
}

impl ChartType {
    /// Parse a chart type, falling back to `Bar` for unknown values.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "line" => Self::Line,
            "pie" => Self::Pie,
            "doughnut" => Self::Doughnut,
            "horizontal_bar" => Self::HorizontalBar,
            "stacked_bar" => Self::StackedBar,
            _ => Self::Bar,
        }
    }
}

/// Recorded outcome of a parliamentary vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteResult {
    Passed,
    Rejected,
    Tied,
}

impl VoteResult {
    /// Parse a result; unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "passed" => Some(Self::Passed),
            "rejected" => Some(Self::Rejected),
            "tied" => Some(Self::Tied),
            _ => None,
        }
    }
}

/// Width hint for a component inside a grid section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentSize {
    Full,
    Half,
    Third,
    TwoThirds,
    Auto,
}

impl ComponentSize {
    /// Parse a size hint; unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "full" => Some(Self::Full),
            "half" => Some(Self::Half),
            "third" => Some(Self::Third),
            "two-thirds" => Some(Self::TwoThirds),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }
}

/// Arrangement of components within a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionLayout {
    Stack,
    Grid,
    TwoColumn,
    ThreeColumn,
}

impl SectionLayout {
    /// Parse a layout; unknown values yield `None` (renderer default).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stack" => Some(Self::Stack),
            "grid" => Some(Self::Grid),
            "two-column" => Some(Self::TwoColumn),
            "three-column" => Some(Self::ThreeColumn),
            _ => None,
        }
    }
}

// --- Component payloads ---

/// Narrative or explanatory prose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBlock {
    pub content: String,
    pub title: Option<String>,
    pub format: TextFormat,
}

/// A highlighted callout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartDataPoint {
    pub label: String,
    pub value: f64,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub data: Vec<ChartDataPoint>,
}

/// A data visualization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chart {
    pub chart_type: ChartType,
    pub series: Vec<ChartSeries>,
    pub title: Option<String>,
    pub x_axis_label: Option<String>,
    pub y_axis_label: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub date: String,
    pub label: String,
    pub description: Option<String>,
    pub reference_url: Option<String>,

    /// Visual weight, 1 (minor) to 5 (major).
    pub significance: u8,
}

/// An ordered sequence of dated events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    pub events: Vec<TimelineEvent>,
    pub title: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableColumn {
    pub header: String,
    pub key: String,
    pub sortable: bool,
    pub align: String,
}

/// Structured tabular data. Each row maps column keys to cell strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataTable {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<HashMap<String, String>>,
    pub title: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonItem {
    pub name: String,
    pub description: Option<String>,
}

/// An attribute row; `values` is parallel to the comparison's items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonAttribute {
    pub name: String,
    pub values: Vec<String>,
}

/// Side-by-side comparison of named entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub items: Vec<ComparisonItem>,
    pub attributes: Vec<ComparisonAttribute>,
    pub title: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberProfile {
    pub member_id: String,
    pub name: String,
    pub party: String,
    pub constituency: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub photo_url: Option<String>,
    pub biography: Option<String>,
    pub profile_url: Option<String>,
}

/// Profiles of members mentioned in the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberProfiles {
    pub members: Vec<MemberProfile>,
    pub title: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyVote {
    pub party: String,
    pub votes_for: i64,
    pub votes_against: i64,
    pub abstentions: i64,
    pub not_voting: i64,
}

/// Parliamentary vote results with per-party breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingBreakdown {
    pub total_for: i64,
    pub total_against: i64,
    pub total_abstentions: i64,
    pub party_breakdown: Vec<PartyVote>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub result: Option<VoteResult>,
    pub caption: Option<String>,
}

/// The closed set of component payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentContent {
    TextBlock(TextBlock),
    Notice(Notice),
    Chart(Chart),
    Timeline(Timeline),
    DataTable(DataTable),
    Comparison(Comparison),
    MemberProfiles(MemberProfiles),
    VotingBreakdown(VotingBreakdown),
}

impl ComponentContent {
    /// The component's type tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::TextBlock(_) => "text_block",
            Self::Notice(_) => "notice",
            Self::Chart(_) => "chart",
            Self::Timeline(_) => "timeline",
            Self::DataTable(_) => "data_table",
            Self::Comparison(_) => "comparison",
            Self::MemberProfiles(_) => "member_profiles",
            Self::VotingBreakdown(_) => "voting_breakdown",
        }
    }
}

macro_rules! content_from {
    ($($payload:ident),*) => {
        $(
            impl From<$payload> for ComponentContent {
                fn from(value: $payload) -> Self {
                    Self::$payload(value)
                }
            }
        )*
    };
}

content_from!(
    TextBlock,
    Notice,
    Chart,
    Timeline,
    DataTable,
    Comparison,
    MemberProfiles,
    VotingBreakdown
);

/// A component envelope: payload plus identity and sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub id: Uuid,
    pub content: ComponentContent,
    pub size: Option<ComponentSize>,
}

impl Component {
    /// Wrap a payload with a fresh id.
    pub fn create(content: impl Into<ComponentContent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            size: None,
        }
    }

    /// Wrap a payload with a fresh id and a size hint.
    pub fn create_sized(content: impl Into<ComponentContent>, size: Option<ComponentSize>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            size,
        }
    }
}

/// A group of components rendered together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub component_ids: Vec<Uuid>,
    pub title: Option<String>,
    pub layout: Option<SectionLayout>,
}

/// The ordered arrangement of sections forming the response.
///
/// Every `component_ids` entry refers to a component present in the
/// response's component list; sections that would be empty are dropped
/// during composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout {
    pub sections: Vec<Section>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_create_assigns_fresh_ids() {
        let a = Component::create(Notice {
            message: "m".to_string(),
            level: NoticeLevel::Info,
            title: None,
        });
        let b = Component::create(TextBlock {
            content: "c".to_string(),
            title: None,
            format: TextFormat::Markdown,
        });
        assert_ne!(a.id, b.id);
        assert_eq!(a.content.type_name(), "notice");
        assert_eq!(b.content.type_name(), "text_block");
    }

    #[test]
    fn test_content_serializes_with_type_tag() {
        let content = ComponentContent::Notice(Notice {
            message: "check".to_string(),
            level: NoticeLevel::Warning,
            title: None,
        });
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["type"], "notice");
        assert_eq!(json["level"], "warning");
    }

    #[test]
    fn test_kebab_case_enums() {
        assert_eq!(ComponentSize::parse("two-thirds"), Some(ComponentSize::TwoThirds));
        assert_eq!(ComponentSize::parse("double"), None);
        assert_eq!(SectionLayout::parse("two-column"), Some(SectionLayout::TwoColumn));
        assert_eq!(
            serde_json::to_value(SectionLayout::ThreeColumn).unwrap(),
            serde_json::json!("three-column")
        );
    }
}
