//! LLM prompts for the pipeline agents.
//!
//! These prompts are designed for consistent classification and
//! evidence-grounded extraction over parliamentary source material.

use crate::types::intent::Intent;

/// System prompt for the planner.
pub const PLANNER_SYSTEM: &str =
    "You are a query analyzer for a parliamentary information system.";

/// Prompt for classifying query intent and extracting entities.
pub const PLANNER_PROMPT: &str = r#"Analyze this query about parliamentary and political information.

Query: {query}

Determine:
1. query_type - one of:
   - factual: a direct question about a fact or definition
   - comparative: comparing parties, members, or policies
   - timeline: asking how something unfolded over time
   - voting: asking about division results or voting records
   - analytical: asking for interpretation or analysis
2. response_depth - brief, standard, or comprehensive
3. entities - parties, members, bills, and topics mentioned or implied;
   date_from/date_to in YYYY-MM-DD when the query names a period;
   document_types from: bill, hansard, vote, member, report, other
4. expected_components - which response components fit the answer, from:
   text_block, notice, chart, timeline, data_table, comparison,
   member_profiles, voting_breakdown
5. retrieval_strategy - one of:
   - single_focus: one well-defined subject
   - multi_entity: several subjects that need separate searches
   - chronological: events over time, date-ordered
   - broad: open-ended analysis needing diverse context
6. rewritten_queries - search strings optimized for vector retrieval.
   Use one per entity for multi_entity, otherwise one refined query.
7. confidence - 0.0 to 1.0

Always include text_block in expected_components."#;

/// System prompt for the extractor.
pub const EXTRACTOR_SYSTEM: &str =
    "You are a data extractor. Extract only facts explicitly stated in the context.";

/// Shared tail for every extraction prompt.
const EXTRACTION_RULES: &str = r#"Rules:
1. Extract ONLY facts explicitly stated in the context
2. Record the exact source sentence for every extracted value in source_quotes
3. Never invent names, numbers, or dates
4. Report completeness between 0.0 and 1.0 for how fully the context answers
5. List missing fields or data quality issues in warnings

Context:
{context}

Query focus: {query_focus}"#;

const TEXT_BLOCK_EXTRACTION: &str = r#"Extract the key facts needed to answer the query as narrative text.

Capture a title, the main topic, and key points with their supporting quotes.
"#;

const VOTING_EXTRACTION: &str = r#"Extract parliamentary vote data.

Capture the exact bill name, vote date (YYYY-MM-DD), result (passed/rejected/tied),
total votes for and against, abstentions, and the per-party breakdown with
votes_for, votes_against, abstentions, and not_voting counts.
"#;

const TIMELINE_EXTRACTION: &str = r#"Extract chronological events.

Capture each event's date (YYYY-MM-DD), a short label, and a description taken
from the text. Order events by date.
"#;

const COMPARISON_EXTRACTION: &str = r#"Extract comparable positions for: {entities}

Capture the entities being compared and the attributes on which they differ.
Each attribute needs one value per entity, in the same order as the items.
"#;

const CHART_EXTRACTION: &str = r#"Extract numerical data suitable for a chart.

Capture a chart_type (bar, line, pie, horizontal_bar, stacked_bar), named series,
and data points with labels and numeric values exactly as stated in the text.
"#;

const DATA_TABLE_EXTRACTION: &str = r#"Extract structured tabular data.

Capture column definitions (header and key) and rows mapping each key to a
cell value taken from the text.
"#;

const MEMBER_PROFILES_EXTRACTION: &str = r#"Extract profiles of members mentioned in the context.

Capture each member's full name, party, constituency, and roles exactly as
stated.
"#;

const NOTICE_EXTRACTION: &str = r#"Extract important caveats, warnings, or procedural notes.

Capture each notice's level (info, warning, important), an optional title, and
the message, grounded in the text.
"#;

/// Prompt for component types without a dedicated template.
const GENERIC_EXTRACTION: &str = r#"Extract data for a {component_type} component.

Capture whatever structured fields the context supports for this component.
"#;

/// System prompt for the composer.
pub const COMPOSER_SYSTEM: &str = "You are a response composer. Format the extracted data into a structured response. Output JSON only.";

/// Prompt for composing extracted data into a component layout.
pub const COMPOSER_PROMPT: &str = r#"Compose a structured response to this query from the extracted data below.

Query: {query}
Intent: {intent}
Response depth: {response_depth}

Extracted data:
{extracted_data}

Respond with a JSON object:
{
  "title": "Response Title",
  "subtitle": "Optional one-line summary of the key finding",
  "sections": [
    {
      "title": "Optional Section Title",
      "layout": null,
      "components": [ { component object } ]
    }
  ]
}

Component types (use exact "type" values):
1. "text_block" - {"type": "text_block", "title": "Optional", "content": "Markdown content"}
2. "notice" - {"type": "notice", "level": "info|warning|important", "title": "Optional", "message": "..."}
3. "chart" - {"type": "chart", "chart_type": "bar|line|pie|doughnut|horizontal_bar|stacked_bar",
   "title": "...", "series": [{"name": "...", "data": [{"label": "...", "value": 123}]}],
   "x_axis_label": "...", "y_axis_label": "..."}
4. "timeline" - {"type": "timeline", "title": "...",
   "events": [{"date": "YYYY-MM-DD", "label": "...", "description": "..."}]}
5. "data_table" - {"type": "data_table", "title": "...",
   "columns": [{"header": "...", "key": "..."}], "rows": [{"key": "value"}]}
6. "comparison" - {"type": "comparison", "title": "...", "items": [{"name": "..."}],
   "attributes": [{"name": "...", "values": ["one per item"]}]}
7. "member_profiles" - {"type": "member_profiles", "title": "...",
   "members": [{"member_id": "...", "name": "...", "party": "...", "constituency": "...", "roles": []}]}
8. "voting_breakdown" - {"type": "voting_breakdown", "title": "...", "date": "YYYY-MM-DD",
   "result": "passed|rejected|tied", "total_for": 85, "total_against": 60, "total_abstentions": 0,
   "party_breakdown": [{"party": "...", "votes_for": 0, "votes_against": 0, "abstentions": 0}]}

Layout rules:
- Sections default to stack layout (omit "layout") - single column, full width
- Only use "layout": "grid" for exactly 2 complementary visualizations, each with "size": "half"
- Text blocks, tables, timelines, and comparisons are always full width
- Keep sections focused: 1-3 components each

Content rules:
- Start with a text_block that summarizes the answer
- Use voting_breakdown for vote data, timeline for chronological sequences,
  comparison for positions across parties, chart for numerical comparisons
- All numeric values must be numbers, not strings
- Only use information from the extracted data"#;

/// System prompt for the verifier.
pub const VERIFIER_SYSTEM: &str =
    "You are a fact-checker. Verify claims against the source context. Output JSON only.";

/// Prompt for checking response claims against retrieved context.
pub const VERIFIER_PROMPT: &str = r#"Check every claim in this response against the source context.

Source context:
{context}

Response claims:
{response}

For each claim that the context does not support, record it with a severity:
- "error": the claim contradicts the context or states a specific fact absent from it
- "warning": the claim is plausible but not directly supported

Respond with a JSON object:
{
  "is_valid": true,
  "unsupported_claims": [
    {"claim_text": "...", "component_id": null, "severity": "warning"}
  ],
  "confidence_score": 0.95,
  "warnings": []
}"#;

/// Fill the planner prompt.
pub fn format_planner_prompt(query: &str) -> String {
    PLANNER_PROMPT.replace("{query}", query)
}

/// Separator placed between context chunks.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// One-line summary of intent entities for extraction prompts.
pub fn query_focus(intent: &Intent) -> String {
    let mut parts = Vec::new();

    if !intent.entities.parties.is_empty() {
        parts.push(format!("Parties: {}", intent.entities.parties.join(", ")));
    }
    if !intent.entities.members.is_empty() {
        parts.push(format!("Members: {}", intent.entities.members.join(", ")));
    }
    if !intent.entities.bills.is_empty() {
        parts.push(format!("Bills: {}", intent.entities.bills.join(", ")));
    }
    if !intent.entities.topics.is_empty() {
        parts.push(format!("Topics: {}", intent.entities.topics.join(", ")));
    }

    if parts.is_empty() {
        "General query".to_string()
    } else {
        parts.join("; ")
    }
}

/// Fill the extraction prompt for a component type.
pub fn format_extraction_prompt(component_type: &str, context: &[String], intent: &Intent) -> String {
    let template = match component_type {
        "text_block" => TEXT_BLOCK_EXTRACTION,
        "voting_breakdown" => VOTING_EXTRACTION,
        "timeline" => TIMELINE_EXTRACTION,
        "comparison" => COMPARISON_EXTRACTION,
        "chart" => CHART_EXTRACTION,
        "data_table" => DATA_TABLE_EXTRACTION,
        "member_profiles" => MEMBER_PROFILES_EXTRACTION,
        "notice" => NOTICE_EXTRACTION,
        _ => GENERIC_EXTRACTION,
    };

    let mut prompt = format!("{template}\n{EXTRACTION_RULES}")
        .replace("{context}", &context.join(CONTEXT_SEPARATOR))
        .replace("{query_focus}", &query_focus(intent))
        .replace("{component_type}", component_type);

    if component_type == "comparison" {
        let entities = if intent.entities.parties.is_empty() {
            "entities mentioned in context".to_string()
        } else {
            intent.entities.parties.join(", ")
        };
        prompt = prompt.replace("{entities}", &entities);
    }

    prompt
}

/// Fill the composer prompt.
pub fn format_composer_prompt(
    query: &str,
    intent_summary: &str,
    response_depth: &str,
    extracted_data: &str,
) -> String {
    COMPOSER_PROMPT
        .replace("{query}", query)
        .replace("{intent}", intent_summary)
        .replace("{response_depth}", response_depth)
        .replace("{extracted_data}", extracted_data)
}

/// Fill the verifier prompt.
pub fn format_verifier_prompt(context: &str, response: &str) -> String {
    VERIFIER_PROMPT
        .replace("{context}", context)
        .replace("{response}", response)
}
