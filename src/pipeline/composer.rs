//! Response composition: extracted data to a validated component layout.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::pipeline::components::parse_component;
use crate::pipeline::prompts::{format_composer_prompt, COMPOSER_SYSTEM};
use crate::traits::llm::{LlmClient, TokenUsage};
use crate::types::component::{
    Component, Layout, Notice, NoticeLevel, Section, SectionLayout, TextBlock, TextFormat,
};
use crate::types::intent::Intent;
use crate::types::result::ExtractionResult;

/// Composed output: layout, components in final order, and token usage.
pub type ComposeOutput = (Layout, Vec<Component>, TokenUsage);

/// Formats extraction results into a structured, validated response.
pub struct ResponseComposer<L> {
    llm: L,
}

impl<L: LlmClient> ResponseComposer<L> {
    pub fn new(llm: L) -> Self {
        Self { llm }
    }

    /// Compose extracted data into a layout of typed components.
    ///
    /// Returns `Err` only when the LLM call itself fails; parse problems
    /// degrade to a fallback text block.
    pub async fn compose(
        &self,
        query: &str,
        intent: &Intent,
        extractions: &[ExtractionResult],
    ) -> Result<ComposeOutput> {
        let valid: Vec<&ExtractionResult> =
            extractions.iter().filter(|e| e.is_complete()).collect();

        if valid.is_empty() {
            return Ok(insufficient_data_response(query, extractions));
        }

        let prompt = self.build_prompt(query, intent, &valid);
        let response = self.llm.invoke(COMPOSER_SYSTEM, &prompt).await?;

        let (layout, components) = parse_response(&response.content);
        let components = add_extraction_warnings(components, extractions);

        Ok((layout, components, response.usage))
    }

    fn build_prompt(&self, query: &str, intent: &Intent, extractions: &[&ExtractionResult]) -> String {
        let intent_summary = format!(
            "Type: {}, Components: {:?}",
            intent.query_type.as_str(),
            intent.expected_components
        );

        let extracted_data = extractions
            .iter()
            .map(|e| {
                format!(
                    "## {}\nCompleteness: {}\nData: {}\nWarnings: {:?}",
                    e.component_type,
                    e.completeness,
                    serde_json::to_string_pretty(&e.extracted_data).unwrap_or_default(),
                    e.warnings,
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        format_composer_prompt(
            query,
            &intent_summary,
            intent.response_depth.as_str(),
            &extracted_data,
        )
    }
}

/// Parse the composer's JSON into a layout, falling back to a raw text
/// block when the response is not parseable.
fn parse_response(content: &str) -> (Layout, Vec<Component>) {
    let json_str = extract_json(content);

    match serde_json::from_str::<Value>(json_str) {
        Ok(data) => build_layout(&data),
        Err(e) => {
            warn!(error = %e, "Failed to parse composer response");
            fallback_layout(content)
        }
    }
}

/// Extract JSON from a response, tolerating markdown code fences.
fn extract_json(content: &str) -> &str {
    if let Some(after) = content.split_once("```json").map(|(_, rest)| rest) {
        after.split("```").next().unwrap_or(after)
    } else if let Some(after) = content.split_once("```").map(|(_, rest)| rest) {
        after.split("```").next().unwrap_or(after)
    } else {
        content
    }
}

/// Build sections and components from parsed JSON, dropping components
/// that fail validation and sections left with no components.
fn build_layout(data: &Value) -> (Layout, Vec<Component>) {
    let mut components = Vec::new();
    let mut sections = Vec::new();

    let raw_sections = data
        .get("sections")
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice);

    for section_data in raw_sections {
        let mut component_ids = Vec::new();

        let raw_components = section_data
            .get("components")
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice);

        for comp_data in raw_components {
            if let Some(component) = parse_component(comp_data) {
                component_ids.push(component.id);
                components.push(component);
            }
        }

        if component_ids.is_empty() {
            debug!(
                title = section_data.get("title").and_then(|v| v.as_str()).unwrap_or("untitled"),
                "Skipping empty section"
            );
            continue;
        }

        sections.push(Section {
            component_ids,
            title: section_data
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string),
            layout: section_data
                .get("layout")
                .and_then(Value::as_str)
                .and_then(SectionLayout::parse),
        });
    }

    let layout = Layout {
        sections,
        title: data.get("title").and_then(Value::as_str).map(str::to_string),
        subtitle: data.get("subtitle").and_then(Value::as_str).map(str::to_string),
    };

    (layout, components)
}

/// A single text block holding the raw response; used when parsing fails.
fn fallback_layout(content: &str) -> (Layout, Vec<Component>) {
    let text = Component::create(TextBlock {
        content: content.to_string(),
        title: None,
        format: TextFormat::Markdown,
    });

    let section = Section {
        component_ids: vec![text.id],
        title: None,
        layout: None,
    };

    (
        Layout {
            sections: vec![section],
            title: None,
            subtitle: None,
        },
        vec![text],
    )
}

/// Insert an availability notice when any extraction reported low
/// completeness.
fn add_extraction_warnings(
    mut components: Vec<Component>,
    extractions: &[ExtractionResult],
) -> Vec<Component> {
    let low_completeness: Vec<&str> = extractions
        .iter()
        .filter(|e| e.completeness < 0.5)
        .map(|e| e.component_type.as_str())
        .collect();

    if !low_completeness.is_empty() {
        let notice = Component::create(Notice {
            message: format!(
                "Limited data available for: {}. Some information may be incomplete.",
                low_completeness.join(", ")
            ),
            level: NoticeLevel::Info,
            title: Some("Data Availability".to_string()),
        });

        let index = 1.min(components.len());
        components.insert(index, notice);
    }

    components
}

/// The response when no extraction produced usable data.
fn insufficient_data_response(query: &str, extractions: &[ExtractionResult]) -> ComposeOutput {
    let warnings: Vec<String> = extractions.iter().flat_map(|e| e.warnings.clone()).collect();

    let warning_text = if warnings.is_empty() {
        "No relevant information found in the available documents.".to_string()
    } else {
        warnings.join("; ")
    };

    let notice = Component::create(Notice {
        message: format!("Unable to answer this query: {warning_text}"),
        level: NoticeLevel::Warning,
        title: Some("Insufficient Information".to_string()),
    });

    let text = Component::create(TextBlock {
        content: format!(
            "The query '{query}' could not be answered with the available information. \
             Try refining your search or using different keywords."
        ),
        title: None,
        format: TextFormat::Markdown,
    });

    let section = Section {
        component_ids: vec![notice.id, text.id],
        title: None,
        layout: None,
    };

    let layout = Layout {
        sections: vec![section],
        title: Some("Unable to Answer Query".to_string()),
        subtitle: Some("Insufficient information available".to_string()),
    };

    (layout, vec![notice, text], TokenUsage::none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLlm;
    use crate::types::component::ComponentContent;
    use serde_json::json;
    use std::sync::Arc;

    fn complete_extraction(component_type: &str) -> ExtractionResult {
        let mut data = serde_json::Map::new();
        data.insert("content".to_string(), json!("extracted"));

        ExtractionResult {
            component_type: component_type.to_string(),
            extracted_data: data,
            source_quotes: vec!["quote".to_string()],
            completeness: 0.9,
            warnings: Vec::new(),
        }
    }

    fn composer_json() -> String {
        json!({
            "title": "Answer",
            "subtitle": "Summary",
            "sections": [{
                "title": "Main",
                "components": [
                    {"type": "text_block", "content": "A money bill deals with taxation."}
                ]
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_compose_builds_layout() {
        let llm = Arc::new(MockLlm::new().with_response(composer_json()));
        let composer = ResponseComposer::new(llm);

        let (layout, components, usage) = composer
            .compose(
                "What is a money bill?",
                &Intent::default_factual("q"),
                &[complete_extraction("text_block")],
            )
            .await
            .unwrap();

        assert_eq!(layout.title.as_deref(), Some("Answer"));
        assert_eq!(layout.sections.len(), 1);
        assert_eq!(components.len(), 1);
        assert_eq!(layout.sections[0].component_ids, vec![components[0].id]);
        assert!(usage.output_tokens > 0);
    }

    #[tokio::test]
    async fn test_compose_tolerates_code_fences() {
        let fenced = format!("```json\n{}\n```", composer_json());
        let llm = Arc::new(MockLlm::new().with_response(fenced));
        let composer = ResponseComposer::new(llm);

        let (layout, components, _) = composer
            .compose("q", &Intent::default_factual("q"), &[complete_extraction("text_block")])
            .await
            .unwrap();

        assert_eq!(layout.sections.len(), 1);
        assert_eq!(components.len(), 1);
    }

    #[tokio::test]
    async fn test_compose_drops_sections_whose_components_all_fail() {
        // Pie with 9 slices fails validation; its section must be elided
        let slices: Vec<_> = (0..9).map(|i| json!({"label": format!("P{i}"), "value": i})).collect();
        let response = json!({
            "title": "Charts",
            "sections": [
                {
                    "title": "Bad",
                    "components": [{
                        "type": "chart",
                        "chart_type": "pie",
                        "series": [{"name": "s", "data": slices}]
                    }]
                },
                {
                    "title": "Good",
                    "components": [{"type": "text_block", "content": "kept"}]
                }
            ]
        })
        .to_string();

        let llm = Arc::new(MockLlm::new().with_response(response));
        let composer = ResponseComposer::new(llm);

        let (layout, components, _) = composer
            .compose("q", &Intent::default_factual("q"), &[complete_extraction("text_block")])
            .await
            .unwrap();

        assert_eq!(layout.sections.len(), 1);
        assert_eq!(layout.sections[0].title.as_deref(), Some("Good"));
        assert_eq!(components.len(), 1);
    }

    #[tokio::test]
    async fn test_compose_unparseable_response_falls_back_to_text_block() {
        let llm = Arc::new(MockLlm::new().with_response("Sorry, here is prose instead."));
        let composer = ResponseComposer::new(llm);

        let (layout, components, _) = composer
            .compose("q", &Intent::default_factual("q"), &[complete_extraction("text_block")])
            .await
            .unwrap();

        assert_eq!(components.len(), 1);
        assert_eq!(layout.sections.len(), 1);
        match &components[0].content {
            ComponentContent::TextBlock(tb) => {
                assert!(tb.content.contains("prose instead"));
            }
            other => panic!("expected text_block, got {}", other.type_name()),
        }
    }

    #[tokio::test]
    async fn test_compose_no_complete_extractions_skips_llm() {
        let llm = Arc::new(MockLlm::new());
        let composer = ResponseComposer::new(llm.clone());

        let (layout, components, usage) = composer
            .compose(
                "q",
                &Intent::default_factual("q"),
                &[ExtractionResult::empty("chart", "No data")],
            )
            .await
            .unwrap();

        assert!(llm.calls().is_empty());
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].content.type_name(), "notice");
        assert_eq!(components[1].content.type_name(), "text_block");
        assert_eq!(layout.title.as_deref(), Some("Unable to Answer Query"));
        assert_eq!(usage.output_tokens, 0);
    }

    #[tokio::test]
    async fn test_compose_inserts_low_completeness_notice() {
        let llm = Arc::new(MockLlm::new().with_response(composer_json()));
        let composer = ResponseComposer::new(llm);

        let mut weak = complete_extraction("chart");
        weak.completeness = 0.2;

        let (_, components, _) = composer
            .compose(
                "q",
                &Intent::default_factual("q"),
                &[complete_extraction("text_block"), weak],
            )
            .await
            .unwrap();

        // Original text_block plus the availability notice at index 1
        assert_eq!(components.len(), 2);
        match &components[1].content {
            ComponentContent::Notice(n) => {
                assert_eq!(n.level, NoticeLevel::Info);
                assert!(n.message.contains("chart"));
            }
            other => panic!("expected notice, got {}", other.type_name()),
        }
    }

    #[tokio::test]
    async fn test_compose_llm_failure_is_an_error() {
        let llm = Arc::new(MockLlm::new()); // errors without canned responses
        let composer = ResponseComposer::new(llm);

        let result = composer
            .compose("q", &Intent::default_factual("q"), &[complete_extraction("text_block")])
            .await;

        assert!(result.is_err());
    }
}
