//! Grounded per-component extraction.
//!
//! One schema-constrained LLM call per expected component type. The schema
//! always carries `source_quotes`, `completeness`, and `warnings`; the
//! remaining fields become the extraction's data record. The extractor
//! reports low completeness rather than inventing values.

use serde_json::Value;
use tracing::warn;

use crate::pipeline::prompts::{format_extraction_prompt, EXTRACTOR_SYSTEM};
use crate::pipeline::schemas::{extraction_schema, BaseExtractionFields, BASE_EXTRACTION_KEYS};
use crate::traits::llm::LlmClient;
use crate::types::intent::Intent;
use crate::types::result::ExtractionResult;

/// Extracts structured, evidence-grounded data from retrieved context.
pub struct DataExtractor<L> {
    llm: L,
}

impl<L: LlmClient> DataExtractor<L> {
    pub fn new(llm: L) -> Self {
        Self { llm }
    }

    /// Extract data for one component type from the context chunks.
    ///
    /// Never fails: an empty context or any LLM error yields an empty
    /// extraction carrying the reason as a warning.
    pub async fn extract(
        &self,
        component_type: &str,
        context: &[String],
        intent: &Intent,
    ) -> ExtractionResult {
        if context.is_empty() {
            return ExtractionResult::empty(component_type, "No context available");
        }

        let prompt = format_extraction_prompt(component_type, context, intent);
        let schema = extraction_schema(component_type);

        let response = match self.llm.invoke_structured(EXTRACTOR_SYSTEM, &prompt, schema).await {
            Ok(response) => response,
            Err(e) => {
                warn!(component_type, error = %e, "Extraction failed");
                return ExtractionResult::empty(component_type, e.to_string());
            }
        };

        build_extraction_result(response.value, component_type)
    }
}

/// Split a structured response into grounding fields and extracted data.
fn build_extraction_result(value: Value, component_type: &str) -> ExtractionResult {
    let Value::Object(mut fields) = value else {
        return ExtractionResult::empty(component_type, "Extraction output was not an object");
    };

    let base: BaseExtractionFields =
        serde_json::from_value(Value::Object(fields.clone())).unwrap_or_default();

    for key in BASE_EXTRACTION_KEYS {
        fields.remove(key);
    }

    ExtractionResult {
        component_type: component_type.to_string(),
        extracted_data: fields,
        source_quotes: base.source_quotes,
        completeness: base.completeness.clamp(0.0, 1.0),
        warnings: base.warnings,
    }
}
