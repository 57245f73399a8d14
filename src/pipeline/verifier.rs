//! Claim verification against retrieved context.
//!
//! Verification annotates, it never censors: components are never removed,
//! and any failure degrades to a valid result with a warning.

use serde_json::Value;
use tracing::warn;

use crate::pipeline::prompts::{format_verifier_prompt, CONTEXT_SEPARATOR, VERIFIER_SYSTEM};
use crate::traits::llm::LlmClient;
use crate::types::component::{Component, ComponentContent, Layout};
use crate::types::result::{ClaimSeverity, UnsupportedClaim, VerificationResult};

/// Checks composed claims against the source context with an LLM call.
pub struct ResponseVerifier<L> {
    llm: L,
}

impl<L: LlmClient> ResponseVerifier<L> {
    pub fn new(llm: L) -> Self {
        Self { llm }
    }

    /// Verify that response claims are supported by the source context.
    pub async fn verify(
        &self,
        layout: &Layout,
        components: &[Component],
        context: &[String],
    ) -> VerificationResult {
        if context.is_empty() {
            // Nothing to check against
            return VerificationResult::valid();
        }

        let response_text = serialize_response(layout, components);
        let context_text = context.join(CONTEXT_SEPARATOR);
        let prompt = format_verifier_prompt(&context_text, &response_text);

        let content = match self.llm.invoke(VERIFIER_SYSTEM, &prompt).await {
            Ok(response) => response.content,
            Err(e) => {
                warn!(error = %e, "Verification failed");
                let mut result = VerificationResult::valid();
                result.warnings.push(format!("Verification skipped: {e}"));
                return result;
            }
        };

        parse_verification(&content)
    }
}

/// Reduce each component to a one-line summary of its salient claims.
fn serialize_response(layout: &Layout, components: &[Component]) -> String {
    let mut parts = Vec::new();

    if let Some(title) = &layout.title {
        parts.push(format!("Title: {title}"));
    }
    if let Some(subtitle) = &layout.subtitle {
        parts.push(format!("Subtitle: {subtitle}"));
    }

    for component in components {
        let line = match &component.content {
            ComponentContent::TextBlock(tb) => format!("[TextBlock] {}", tb.content),
            ComponentContent::Notice(n) => format!("[Notice] {}", n.message),
            ComponentContent::VotingBreakdown(v) => format!(
                "[VotingBreakdown] Votes: {} for, {} against",
                v.total_for, v.total_against
            ),
            ComponentContent::Timeline(t) => {
                let events: Vec<String> = t
                    .events
                    .iter()
                    .map(|e| format!("{}: {}", e.date, e.label))
                    .collect();
                format!("[Timeline] Events: {}", events.join("; "))
            }
            ComponentContent::Chart(c) => {
                let series: Vec<String> = c
                    .series
                    .iter()
                    .map(|s| {
                        let values: Vec<String> =
                            s.data.iter().map(|d| d.value.to_string()).collect();
                        format!("{}: [{}]", s.name, values.join(", "))
                    })
                    .collect();
                format!("[Chart] Data: {}", series.join("; "))
            }
            ComponentContent::Comparison(c) => {
                let attrs: Vec<String> = c
                    .attributes
                    .iter()
                    .map(|a| format!("{}: {:?}", a.name, a.values))
                    .collect();
                format!("[Comparison] {}", attrs.join("; "))
            }
            ComponentContent::DataTable(t) => format!("[DataTable] {} rows", t.rows.len()),
            ComponentContent::MemberProfiles(m) => {
                let names: Vec<&str> = m.members.iter().map(|p| p.name.as_str()).collect();
                format!("[MemberProfiles] Members: {}", names.join(", "))
            }
        };
        parts.push(line);
    }

    parts.join("\n")
}

/// Parse the verifier's JSON, degrading to valid on any parse problem.
fn parse_verification(content: &str) -> VerificationResult {
    let json_str = extract_json(content);

    let data: Value = match serde_json::from_str(json_str) {
        Ok(data) => data,
        Err(e) => {
            warn!(error = %e, "Failed to parse verification response");
            let mut result = VerificationResult::valid();
            result.warnings.push(format!("Verification parse error: {e}"));
            return result;
        }
    };

    let is_valid = data.get("is_valid").and_then(Value::as_bool).unwrap_or(true);

    let unsupported_claims = data
        .get("unsupported_claims")
        .and_then(Value::as_array)
        .map_or_else(Vec::new, |claims| {
            claims
                .iter()
                .map(|claim| UnsupportedClaim {
                    claim_text: claim
                        .get("claim_text")
                        .and_then(Value::as_str)
                        .unwrap_or("")
                        .to_string(),
                    component_id: claim
                        .get("component_id")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    severity: match claim.get("severity").and_then(Value::as_str) {
                        Some("error") => ClaimSeverity::Error,
                        _ => ClaimSeverity::Warning,
                    },
                })
                .collect()
        });

    let confidence_score = data
        .get("confidence_score")
        .and_then(Value::as_f64)
        .unwrap_or(1.0)
        .clamp(0.0, 1.0) as f32;

    let warnings = data
        .get("warnings")
        .and_then(Value::as_array)
        .map_or_else(Vec::new, |w| {
            w.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        });

    VerificationResult {
        is_valid,
        unsupported_claims,
        confidence_score,
        warnings,
    }
}

/// Extract JSON from a response, tolerating markdown code fences.
fn extract_json(content: &str) -> &str {
    if let Some((_, rest)) = content.split_once("```json") {
        rest.split("```").next().unwrap_or(rest)
    } else if let Some((_, rest)) = content.split_once("```") {
        rest.split("```").next().unwrap_or(rest)
    } else {
        content
    }
}
