//! Component constraints gating acceptance of LLM-produced components.
//!
//! A component only renders when it carries meaningful data: no charts with
//! a single point, no comparisons with one item, no empty tables. Validation
//! runs on the raw JSON before the typed component is constructed.

use serde_json::Value;
use tracing::warn;

/// Kinds of constraint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintViolation {
    InsufficientData,
    InvalidStructure,

    /// Data exists but doesn't suit this component type.
    PoorFit,
}

/// Result of component validation.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub violation: Option<ConstraintViolation>,
    pub reason: Option<String>,

    /// Alternative component or chart type to use instead.
    pub suggestion: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            violation: None,
            reason: None,
            suggestion: None,
        }
    }

    pub fn invalid(
        violation: ConstraintViolation,
        reason: impl Into<String>,
        suggestion: Option<&str>,
    ) -> Self {
        Self {
            is_valid: false,
            violation: Some(violation),
            reason: Some(reason.into()),
            suggestion: suggestion.map(str::to_string),
        }
    }
}

/// Single point chart is meaningless.
const CHART_MIN_DATA_POINTS: usize = 2;

/// Too many points becomes unreadable (warn only).
const CHART_MAX_DATA_POINTS: usize = 20;

/// Pie charts lose clarity with too many slices.
const PIE_MAX_SLICES: usize = 7;

/// Need at least 3 points to show a trend.
const LINE_MIN_DATA_POINTS: usize = 3;

const COMPARISON_MIN_ITEMS: usize = 2;

/// Too many comparison items becomes unwieldy (warn only).
const COMPARISON_MAX_ITEMS: usize = 5;

const COMPARISON_MIN_ATTRIBUTES: usize = 1;
const TIMELINE_MIN_EVENTS: usize = 2;
const TABLE_MIN_ROWS: usize = 2;
const TABLE_MIN_COLUMNS: usize = 2;
const MEMBERS_MIN_COUNT: usize = 1;

fn array<'a>(data: &'a Value, key: &str) -> &'a [Value] {
    data.get(key).and_then(Value::as_array).map_or(&[], Vec::as_slice)
}

fn str_present(data: &Value, key: &str) -> bool {
    data.get(key)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

/// Coerce a JSON value to a number, accepting numeric strings.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn validate_chart(data: &Value) -> ValidationResult {
    let series = array(data, "series");
    let chart_type = data.get("chart_type").and_then(Value::as_str).unwrap_or("bar");

    if series.is_empty() {
        return ValidationResult::invalid(
            ConstraintViolation::InsufficientData,
            "Chart has no series data",
            Some("text_block"),
        );
    }

    let total_points: usize = series.iter().map(|s| array(s, "data").len()).sum();

    if total_points < CHART_MIN_DATA_POINTS {
        return ValidationResult::invalid(
            ConstraintViolation::InsufficientData,
            format!("Chart has only {total_points} data point(s), minimum is {CHART_MIN_DATA_POINTS}"),
            Some("text_block"),
        );
    }

    for s in series {
        for point in array(s, "data") {
            match point.get("value") {
                None | Some(Value::Null) => {
                    return ValidationResult::invalid(
                        ConstraintViolation::InvalidStructure,
                        "Chart data point missing value",
                        None,
                    );
                }
                Some(value) => {
                    if as_number(value).is_none() {
                        return ValidationResult::invalid(
                            ConstraintViolation::InvalidStructure,
                            format!("Chart data point has non-numeric value: {value}"),
                            None,
                        );
                    }
                }
            }
        }
    }

    if chart_type == "pie" || chart_type == "doughnut" {
        let points = series.first().map_or(&[][..], |s| array(s, "data"));

        if points.len() > PIE_MAX_SLICES {
            return ValidationResult::invalid(
                ConstraintViolation::PoorFit,
                format!(
                    "Pie chart has {} slices, maximum recommended is {PIE_MAX_SLICES}",
                    points.len()
                ),
                Some("bar"),
            );
        }

        for point in points {
            let value = point.get("value").and_then(as_number).unwrap_or(0.0);
            if value < 0.0 {
                return ValidationResult::invalid(
                    ConstraintViolation::PoorFit,
                    "Pie chart cannot display negative values",
                    Some("bar"),
                );
            }
        }
    } else if chart_type == "line" {
        for s in series {
            let points = array(s, "data").len();
            if points < LINE_MIN_DATA_POINTS {
                return ValidationResult::invalid(
                    ConstraintViolation::PoorFit,
                    format!("Line chart series has only {points} points, minimum is {LINE_MIN_DATA_POINTS}"),
                    Some("bar"),
                );
            }
        }
    }

    if total_points > CHART_MAX_DATA_POINTS {
        warn!(
            total_points,
            max = CHART_MAX_DATA_POINTS,
            "Chart may be hard to read"
        );
    }

    ValidationResult::valid()
}

fn validate_comparison(data: &Value) -> ValidationResult {
    let valid_items = array(data, "items")
        .iter()
        .filter(|i| str_present(i, "name"))
        .count();

    let valid_attributes = array(data, "attributes")
        .iter()
        .filter(|a| str_present(a, "name") && !array(a, "values").is_empty())
        .count();

    if valid_items < COMPARISON_MIN_ITEMS {
        return ValidationResult::invalid(
            ConstraintViolation::InsufficientData,
            format!("Comparison has only {valid_items} item(s), minimum is {COMPARISON_MIN_ITEMS}"),
            Some("text_block"),
        );
    }

    if valid_attributes < COMPARISON_MIN_ATTRIBUTES {
        return ValidationResult::invalid(
            ConstraintViolation::InsufficientData,
            "Comparison has no attributes to compare",
            Some("text_block"),
        );
    }

    if valid_items > COMPARISON_MAX_ITEMS {
        warn!(
            items = valid_items,
            max = COMPARISON_MAX_ITEMS,
            "Comparison may be hard to read"
        );
    }

    ValidationResult::valid()
}

fn validate_timeline(data: &Value) -> ValidationResult {
    let valid_events = array(data, "events")
        .iter()
        .filter(|e| str_present(e, "date") || str_present(e, "label"))
        .count();

    if valid_events < TIMELINE_MIN_EVENTS {
        return ValidationResult::invalid(
            ConstraintViolation::InsufficientData,
            format!("Timeline has only {valid_events} event(s), minimum is {TIMELINE_MIN_EVENTS}"),
            Some("text_block"),
        );
    }

    ValidationResult::valid()
}

fn validate_data_table(data: &Value) -> ValidationResult {
    let valid_columns = array(data, "columns")
        .iter()
        .filter(|c| str_present(c, "header") || str_present(c, "key"))
        .count();

    let valid_rows = array(data, "rows")
        .iter()
        .filter(|r| r.as_object().is_some_and(|o| !o.is_empty()))
        .count();

    if valid_columns < TABLE_MIN_COLUMNS {
        return ValidationResult::invalid(
            ConstraintViolation::InsufficientData,
            format!("Table has only {valid_columns} column(s), minimum is {TABLE_MIN_COLUMNS}"),
            Some("text_block"),
        );
    }

    if valid_rows < TABLE_MIN_ROWS {
        return ValidationResult::invalid(
            ConstraintViolation::InsufficientData,
            format!("Table has only {valid_rows} row(s), minimum is {TABLE_MIN_ROWS}"),
            Some("text_block"),
        );
    }

    ValidationResult::valid()
}

fn validate_voting_breakdown(data: &Value) -> ValidationResult {
    let total_for = data.get("total_for").and_then(as_number).unwrap_or(0.0);
    let total_against = data.get("total_against").and_then(as_number).unwrap_or(0.0);

    let has_totals = total_for > 0.0 || total_against > 0.0;

    let has_party_votes = array(data, "party_breakdown").iter().any(|p| {
        str_present(p, "party")
            && (p.get("votes_for").and_then(as_number).unwrap_or(0.0) > 0.0
                || p.get("votes_against").and_then(as_number).unwrap_or(0.0) > 0.0)
    });

    if !has_totals && !has_party_votes {
        return ValidationResult::invalid(
            ConstraintViolation::InsufficientData,
            "Voting breakdown has no vote data",
            Some("text_block"),
        );
    }

    ValidationResult::valid()
}

fn validate_member_profiles(data: &Value) -> ValidationResult {
    let valid_members = array(data, "members")
        .iter()
        .filter(|m| str_present(m, "name"))
        .count();

    if valid_members < MEMBERS_MIN_COUNT {
        return ValidationResult::invalid(
            ConstraintViolation::InsufficientData,
            "Member profiles has no valid members",
            None,
        );
    }

    ValidationResult::valid()
}

fn validate_text_block(data: &Value) -> ValidationResult {
    if !str_present(data, "content") {
        return ValidationResult::invalid(
            ConstraintViolation::InsufficientData,
            "Text block has no content",
            None,
        );
    }

    ValidationResult::valid()
}

fn validate_notice(data: &Value) -> ValidationResult {
    if !str_present(data, "message") {
        return ValidationResult::invalid(
            ConstraintViolation::InsufficientData,
            "Notice has no message",
            None,
        );
    }

    ValidationResult::valid()
}

/// Validate component data against the per-type constraint table.
///
/// Unknown component types validate; the parser rejects them afterwards.
pub fn validate_component(component_type: &str, data: &Value) -> ValidationResult {
    match component_type {
        "chart" => validate_chart(data),
        "comparison" => validate_comparison(data),
        "timeline" => validate_timeline(data),
        "data_table" => validate_data_table(data),
        "voting_breakdown" => validate_voting_breakdown(data),
        "member_profiles" => validate_member_profiles(data),
        "text_block" => validate_text_block(data),
        "notice" => validate_notice(data),
        _ => ValidationResult::valid(),
    }
}
