//! Parsing free-form LLM component JSON into typed components.
//!
//! Type strings are normalized (lowercase, hyphens to underscores) and
//! aliased before constraint validation; only components passing the
//! constraint table become typed `Component`s.

use serde_json::Value;
use tracing::{debug, warn};

use crate::pipeline::constraints::validate_component;
use crate::types::component::{
    Chart, ChartDataPoint, ChartSeries, ChartType, Comparison, ComparisonAttribute,
    ComparisonItem, Component, ComponentContent, ComponentSize, DataTable, MemberProfile,
    MemberProfiles, Notice, NoticeLevel, PartyVote, TableColumn, TextBlock, TextFormat, Timeline,
    TimelineEvent, VoteResult, VotingBreakdown,
};

/// Map lenient type spellings onto canonical component tags.
fn resolve_alias(normalized: &str) -> &str {
    match normalized {
        "text" | "textblock" | "paragraph" => "text_block",
        "voting" | "vote" | "vote_breakdown" | "votes" => "voting_breakdown",
        "table" | "datatable" => "data_table",
        "compare" => "comparison",
        "members" | "member" | "profiles" | "memberprofiles" => "member_profiles",
        "graph" | "bar_chart" | "pie_chart" | "line_chart" => "chart",
        "events" | "history" => "timeline",
        "alert" | "warning" | "info" => "notice",
        other => other,
    }
}

/// Normalize a raw type string to a canonical component tag.
pub fn normalize_type(raw: &str) -> String {
    let normalized = raw.trim().to_lowercase().replace('-', "_");
    resolve_alias(&normalized).to_string()
}

fn opt_string(data: &Value, key: &str) -> Option<String> {
    data.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_or_empty(data: &Value, key: &str) -> String {
    data.get(key).and_then(Value::as_str).unwrap_or("").to_string()
}

fn number_or_zero(data: &Value, key: &str) -> f64 {
    match data.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn int_or_zero(data: &Value, key: &str) -> i64 {
    number_or_zero(data, key) as i64
}

fn items<'a>(data: &'a Value, key: &str) -> &'a [Value] {
    data.get(key).and_then(Value::as_array).map_or(&[], Vec::as_slice)
}

/// Parse a raw component object into a typed `Component`.
///
/// Returns `None` when the data fails its constraint check or the type
/// is unrecognized.
pub fn parse_component(data: &Value) -> Option<Component> {
    let raw_type = data.get("type").and_then(Value::as_str).unwrap_or("");
    let comp_type = normalize_type(raw_type);

    let size = data
        .get("size")
        .and_then(Value::as_str)
        .and_then(ComponentSize::parse);

    let validation = validate_component(&comp_type, data);
    if !validation.is_valid {
        debug!(
            component_type = %comp_type,
            reason = validation.reason.as_deref().unwrap_or(""),
            suggestion = validation.suggestion.as_deref().unwrap_or(""),
            "Skipping component"
        );
        return None;
    }

    let content: ComponentContent = match comp_type.as_str() {
        "text_block" => TextBlock {
            content: string_or_empty(data, "content").trim().to_string(),
            title: opt_string(data, "title"),
            format: TextFormat::Markdown,
        }
        .into(),

        "notice" => Notice {
            message: string_or_empty(data, "message").trim().to_string(),
            level: NoticeLevel::parse_or_default(
                data.get("level").and_then(Value::as_str).unwrap_or("info"),
            ),
            title: opt_string(data, "title"),
        }
        .into(),

        "chart" => {
            let series: Vec<ChartSeries> = items(data, "series")
                .iter()
                .filter_map(|s| {
                    let points: Vec<ChartDataPoint> = items(s, "data")
                        .iter()
                        .map(|d| ChartDataPoint {
                            label: string_or_empty(d, "label"),
                            value: number_or_zero(d, "value"),
                            category: opt_string(d, "category"),
                        })
                        .collect();
                    (!points.is_empty()).then(|| ChartSeries {
                        name: string_or_empty(s, "name"),
                        data: points,
                    })
                })
                .collect();

            if series.is_empty() {
                return None;
            }

            Chart {
                chart_type: ChartType::parse_or_default(
                    data.get("chart_type").and_then(Value::as_str).unwrap_or("bar"),
                ),
                series,
                title: opt_string(data, "title"),
                x_axis_label: opt_string(data, "x_axis_label"),
                y_axis_label: opt_string(data, "y_axis_label"),
                caption: opt_string(data, "caption"),
            }
            .into()
        }

        "timeline" => {
            let events: Vec<TimelineEvent> = items(data, "events")
                .iter()
                .filter(|e| {
                    !string_or_empty(e, "date").is_empty() || !string_or_empty(e, "label").is_empty()
                })
                .map(|e| TimelineEvent {
                    date: string_or_empty(e, "date"),
                    label: string_or_empty(e, "label"),
                    description: opt_string(e, "description"),
                    reference_url: opt_string(e, "reference_url"),
                    significance: e
                        .get("significance")
                        .and_then(Value::as_i64)
                        .map_or(3, |s| s.clamp(1, 5) as u8),
                })
                .collect();

            if events.is_empty() {
                return None;
            }

            Timeline {
                events,
                title: opt_string(data, "title"),
                caption: opt_string(data, "caption"),
            }
            .into()
        }

        "data_table" => {
            let columns: Vec<TableColumn> = items(data, "columns")
                .iter()
                .filter(|c| {
                    !string_or_empty(c, "header").is_empty() || !string_or_empty(c, "key").is_empty()
                })
                .map(|c| TableColumn {
                    header: string_or_empty(c, "header"),
                    key: string_or_empty(c, "key"),
                    sortable: c.get("sortable").and_then(Value::as_bool).unwrap_or(false),
                    align: opt_string(c, "align").unwrap_or_else(|| "left".to_string()),
                })
                .collect();

            let rows: Vec<_> = items(data, "rows")
                .iter()
                .filter_map(Value::as_object)
                .filter(|o| !o.is_empty())
                .map(|o| {
                    o.iter()
                        .map(|(k, v)| {
                            let cell = match v {
                                Value::String(s) => s.clone(),
                                other => other.to_string(),
                            };
                            (k.clone(), cell)
                        })
                        .collect()
                })
                .collect();

            if columns.is_empty() || rows.is_empty() {
                return None;
            }

            DataTable {
                columns,
                rows,
                title: opt_string(data, "title"),
                caption: opt_string(data, "caption"),
            }
            .into()
        }

        "comparison" => {
            let comparison_items: Vec<ComparisonItem> = items(data, "items")
                .iter()
                .filter(|i| !string_or_empty(i, "name").is_empty())
                .map(|i| ComparisonItem {
                    name: string_or_empty(i, "name"),
                    description: opt_string(i, "description"),
                })
                .collect();

            let attributes: Vec<ComparisonAttribute> = items(data, "attributes")
                .iter()
                .filter(|a| !string_or_empty(a, "name").is_empty() && !items(a, "values").is_empty())
                .map(|a| ComparisonAttribute {
                    name: string_or_empty(a, "name"),
                    values: items(a, "values")
                        .iter()
                        .map(|v| match v {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect(),
                })
                .collect();

            if comparison_items.is_empty() || attributes.is_empty() {
                return None;
            }

            Comparison {
                items: comparison_items,
                attributes,
                title: opt_string(data, "title"),
                caption: opt_string(data, "caption"),
            }
            .into()
        }

        "member_profiles" => {
            let members: Vec<MemberProfile> = items(data, "members")
                .iter()
                .filter(|m| !string_or_empty(m, "name").is_empty())
                .map(|m| MemberProfile {
                    member_id: string_or_empty(m, "member_id"),
                    name: string_or_empty(m, "name"),
                    party: string_or_empty(m, "party"),
                    constituency: opt_string(m, "constituency"),
                    roles: items(m, "roles")
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect(),
                    photo_url: opt_string(m, "photo_url"),
                    biography: opt_string(m, "biography"),
                    profile_url: opt_string(m, "profile_url"),
                })
                .collect();

            if members.is_empty() {
                return None;
            }

            MemberProfiles {
                members,
                title: opt_string(data, "title"),
                caption: opt_string(data, "caption"),
            }
            .into()
        }

        "voting_breakdown" => {
            let party_breakdown: Vec<PartyVote> = items(data, "party_breakdown")
                .iter()
                .filter(|p| !string_or_empty(p, "party").is_empty())
                .map(|p| PartyVote {
                    party: string_or_empty(p, "party"),
                    votes_for: int_or_zero(p, "votes_for"),
                    votes_against: int_or_zero(p, "votes_against"),
                    abstentions: int_or_zero(p, "abstentions"),
                    not_voting: int_or_zero(p, "not_voting"),
                })
                .collect();

            VotingBreakdown {
                total_for: int_or_zero(data, "total_for"),
                total_against: int_or_zero(data, "total_against"),
                total_abstentions: int_or_zero(data, "total_abstentions"),
                party_breakdown,
                title: opt_string(data, "title"),
                date: opt_string(data, "date"),
                result: data
                    .get("result")
                    .and_then(Value::as_str)
                    .and_then(VoteResult::parse),
                caption: opt_string(data, "caption"),
            }
            .into()
        }

        _ => {
            if !raw_type.is_empty() {
                warn!(raw_type, normalized = %comp_type, "Unrecognized component type");
            }
            return None;
        }
    };

    Some(Component::create_sized(content, size))
}
