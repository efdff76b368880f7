//! Validation of the JSON a research job returns.

use serde_json::{Map, Value};

use crate::Error;

/// Keys the research prompt asks for, in table column order.
pub const RESEARCH_FIELDS: [&str; 15] = [
    "ccas_status",
    "ccas_status_source",
    "participating_institutions",
    "participating_institutions_source",
    "preference_list_length",
    "preference_list_length_source",
    "priority_criteria",
    "priority_criteria_source",
    "assignment_mechanism",
    "assignment_mechanism_source",
    "adoption_year",
    "adoption_year_source",
    "reform_year",
    "reform_year_source",
    "notes",
];

/// Research results for one city, each value already rendered as column text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResearchFields {
    pub ccas_status: String,
    pub ccas_status_source: String,
    pub participating_institutions: String,
    pub participating_institutions_source: String,
    pub preference_list_length: String,
    pub preference_list_length_source: String,
    pub priority_criteria: String,
    pub priority_criteria_source: String,
    pub assignment_mechanism: String,
    pub assignment_mechanism_source: String,
    pub adoption_year: String,
    pub adoption_year_source: String,
    pub reform_year: String,
    pub reform_year_source: String,
    pub notes: String,
}

/// Removes a surrounding markdown code fence (```` ```json ... ``` ````), if any.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match body.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &body[4..],
        _ => body,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Renders a JSON value as column text: null is empty, strings are unquoted,
/// arrays and objects stay compact JSON.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Parses a job's output text. Succeeds only when it is a JSON object holding every research field.
pub fn parse_research_payload(output_text: &str) -> Result<ResearchFields, Error> {
    let value: Value = serde_json::from_str(strip_code_fences(output_text))?;
    let Value::Object(object) = value else {
        return Err(Error::PayloadNotAnObject);
    };

    let missing: Vec<String> = RESEARCH_FIELDS
        .iter()
        .filter(|field| !object.contains_key(**field))
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(Error::IncompletePayload(missing));
    }

    let field = |name: &str| field_text(&object, name);
    Ok(ResearchFields {
        ccas_status: field("ccas_status"),
        ccas_status_source: field("ccas_status_source"),
        participating_institutions: field("participating_institutions"),
        participating_institutions_source: field("participating_institutions_source"),
        preference_list_length: field("preference_list_length"),
        preference_list_length_source: field("preference_list_length_source"),
        priority_criteria: field("priority_criteria"),
        priority_criteria_source: field("priority_criteria_source"),
        assignment_mechanism: field("assignment_mechanism"),
        assignment_mechanism_source: field("assignment_mechanism_source"),
        adoption_year: field("adoption_year"),
        adoption_year_source: field("adoption_year_source"),
        reform_year: field("reform_year"),
        reform_year_source: field("reform_year_source"),
        notes: field("notes"),
    })
}

fn field_text(object: &Map<String, Value>, name: &str) -> String {
    object.get(name).map(to_text).unwrap_or_default()
}
