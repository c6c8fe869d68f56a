//! Client-side endpoint filtering for `findEndpoint`.

use serde_json::{Map, Value};

use crate::error::{Result, SophosError};

/// Field/value pairs every matching record must contain, compared as
/// case-insensitive substrings.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointFilter {
    criteria: Vec<(String, String)>,
}

impl EndpointFilter {
    /// Parse the free-form filter parameter. It must be a JSON object.
    pub fn parse(raw: &str) -> Result<Self> {
        let parsed: Value = serde_json::from_str(raw)
            .map_err(|_| SophosError::InvalidFilterSyntax("filter must be valid JSON".to_string()))?;
        let Value::Object(map) = parsed else {
            return Err(SophosError::InvalidFilterSyntax(
                "filter must be a JSON object".to_string(),
            ));
        };
        Ok(Self::from_map(&map))
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let criteria = map
            .iter()
            .map(|(key, value)| (key.clone(), criterion_text(value).to_lowercase()))
            .collect();
        Self { criteria }
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// True when every criterion is a substring of the record's field.
    /// Missing and `null` fields compare as the empty string.
    pub fn matches(&self, record: &Value) -> bool {
        self.criteria.iter().all(|(key, needle)| {
            let field = record.get(key).map(field_text).unwrap_or_default();
            field.to_lowercase().contains(needle.as_str())
        })
    }

    /// Keep the matching records, preserving order.
    pub fn apply<'a>(&self, records: impl IntoIterator<Item = &'a Value>) -> Vec<Value> {
        records
            .into_iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

/// Text of a record field. `null` reads as empty.
fn field_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => display_text(other),
    }
}

/// Text of a filter value. `null` reads as the literal `null`.
fn criterion_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        other => display_text(other),
    }
}

/// Loose string form: strings unquoted, arrays comma-joined, objects opaque.
fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(values) => values
            .iter()
            .map(field_text)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
