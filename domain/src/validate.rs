use crate::models::{Document, Metadata};
use crate::profile::Domain;
use serde::Deserialize;
use serde_json::Value;
use shared::sanitize::sanitize;
use std::fmt;

/// One raw CSV row, loosely typed. The two source schemas share this shape;
/// columns absent from a file simply deserialize to `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRow {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub content_1: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub metadata: Option<String>,
}

/// Why a row was skipped. Skips are counted, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
    MissingContent,
    MissingCategory,
    BadMetadata(String),
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowRejection::MissingContent => write!(f, "missing or empty content"),
            RowRejection::MissingCategory => write!(f, "missing or empty category"),
            RowRejection::BadMetadata(reason) => write!(f, "unparsable metadata: {reason}"),
        }
    }
}

/// Turn one raw row into a [`Document`] or reject it with a reason.
///
/// All text that survives validation is sanitized here, so a returned
/// document already satisfies the storage invariants: non-empty content and
/// a non-empty value under the domain's category key.
pub fn validate(row: &RawRow, domain: Domain) -> Result<Document, RowRejection> {
    match domain {
        Domain::Health => validate_health(row),
        Domain::Order => validate_order(row),
    }
}

fn validate_health(row: &RawRow) -> Result<Document, RowRejection> {
    let mut parts = Vec::new();
    for part in [row.content.as_deref(), row.content_1.as_deref()]
        .into_iter()
        .flatten()
    {
        let clean = sanitize(part);
        if !clean.is_empty() {
            parts.push(clean);
        }
    }
    let content = parts.join(" ");
    if content.is_empty() {
        return Err(RowRejection::MissingContent);
    }

    let category = row.category.as_deref().map(sanitize).unwrap_or_default();
    if category.is_empty() {
        return Err(RowRejection::MissingCategory);
    }

    let mut metadata = Metadata::new();
    metadata.insert("category".to_string(), category);
    Ok(Document { content, metadata })
}

fn validate_order(row: &RawRow) -> Result<Document, RowRejection> {
    let content = row.text.as_deref().map(sanitize).unwrap_or_default();
    if content.is_empty() {
        return Err(RowRejection::MissingContent);
    }

    let metadata = parse_metadata(row.metadata.as_deref().unwrap_or_default())?;
    let category_key = Domain::Order.category_key();
    if metadata.get(category_key).map_or(true, String::is_empty) {
        return Err(RowRejection::MissingCategory);
    }

    Ok(Document { content, metadata })
}

/// Parse the serialized metadata column: a JSON object with scalar values.
/// Nested structures have no string form in the store and reject the row.
fn parse_metadata(raw: &str) -> Result<Metadata, RowRejection> {
    if raw.trim().is_empty() {
        return Ok(Metadata::new());
    }
    let parsed: Value = serde_json::from_str(raw)
        .map_err(|e| RowRejection::BadMetadata(e.to_string()))?;
    let object = match parsed {
        Value::Object(object) => object,
        other => {
            return Err(RowRejection::BadMetadata(format!(
                "expected an object, got {other}"
            )))
        }
    };

    let mut metadata = Metadata::new();
    for (key, value) in object {
        let value = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => {
                return Err(RowRejection::BadMetadata(format!(
                    "non-scalar value under '{key}': {other}"
                )))
            }
        };
        metadata.insert(sanitize(&key), sanitize(&value));
    }
    Ok(metadata)
}
