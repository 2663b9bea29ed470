//! BSpec document parser: YAML frontmatter between `---` lines, markdown body
//! after it.

use chrono::NaiveDate;
use serde_json::Value as JsonValue;
use serde_yaml_ng::Value as YamlValue;

use crate::error::{BspecError, Result};
use crate::model::{Document, DocumentStatus, TypeCode};
use crate::taxonomy::Taxonomy;

/// Frontmatter keys every document must carry, non-empty
const REQUIRED_FIELDS: &[&str] = &[
    "id", "title", "type", "status", "version", "owner", "created", "updated",
];

/// Scalar keys kept as strings even when YAML reads them as numbers (`version: 1.0`)
const STRING_FIELDS: &[&str] = &["id", "title", "type", "version", "owner", "created", "updated"];

const DATE_FIELDS: &[&str] = &["created", "updated"];

pub(crate) const NO_FRONTMATTER: &str = "No YAML frontmatter found in document";

/// Split `content` into (frontmatter, body). `None` without a leading `---`
/// line and a closing `---` line.
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');

    let opening = lines.next()?;
    if opening.trim_end() != "---" {
        return None;
    }

    let yaml_start = opening.len();
    let mut offset = yaml_start;
    for line in lines {
        if line.trim_end() == "---" {
            let yaml = &content[yaml_start..offset];
            let body = &content[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }

    None
}

/// Parse one document.
///
/// # Arguments
///
/// * `content` - Raw file text
/// * `source` - Path reported in errors and stored in [`Document::source`]
/// * `taxonomy` - Vocabulary the `type` field is checked against
///
/// # Returns
///
/// The parsed document, or [`BspecError::InvalidDocument`] listing every
/// problem found. Malformed YAML is a [`BspecError::Parse`].
pub fn parse_document(content: &str, source: &str, taxonomy: &Taxonomy) -> Result<Document> {
    let invalid = |errors: Vec<String>| BspecError::InvalidDocument {
        path: source.to_string(),
        errors,
    };

    let (yaml, body) = split_frontmatter(content).ok_or_else(|| invalid(vec![NO_FRONTMATTER.to_string()]))?;

    let frontmatter: YamlValue = serde_yaml_ng::from_str(yaml)
        .map_err(|e| BspecError::Parse(format!("YAML parse error in {}: {}", source, e)))?;
    if !frontmatter.is_mapping() {
        return Err(invalid(vec!["Frontmatter must be a YAML mapping".to_string()]));
    }

    let mut fields = match serde_json::to_value(&frontmatter)? {
        JsonValue::Object(map) => map,
        _ => return Err(invalid(vec!["Frontmatter must be a YAML mapping".to_string()])),
    };

    for key in STRING_FIELDS {
        if let Some(JsonValue::Number(n)) = fields.get(*key) {
            let text = n.to_string();
            fields.insert(key.to_string(), JsonValue::String(text));
        }
    }

    let mut errors = Vec::new();

    for key in REQUIRED_FIELDS {
        let present = match fields.get(*key) {
            Some(JsonValue::String(s)) => !s.trim().is_empty(),
            Some(JsonValue::Null) | None => false,
            Some(_) => true,
        };
        if !present {
            errors.push(format!("Missing required field: {}", key));
        }
    }

    if let Some(JsonValue::String(code)) = fields.get("type") {
        let code = TypeCode::new(code.clone());
        if !code.as_str().is_empty() && !taxonomy.is_known_type(&code) {
            errors.push(format!("Invalid document type: {}", code));
        }
    }

    if let Some(JsonValue::String(status)) = fields.get("status") {
        if !status.is_empty() && status.parse::<DocumentStatus>().is_err() {
            errors.push(format!(
                "Invalid status: {} (expected one of Draft, Review, Accepted, Deprecated)",
                status
            ));
        }
    }

    for key in DATE_FIELDS {
        if let Some(JsonValue::String(date)) = fields.get(*key) {
            if !date.is_empty() && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                errors.push(format!("Invalid {} date (expected YYYY-MM-DD): {}", key, date));
            }
        }
    }

    if !errors.is_empty() {
        return Err(invalid(errors));
    }

    // `depends_on:` with nothing after it is YAML null
    fields.retain(|_, value| !value.is_null());
    fields.insert("content".to_string(), JsonValue::String(body.trim().to_string()));
    fields.remove("source");

    let mut document: Document = serde_json::from_value(JsonValue::Object(fields))
        .map_err(|e| invalid(vec![e.to_string()]))?;
    document.source = Some(source.to_string());

    log::debug!("Parsed {} from {}", document.id, source);
    Ok(document)
}
