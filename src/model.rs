//! BSpec document record and its vocabulary enums.
//!
//! Every document type shares one record shape; type-specific frontmatter keys
//! land in [`Document::extra`] instead of per-type structs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::BspecError;

/// Three-letter document type code (`MSN`, `STR`, `PER`, ...).
///
/// Kept as an open code rather than a closed enum so the taxonomy tables can
/// grow without touching graph or query code. The parser checks codes against
/// the configured [`crate::taxonomy::Taxonomy`].
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeCode(String);

impl TypeCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl From<String> for TypeCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

/// Lifecycle status of a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentStatus {
    #[default]
    Draft,
    Review,
    Accepted,
    Deprecated,
}

impl DocumentStatus {
    pub const ALL: [DocumentStatus; 4] = [
        DocumentStatus::Draft,
        DocumentStatus::Review,
        DocumentStatus::Accepted,
        DocumentStatus::Deprecated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "Draft",
            DocumentStatus::Review => "Review",
            DocumentStatus::Accepted => "Accepted",
            DocumentStatus::Deprecated => "Deprecated",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = BspecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| BspecError::InvalidInput(format!("Unknown status: {}", s)))
    }
}

/// Business priority of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business domain a document belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessDomain {
    Strategic,
    Market,
    Customer,
    Product,
    Model,
    Operations,
    Technology,
    Financial,
    Risk,
    Growth,
    Learning,
}

impl BusinessDomain {
    pub const ALL: [BusinessDomain; 11] = [
        BusinessDomain::Strategic,
        BusinessDomain::Market,
        BusinessDomain::Customer,
        BusinessDomain::Product,
        BusinessDomain::Model,
        BusinessDomain::Operations,
        BusinessDomain::Technology,
        BusinessDomain::Financial,
        BusinessDomain::Risk,
        BusinessDomain::Growth,
        BusinessDomain::Learning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessDomain::Strategic => "strategic",
            BusinessDomain::Market => "market",
            BusinessDomain::Customer => "customer",
            BusinessDomain::Product => "product",
            BusinessDomain::Model => "model",
            BusinessDomain::Operations => "operations",
            BusinessDomain::Technology => "technology",
            BusinessDomain::Financial => "financial",
            BusinessDomain::Risk => "risk",
            BusinessDomain::Growth => "growth",
            BusinessDomain::Learning => "learning",
        }
    }
}

impl fmt::Display for BusinessDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusinessDomain {
    type Err = BspecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BusinessDomain::ALL
            .into_iter()
            .find(|domain| domain.as_str() == s)
            .ok_or_else(|| BspecError::InvalidInput(format!("Unknown domain: {}", s)))
    }
}

/// How often a document is expected to be reviewed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewCycle {
    Monthly,
    Quarterly,
    Annually,
}

/// A parsed BSpec document.
///
/// Relationship lists default to empty and `domain` is optional; use
/// [`crate::taxonomy::Taxonomy::resolve_domain`] to get the effective domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub doc_type: TypeCode,
    pub status: DocumentStatus,
    pub version: String,

    pub owner: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stakeholders: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviewers: Vec<String>,

    /// ISO `YYYY-MM-DD`
    pub created: String,
    /// ISO `YYYY-MM-DD`
    pub updated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_cycle: Option<ReviewCycle>,

    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub enables: Vec<String>,
    #[serde(default)]
    pub conflicts_with: Vec<String>,
    #[serde(default)]
    pub related: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supersedes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<BusinessDomain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// `None` when absent; `Some(vec![])` when declared but empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_criteria: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assumptions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Markdown body without frontmatter
    #[serde(default)]
    pub content: String,
    /// Relative path the document was loaded from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Type-specific frontmatter keys
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Document {
    /// Minimal document with the given id and type; every other field defaulted.
    pub fn new(id: impl Into<String>, doc_type: impl Into<TypeCode>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            doc_type: doc_type.into(),
            version: "1.0.0".to_string(),
            ..Self::default()
        }
    }

    /// `depends_on` + `enables` + `related`, repetitions kept.
    pub fn outgoing_refs(&self) -> impl Iterator<Item = &String> {
        self.depends_on
            .iter()
            .chain(self.enables.iter())
            .chain(self.related.iter())
    }

    /// Whether `depends_on`, `enables` or `related` mentions `id`.
    pub fn references(&self, id: &str) -> bool {
        self.outgoing_refs().any(|target| target == id)
    }

    /// `depends_on` + `enables` count, used as the "relationships" sort key.
    pub fn relationship_count(&self) -> usize {
        self.depends_on.len() + self.enables.len()
    }

    pub fn has_success_criteria(&self) -> bool {
        self.success_criteria.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// Copy of the document with an empty `content` body.
    pub fn without_content(&self) -> Self {
        Self {
            content: String::new(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_names() {
        for status in DocumentStatus::ALL {
            assert_eq!(status.as_str().parse::<DocumentStatus>().unwrap(), status);
        }
        assert!("Published".parse::<DocumentStatus>().is_err());
    }

    #[test]
    fn test_domain_serde_lowercase() {
        let json = serde_json::to_string(&BusinessDomain::Operations).unwrap();
        assert_eq!(json, "\"operations\"");
        let domain: BusinessDomain = serde_json::from_str("\"risk\"").unwrap();
        assert_eq!(domain, BusinessDomain::Risk);
    }

    #[test]
    fn test_outgoing_refs_keeps_repetitions() {
        let mut doc = Document::new("STR-growth", "STR");
        doc.depends_on = vec!["MSN-core".into(), "VSN-core".into()];
        doc.enables = vec!["OBJ-q1".into()];
        doc.related = vec!["MSN-core".into()];
        assert_eq!(doc.outgoing_refs().count(), 4);
        assert!(doc.references("OBJ-q1"));
        assert!(!doc.references("PER-buyer"));
        assert_eq!(doc.relationship_count(), 3);
    }

    #[test]
    fn test_success_criteria_presence() {
        let mut doc = Document::new("OBJ-q1", "OBJ");
        assert!(!doc.has_success_criteria());
        doc.success_criteria = Some(vec![]);
        assert!(!doc.has_success_criteria());
        doc.success_criteria = Some(vec!["NPS > 40".into()]);
        assert!(doc.has_success_criteria());
    }

    #[test]
    fn test_without_content_keeps_other_fields() {
        let mut doc = Document::new("MSN-core", "MSN");
        doc.content = "Our mission".to_string();
        doc.tags = vec!["core".into()];
        let stripped = doc.without_content();
        assert!(stripped.content.is_empty());
        assert_eq!(stripped.tags, doc.tags);
        assert_eq!(stripped.id, doc.id);
    }

    #[test]
    fn test_extra_fields_preserved() {
        let json = r#"{
            "id": "PRC-tiered", "title": "Tiered pricing", "type": "PRC",
            "status": "Review", "version": "1.2.0", "owner": "finance",
            "created": "2024-01-01", "updated": "2024-02-01",
            "price_points": [9, 29, 99]
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.status, DocumentStatus::Review);
        assert!(doc.depends_on.is_empty());
        assert_eq!(doc.extra.get("price_points"), Some(&serde_json::json!([9, 29, 99])));
    }
}
