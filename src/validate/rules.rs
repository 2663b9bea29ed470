//! Per-document checks that need nothing but the document and the taxonomy.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use super::{Findings, IssueCode, ValidationIssue};
use crate::model::Document;
use crate::taxonomy::Taxonomy;

const MIN_CONTENT_CHARS: usize = 100;

/// Type-specific relationship every document of that type is expected to carry
struct ExpectedRelationship {
    doc_type: &'static str,
    field: &'static str,
    target_types: &'static [&'static str],
    description: &'static str,
    recommendation: &'static str,
}

const EXPECTED_RELATIONSHIPS: &[ExpectedRelationship] = &[
    ExpectedRelationship {
        doc_type: "STR",
        field: "depends_on",
        target_types: &["MSN", "VSN"],
        description: "depend on Mission (MSN) and Vision (VSN)",
        recommendation: "Link to MSN and VSN documents",
    },
    ExpectedRelationship {
        doc_type: "OBJ",
        field: "depends_on",
        target_types: &["STR"],
        description: "depend on Strategy (STR)",
        recommendation: "Link to relevant STR document",
    },
    ExpectedRelationship {
        doc_type: "PER",
        field: "enables",
        target_types: &["CJM"],
        description: "enable Customer Journey Maps (CJM)",
        recommendation: "Link to CJM documents that use these personas",
    },
];

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]{3}-[a-z0-9-]+$").expect("Invalid regex pattern"))
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("Invalid regex pattern"))
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)TODO|TBD|\[placeholder\]|\[insert\s+\w+\]").expect("Invalid regex pattern")
    })
}

fn type_prefix(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}

pub(super) fn check_structure(doc: &Document, findings: &mut Findings) {
    if !id_pattern().is_match(&doc.id) {
        findings.push(
            ValidationIssue::error(
                IssueCode::InvalidIdFormat,
                "Document ID must follow format: TYPE-kebab-case-name",
            )
            .on("id"),
        );
    }

    let prefix = type_prefix(&doc.id);
    if doc.doc_type.as_str() != prefix {
        findings.push(
            ValidationIssue::error(
                IssueCode::TypeIdMismatch,
                format!(
                    "Document type \"{}\" does not match ID prefix \"{}\"",
                    doc.doc_type, prefix
                ),
            )
            .on("type"),
        );
    }

    if !version_pattern().is_match(&doc.version) {
        findings.push(
            ValidationIssue::error(
                IssueCode::InvalidVersionFormat,
                "Version must follow semantic versioning (x.y.z)",
            )
            .on("version"),
        );
    }

    let created = NaiveDate::parse_from_str(&doc.created, "%Y-%m-%d");
    let updated = NaiveDate::parse_from_str(&doc.updated, "%Y-%m-%d");
    if let (Ok(created), Ok(updated)) = (created, updated) {
        if created > updated {
            findings.push(
                ValidationIssue::error(
                    IssueCode::InvalidDateSequence,
                    "Created date cannot be after updated date",
                )
                .on("updated"),
            );
        }
    }

    if doc.owner.trim().is_empty() {
        findings.push(
            ValidationIssue::error(IssueCode::MissingOwner, "Document must have an owner").on("owner"),
        );
    }
}

pub(super) fn check_domain(doc: &Document, taxonomy: &Taxonomy, findings: &mut Findings) {
    if let (Some(explicit), Some(expected)) = (doc.domain, taxonomy.domain_for_type(&doc.doc_type)) {
        if explicit != expected {
            findings.push(
                ValidationIssue::error(
                    IssueCode::DomainTypeMismatch,
                    format!(
                        "Document type {} should be in {} domain, not {}",
                        doc.doc_type, expected, explicit
                    ),
                )
                .on("domain"),
            );
        }
    }

    for rule in EXPECTED_RELATIONSHIPS
        .iter()
        .filter(|rule| rule.doc_type == doc.doc_type.as_str())
    {
        let targets = match rule.field {
            "enables" => &doc.enables,
            _ => &doc.depends_on,
        };
        let satisfied = targets
            .iter()
            .any(|target| rule.target_types.contains(&type_prefix(target)));
        if !satisfied {
            findings.push(
                ValidationIssue::warning(
                    IssueCode::MissingExpectedRelationship,
                    format!("{} documents typically {}", doc.doc_type, rule.description),
                )
                .on(rule.field)
                .recommend(rule.recommendation),
            );
        }
    }
}

pub(super) fn check_content(doc: &Document, findings: &mut Findings) {
    if doc.content.chars().count() < MIN_CONTENT_CHARS {
        findings.push(
            ValidationIssue::warning(
                IssueCode::MinimalContent,
                "Document content is quite short, consider adding more detail",
            )
            .recommend("Add more context, examples, or implementation details"),
        );
    }

    if placeholder_pattern().is_match(&doc.content) {
        findings.push(
            ValidationIssue::warning(IssueCode::PlaceholderContent, "Document contains placeholder content")
                .recommend("Replace placeholder content with actual information"),
        );
    }

    if doc.success_criteria.as_ref().is_some_and(Vec::is_empty) {
        findings.push(
            ValidationIssue::warning(
                IssueCode::MissingSuccessCriteria,
                "Document has no success criteria defined",
            )
            .on("success_criteria")
            .recommend("Add measurable success criteria for validation"),
        );
    }
}
