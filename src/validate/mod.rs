//! Document and collection validation.
//!
//! Unlike the graph and query code, which tolerate any anomaly, the validator
//! is where dangling references, cycles and malformed fields get reported.
//! Nothing here fails: every check produces a [`ValidationIssue`].

mod relationships;
mod rules;

use serde::Serialize;

use crate::collection::DocumentCollection;
use crate::graph::ConformanceLevel;
use crate::model::Document;
use crate::taxonomy::Taxonomy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    InvalidIdFormat,
    TypeIdMismatch,
    InvalidVersionFormat,
    InvalidDateSequence,
    MissingOwner,
    DomainTypeMismatch,
    MissingExpectedRelationship,
    MissingDependency,
    MissingEnabledDocument,
    CircularDependency,
    ActiveConflict,
    MinimalContent,
    PlaceholderContent,
    MissingSuccessCriteria,
    DuplicateDocumentId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl ValidationIssue {
    fn error(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            severity: Severity::Error,
            field: None,
            recommendation: None,
        }
    }

    fn warning(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message)
        }
    }

    fn on(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    fn recommend(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }
}

/// Errors and warnings collected for one document
#[derive(Debug, Default)]
struct Findings {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Findings {
    fn push(&mut self, issue: ValidationIssue) {
        match issue.severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub conformance_level: ConformanceLevel,
}

/// What a document is validated against
#[derive(Debug, Clone, Copy)]
pub struct ValidationOptions<'a> {
    pub taxonomy: &'a Taxonomy,
    /// Enables the relationship checks when present
    pub collection: Option<&'a DocumentCollection>,
}

pub fn validate_document(doc: &Document, options: &ValidationOptions<'_>) -> ValidationResult {
    let mut findings = Findings::default();

    rules::check_structure(doc, &mut findings);
    rules::check_domain(doc, options.taxonomy, &mut findings);
    if let Some(collection) = options.collection {
        relationships::check(doc, collection, &mut findings);
    }
    rules::check_content(doc, &mut findings);

    let collection_size = options.collection.map_or(0, DocumentCollection::len);

    ValidationResult {
        is_valid: findings.errors.is_empty(),
        errors: findings.errors,
        warnings: findings.warnings,
        conformance_level: ConformanceLevel::from_count(collection_size),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentValidation {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub validation: ValidationResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionValidation {
    pub overall_valid: bool,
    pub document_results: Vec<DocumentValidation>,
    pub collection_errors: Vec<ValidationIssue>,
    pub conformance_level: ConformanceLevel,
}

/// Validate every document against the whole collection, then the collection
/// itself.
pub fn validate_collection(collection: &DocumentCollection, taxonomy: &Taxonomy) -> CollectionValidation {
    let options = ValidationOptions {
        taxonomy,
        collection: Some(collection),
    };

    let document_results: Vec<DocumentValidation> = collection
        .documents()
        .iter()
        .map(|doc| DocumentValidation {
            id: doc.id.clone(),
            source: doc.source.clone(),
            validation: validate_document(doc, &options),
        })
        .collect();

    let collection_errors: Vec<ValidationIssue> = collection
        .duplicate_ids()
        .iter()
        .map(|id| {
            ValidationIssue::error(
                IssueCode::DuplicateDocumentId,
                format!("Duplicate document ID found: {}", id),
            )
        })
        .collect();

    let overall_valid =
        collection_errors.is_empty() && document_results.iter().all(|r| r.validation.is_valid);

    let invalid = document_results.iter().filter(|r| !r.validation.is_valid).count();
    log::info!(
        "Validated {} documents: {} invalid, {} collection errors",
        document_results.len(),
        invalid,
        collection_errors.len()
    );

    CollectionValidation {
        overall_valid,
        document_results,
        collection_errors,
        conformance_level: ConformanceLevel::from_count(collection.len()),
    }
}
