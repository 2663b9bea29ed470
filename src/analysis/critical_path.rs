use serde::Serialize;

use crate::model::{BusinessDomain, Document, DocumentStatus};
use crate::taxonomy::Taxonomy;

const WEEKS_PER_STEP: usize = 2;
const BLOCKER_DEPENDENCY_COUNT: usize = 3;
const MIN_STRATEGIC_DOCUMENTS: usize = 4;
const MIN_OPERATIONS_DOCUMENTS: usize = 6;

/// Suggested implementation order for a collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPath {
    pub path: Vec<String>,
    pub estimated_duration_weeks: usize,
    /// Draft documents with more than three dependencies
    pub blockers: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Strategic foundation documents first, then accepted operations documents.
pub fn critical_path(documents: &[Document], taxonomy: &Taxonomy) -> CriticalPath {
    let foundation = documents
        .iter()
        .filter(|doc| taxonomy.is_foundation_type(&doc.doc_type));
    let operational = documents.iter().filter(|doc| {
        doc.status == DocumentStatus::Accepted
            && taxonomy.resolve_domain(doc) == BusinessDomain::Operations
    });
    let path: Vec<String> = foundation.chain(operational).map(|doc| doc.id.clone()).collect();

    let blockers = documents
        .iter()
        .filter(|doc| {
            doc.status == DocumentStatus::Draft && doc.depends_on.len() > BLOCKER_DEPENDENCY_COUNT
        })
        .map(|doc| doc.id.clone())
        .collect();

    CriticalPath {
        estimated_duration_weeks: path.len() * WEEKS_PER_STEP,
        path,
        blockers,
        recommendations: recommendations(documents, taxonomy),
    }
}

fn recommendations(documents: &[Document], taxonomy: &Taxonomy) -> Vec<String> {
    let count_in = |domain: BusinessDomain| {
        documents
            .iter()
            .filter(|doc| taxonomy.resolve_domain(doc) == domain)
            .count()
    };

    let mut recommendations = Vec::new();
    if count_in(taxonomy.strategic_domain()) < MIN_STRATEGIC_DOCUMENTS {
        recommendations.push(
            "Complete strategic foundation documents (MSN, VSN, VAL, STR) first".to_string(),
        );
    }
    if count_in(BusinessDomain::Operations) < MIN_OPERATIONS_DOCUMENTS {
        recommendations
            .push("Define core operational processes and organizational structure".to_string());
    }
    recommendations
}
