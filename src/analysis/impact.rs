use serde::Serialize;

use crate::graph::DependencyIndex;
use crate::model::Document;

/// Risk rating of a change, by share of the collection affected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    fn from_ratio(ratio: f64) -> Self {
        if ratio > 0.5 {
            RiskLevel::Critical
        } else if ratio > 0.3 {
            RiskLevel::High
        } else if ratio > 0.1 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Documents affected by a change to `document_id`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysis {
    pub document_id: String,
    /// Documents whose depends_on names the changed document
    pub directly_affected: Vec<String>,
    /// Documents reached through further "depends on me" hops
    pub transitively_affected: Vec<String>,
    pub total_impact: usize,
    pub risk_level: RiskLevel,
}

/// Impact of changing `document_id`.
///
/// An id absent from `documents` is not an error; nothing depends on it
/// unless some document names it, and the result says so.
pub fn analyze_impact(document_id: &str, documents: &[Document]) -> ImpactAnalysis {
    let index = DependencyIndex::new(documents);

    let directly_affected: Vec<String> = index
        .dependents_of(document_id)
        .iter()
        .map(|id| id.to_string())
        .collect();
    let transitively_affected = index.transitive_dependents(document_id);

    let total_impact = directly_affected.len() + transitively_affected.len();
    let ratio = if documents.is_empty() {
        0.0
    } else {
        total_impact as f64 / documents.len() as f64
    };

    log::debug!(
        "Impact of {}: {} direct, {} transitive",
        document_id,
        directly_affected.len(),
        transitively_affected.len()
    );

    ImpactAnalysis {
        document_id: document_id.to_string(),
        directly_affected,
        transitively_affected,
        total_impact,
        risk_level: RiskLevel::from_ratio(ratio),
    }
}
