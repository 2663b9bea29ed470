use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::traversal::{trace_dependency_chain, DependencyIndex};
use super::{DocumentNode, GraphMetrics, RelationshipEdge};
use crate::model::Document;
use crate::taxonomy::Taxonomy;

/// Collection maturity tier by document count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConformanceLevel {
    Bronze,
    Silver,
    Gold,
}

impl ConformanceLevel {
    pub fn from_count(total_documents: usize) -> Self {
        if total_documents < 25 {
            ConformanceLevel::Bronze
        } else if total_documents < 45 {
            ConformanceLevel::Silver
        } else {
            ConformanceLevel::Gold
        }
    }
}

pub fn compute_metrics(
    nodes: &[DocumentNode],
    edges: &[RelationshipEdge],
    documents: &[Document],
    taxonomy: &Taxonomy,
) -> GraphMetrics {
    let total_documents = nodes.len();
    let total_relationships = edges.len();

    let avg_connections_per_document = if total_documents == 0 {
        0.0
    } else {
        total_relationships as f64 / total_documents as f64
    };

    // Average total degree over node count, capped at 1; not the local
    // clustering coefficient
    let clustering_coefficient = if total_documents == 0 {
        0.0
    } else {
        let total_degree: usize = nodes.iter().map(|n| n.in_degree + n.out_degree).sum();
        let avg_degree = total_degree as f64 / total_documents as f64;
        (avg_degree / total_documents as f64).min(1.0)
    };

    let index = DependencyIndex::new(documents);
    let longest_dependency_chain = documents
        .iter()
        .map(|doc| trace_dependency_chain(&doc.id, &index).len())
        .max()
        .unwrap_or(0);

    let distinct_types: HashSet<_> = documents.iter().map(|doc| &doc.doc_type).collect();
    let completeness_score =
        (distinct_types.len() as f64 / taxonomy.known_type_count() as f64).min(1.0);

    GraphMetrics {
        total_documents,
        total_relationships,
        avg_connections_per_document,
        clustering_coefficient,
        longest_dependency_chain,
        conformance_level: ConformanceLevel::from_count(total_documents),
        completeness_score,
    }
}
