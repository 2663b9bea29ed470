//! Relationship graph: node/edge construction, graph-wide metrics, domain
//! clusters and cycle-safe dependency traversal.
//!
//! A [`RelationshipGraph`] is a pure function of the input documents. It is
//! rebuilt on every call and never cached here.

mod builder;
mod clusters;
mod metrics;
pub(crate) mod traversal;

pub use builder::{build_edges, build_nodes};
pub use clusters::analyze_clusters;
pub use metrics::{compute_metrics, ConformanceLevel};
pub use traversal::{trace_dependency_chain, DependencyIndex, MAX_CHAIN_DEPTH};

use serde::{Deserialize, Serialize};

use crate::model::{BusinessDomain, Document, DocumentStatus, Priority, TypeCode};
use crate::taxonomy::Taxonomy;

/// Kind of a declared cross-document reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    DependsOn,
    Enables,
    ConflictsWith,
    Related,
    Supersedes,
}

impl RelationshipKind {
    /// Fixed edge weight per kind
    pub fn strength(&self) -> f64 {
        match self {
            RelationshipKind::DependsOn => 1.0,
            RelationshipKind::ConflictsWith => 0.9,
            RelationshipKind::Supersedes => 1.0,
            RelationshipKind::Enables => 0.8,
            RelationshipKind::Related => 0.5,
        }
    }
}

/// One document in the graph
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNode {
    pub id: String,
    #[serde(rename = "type")]
    pub doc_type: TypeCode,
    pub title: String,
    pub domain: BusinessDomain,
    pub status: DocumentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Share of other documents linked by depends_on/enables, in [0, 1]
    pub centrality: f64,
    pub in_degree: usize,
    pub out_degree: usize,
}

/// One declared reference. Targets may be absent from the collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    pub strength: f64,
}

/// Cluster criticality rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    High,
    Medium,
    Low,
}

/// Documents sharing one business domain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainCluster {
    pub domain: BusinessDomain,
    pub documents: Vec<String>,
    /// Share of the domain's expected-type checklist that is present
    pub completeness: f64,
    /// References leaving the cluster
    pub connections: usize,
    pub criticality: Criticality,
}

/// Graph-wide aggregates
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetrics {
    pub total_documents: usize,
    pub total_relationships: usize,
    pub avg_connections_per_document: f64,
    pub clustering_coefficient: f64,
    pub longest_dependency_chain: usize,
    pub conformance_level: ConformanceLevel,
    pub completeness_score: f64,
}

/// Derived view of a document collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipGraph {
    pub nodes: Vec<DocumentNode>,
    pub edges: Vec<RelationshipEdge>,
    pub clusters: Vec<DomainCluster>,
    pub metrics: GraphMetrics,
}

/// Build the full relationship graph for `documents`.
pub fn build_graph(documents: &[Document], taxonomy: &Taxonomy) -> RelationshipGraph {
    let nodes = build_nodes(documents, taxonomy);
    let edges = build_edges(documents);
    let clusters = analyze_clusters(documents, taxonomy);
    let metrics = compute_metrics(&nodes, &edges, documents, taxonomy);

    log::debug!(
        "Built relationship graph: {} nodes, {} edges, {} clusters",
        nodes.len(),
        edges.len(),
        clusters.len()
    );

    RelationshipGraph {
        nodes,
        edges,
        clusters,
        metrics,
    }
}
