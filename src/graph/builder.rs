//! Node and edge construction.

use std::collections::{BTreeSet, HashMap, HashSet};

use super::{DocumentNode, RelationshipEdge, RelationshipKind};
use crate::model::Document;
use crate::taxonomy::Taxonomy;

/// One node per document, in input order.
///
/// `in_degree` counts other documents whose depends_on/enables/related
/// mention this id; `out_degree` is the length of this document's own three
/// lists, repetitions included.
pub fn build_nodes(documents: &[Document], taxonomy: &Taxonomy) -> Vec<DocumentNode> {
    // target id -> positions of documents that mention it (any of the three lists)
    let mut mentioned_by: HashMap<&str, BTreeSet<usize>> = HashMap::new();
    // target id -> positions of documents that mention it via depends_on/enables
    let mut linked_by: HashMap<&str, BTreeSet<usize>> = HashMap::new();
    let mut positions_by_id: HashMap<&str, Vec<usize>> = HashMap::new();

    for (position, doc) in documents.iter().enumerate() {
        positions_by_id.entry(doc.id.as_str()).or_default().push(position);
        for target in doc.outgoing_refs() {
            mentioned_by.entry(target.as_str()).or_default().insert(position);
        }
        for target in doc.depends_on.iter().chain(doc.enables.iter()) {
            linked_by.entry(target.as_str()).or_default().insert(position);
        }
    }

    let denominator = documents.len().saturating_sub(1).max(1) as f64;

    documents
        .iter()
        .enumerate()
        .map(|(position, doc)| {
            let in_degree = mentioned_by
                .get(doc.id.as_str())
                .map(|referrers| referrers.iter().filter(|&&p| p != position).count())
                .unwrap_or(0);

            let mut neighbours: HashSet<usize> = linked_by
                .get(doc.id.as_str())
                .map(|referrers| referrers.iter().copied().collect())
                .unwrap_or_default();
            for target in doc.depends_on.iter().chain(doc.enables.iter()) {
                if let Some(positions) = positions_by_id.get(target.as_str()) {
                    neighbours.extend(positions.iter().copied());
                }
            }
            neighbours.remove(&position);

            let centrality = if documents.len() > 1 {
                neighbours.len() as f64 / denominator
            } else {
                0.0
            };

            DocumentNode {
                id: doc.id.clone(),
                doc_type: doc.doc_type.clone(),
                title: doc.title.clone(),
                domain: taxonomy.resolve_domain(doc),
                status: doc.status,
                priority: doc.priority,
                centrality,
                in_degree,
                out_degree: doc.outgoing_refs().count(),
            }
        })
        .collect()
}

/// One edge per declared reference, never deduplicated.
///
/// Dangling targets are kept; `supersedes` adds at most one edge per document.
pub fn build_edges(documents: &[Document]) -> Vec<RelationshipEdge> {
    let mut edges = Vec::new();

    for doc in documents {
        let declared = [
            (RelationshipKind::DependsOn, &doc.depends_on),
            (RelationshipKind::Enables, &doc.enables),
            (RelationshipKind::ConflictsWith, &doc.conflicts_with),
            (RelationshipKind::Related, &doc.related),
        ];

        for (kind, targets) in declared {
            edges.extend(targets.iter().map(|target| RelationshipEdge {
                source: doc.id.clone(),
                target: target.clone(),
                kind,
                strength: kind.strength(),
            }));
        }

        if let Some(target) = &doc.supersedes {
            edges.push(RelationshipEdge {
                source: doc.id.clone(),
                target: target.clone(),
                kind: RelationshipKind::Supersedes,
                strength: RelationshipKind::Supersedes.strength(),
            });
        }
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BusinessDomain;

    fn doc(id: &str, depends_on: &[&str], enables: &[&str], related: &[&str]) -> Document {
        let mut d = Document::new(id, &id[..3]);
        d.depends_on = depends_on.iter().map(|s| s.to_string()).collect();
        d.enables = enables.iter().map(|s| s.to_string()).collect();
        d.related = related.iter().map(|s| s.to_string()).collect();
        d
    }

    fn node<'a>(nodes: &'a [DocumentNode], id: &str) -> &'a DocumentNode {
        nodes.iter().find(|n| n.id == id).unwrap()
    }

    #[test]
    fn test_in_degree_counts_other_referencing_documents() {
        let docs = vec![
            doc("STR-growth", &["MSN-core"], &[], &["MSN-core"]),
            doc("VSN-2030", &[], &["MSN-core"], &[]),
            doc("MSN-core", &["MSN-core"], &[], &[]),
            doc("OBJ-q1", &[], &[], &[]),
        ];
        let nodes = build_nodes(&docs, &Taxonomy::default());

        // STR mentions MSN twice but counts once; MSN's self reference does not count
        assert_eq!(node(&nodes, "MSN-core").in_degree, 2);
        assert_eq!(node(&nodes, "STR-growth").in_degree, 0);
        assert_eq!(node(&nodes, "STR-growth").out_degree, 2);
        assert_eq!(node(&nodes, "MSN-core").out_degree, 1);
    }

    #[test]
    fn test_in_degree_property_holds_for_every_node() {
        let docs = vec![
            doc("AAA-a", &["BBB-b", "CCC-c"], &["DDD-d"], &[]),
            doc("BBB-b", &[], &["AAA-a"], &["CCC-c"]),
            doc("CCC-c", &["ZZZ-ghost"], &[], &["AAA-a", "BBB-b"]),
            doc("DDD-d", &[], &[], &[]),
        ];
        let nodes = build_nodes(&docs, &Taxonomy::default());
        for (position, doc) in docs.iter().enumerate() {
            let expected = docs
                .iter()
                .enumerate()
                .filter(|(p, other)| *p != position && other.references(&doc.id))
                .count();
            assert_eq!(nodes[position].in_degree, expected, "in_degree of {}", doc.id);
        }
    }

    #[test]
    fn test_centrality_counts_distinct_neighbours_both_directions() {
        let docs = vec![
            doc("STR-growth", &["MSN-core"], &[], &[]),
            doc("MSN-core", &[], &["STR-growth"], &[]),
            doc("VSN-2030", &[], &[], &["MSN-core"]),
            doc("OBJ-q1", &["MSN-core"], &[], &[]),
            doc("PER-buyer", &[], &[], &[]),
        ];
        let nodes = build_nodes(&docs, &Taxonomy::default());
        // MSN linked to STR (both ways, counted once) and OBJ; related does not count
        assert!((node(&nodes, "MSN-core").centrality - 2.0 / 4.0).abs() < 1e-12);
        assert_eq!(node(&nodes, "PER-buyer").centrality, 0.0);
        assert!(nodes.iter().all(|n| (0.0..=1.0).contains(&n.centrality)));
    }

    #[test]
    fn test_single_document_centrality_zero() {
        let docs = vec![doc("MSN-core", &["MSN-core"], &[], &[])];
        let nodes = build_nodes(&docs, &Taxonomy::default());
        assert_eq!(nodes[0].centrality, 0.0);
    }

    #[test]
    fn test_node_domain_resolution() {
        let mut explicit = doc("PER-buyer", &[], &[], &[]);
        explicit.domain = Some(BusinessDomain::Product);
        let docs = vec![explicit, doc("SEG-smb", &[], &[], &[])];
        let nodes = build_nodes(&docs, &Taxonomy::default());
        assert_eq!(nodes[0].domain, BusinessDomain::Product);
        assert_eq!(nodes[1].domain, BusinessDomain::Market);
    }

    #[test]
    fn test_edges_with_strengths_and_no_dedup() {
        let mut a = doc("STR-growth", &["MSN-core"], &["OBJ-q1"], &["VSN-2030"]);
        a.conflicts_with = vec!["STR-old".to_string()];
        a.supersedes = Some("STR-old".to_string());
        let b = doc("OBJ-q1", &["MSN-core"], &[], &[]);
        let edges = build_edges(&[a, b]);

        assert_eq!(edges.len(), 6);
        let to_msn = edges
            .iter()
            .filter(|e| e.target == "MSN-core" && e.kind == RelationshipKind::DependsOn)
            .count();
        assert_eq!(to_msn, 2);

        let strength = |kind: RelationshipKind| edges.iter().find(|e| e.kind == kind).unwrap().strength;
        assert_eq!(strength(RelationshipKind::DependsOn), 1.0);
        assert_eq!(strength(RelationshipKind::Enables), 0.8);
        assert_eq!(strength(RelationshipKind::ConflictsWith), 0.9);
        assert_eq!(strength(RelationshipKind::Related), 0.5);
        assert_eq!(strength(RelationshipKind::Supersedes), 1.0);
    }

    #[test]
    fn test_edges_emitted_per_document_in_kind_order() {
        let mut a = doc("STR-growth", &["MSN-core"], &["OBJ-q1"], &["VSN-2030"]);
        a.supersedes = Some("STR-old".to_string());
        let b = doc("OBJ-q1", &["STR-growth"], &[], &["MSN-core"]);
        let order: Vec<(&str, RelationshipKind)> = build_edges(&[a, b])
            .iter()
            .map(|e| (if e.source == "STR-growth" { "a" } else { "b" }, e.kind))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a", RelationshipKind::DependsOn),
                ("a", RelationshipKind::Enables),
                ("a", RelationshipKind::Related),
                ("a", RelationshipKind::Supersedes),
                ("b", RelationshipKind::DependsOn),
                ("b", RelationshipKind::Related),
            ]
        );
    }

    #[test]
    fn test_dangling_edge_target_kept() {
        let edges = build_edges(&[doc("STR-growth", &["MSN-missing"], &[], &[])]);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].target, "MSN-missing");
    }
}
