use std::collections::{HashMap, HashSet};

use super::{Criticality, DomainCluster};
use crate::model::{BusinessDomain, Document};
use crate::taxonomy::Taxonomy;

/// One cluster per resolved domain present in `documents`, in order of first
/// appearance.
pub fn analyze_clusters(documents: &[Document], taxonomy: &Taxonomy) -> Vec<DomainCluster> {
    let mut order: Vec<BusinessDomain> = Vec::new();
    let mut groups: HashMap<BusinessDomain, Vec<&Document>> = HashMap::new();

    for doc in documents {
        let domain = taxonomy.resolve_domain(doc);
        groups
            .entry(domain)
            .or_insert_with(|| {
                order.push(domain);
                Vec::new()
            })
            .push(doc);
    }

    order
        .into_iter()
        .filter_map(|domain| {
            let members = groups.remove(&domain)?;
            Some(build_cluster(domain, &members, taxonomy))
        })
        .collect()
}

fn build_cluster(domain: BusinessDomain, members: &[&Document], taxonomy: &Taxonomy) -> DomainCluster {
    let expected = taxonomy.expected_types(domain);
    let completeness = if expected.is_empty() {
        0.0
    } else {
        let present: HashSet<_> = members
            .iter()
            .map(|doc| &doc.doc_type)
            .filter(|code| expected.contains(code))
            .collect();
        present.len() as f64 / expected.len() as f64
    };

    let member_ids: HashSet<&str> = members.iter().map(|doc| doc.id.as_str()).collect();
    let connections = members
        .iter()
        .flat_map(|doc| doc.outgoing_refs())
        .filter(|target| !member_ids.contains(target.as_str()))
        .count();

    let criticality = if domain == taxonomy.strategic_domain()
        || (completeness > 0.8 && connections > 10)
    {
        Criticality::High
    } else if completeness > 0.5 && connections > 5 {
        Criticality::Medium
    } else {
        Criticality::Low
    };

    DomainCluster {
        domain,
        documents: members.iter().map(|doc| doc.id.clone()).collect(),
        completeness,
        connections,
        criticality,
    }
}
