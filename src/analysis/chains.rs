use std::collections::HashSet;

use serde::Serialize;

use crate::graph::{trace_dependency_chain, DependencyIndex};
use crate::model::{Document, DocumentStatus};

const LONG_CHAIN_THRESHOLD: usize = 10;

/// A traced `depends_on` path
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyChain {
    pub chain: Vec<String>,
    pub length: usize,
    /// First and last element are the same id
    pub is_circular: bool,
    pub risk_factors: Vec<String>,
}

/// Longest chains of the collection, longest first.
///
/// Every id on a reported chain is marked visited, so a document already
/// covered by an earlier chain does not start a new one. Ties keep scan order.
pub fn find_chains(documents: &[Document]) -> Vec<DependencyChain> {
    let index = DependencyIndex::new(documents);
    let mut visited: HashSet<String> = HashSet::new();
    let mut chains = Vec::new();

    for doc in documents {
        if visited.contains(&doc.id) {
            continue;
        }

        let chain = trace_dependency_chain(&doc.id, &index);
        if chain.len() > 1 {
            let is_circular = chain.first() == chain.last();
            chains.push(DependencyChain {
                risk_factors: assess_risks(&chain, is_circular, documents),
                length: chain.len(),
                is_circular,
                chain: chain.clone(),
            });
        }
        visited.extend(chain);
    }

    chains.sort_by(|a, b| b.length.cmp(&a.length));
    log::debug!("Found {} dependency chains", chains.len());
    chains
}

fn assess_risks(chain: &[String], is_circular: bool, documents: &[Document]) -> Vec<String> {
    let mut risks = Vec::new();

    if chain.len() > LONG_CHAIN_THRESHOLD {
        risks.push("very long chain".to_string());
    }
    if is_circular {
        risks.push("circular dependency".to_string());
    }

    let on_chain: HashSet<&str> = chain.iter().map(String::as_str).collect();
    let drafts = documents
        .iter()
        .filter(|doc| on_chain.contains(doc.id.as_str()) && doc.status == DocumentStatus::Draft)
        .count();
    if drafts * 2 > chain.len() {
        risks.push("many draft documents in chain".to_string());
    }

    risks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, depends_on: &[&str], status: DocumentStatus) -> Document {
        let mut d = Document::new(id, &id[..3]);
        d.depends_on = depends_on.iter().map(|s| s.to_string()).collect();
        d.status = status;
        d
    }

    #[test]
    fn test_three_document_chain() {
        let docs = vec![
            doc("AAA-a", &["BBB-b"], DocumentStatus::Accepted),
            doc("BBB-b", &["CCC-c"], DocumentStatus::Accepted),
            doc("CCC-c", &[], DocumentStatus::Accepted),
        ];
        let chains = find_chains(&docs);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].chain, vec!["AAA-a", "BBB-b", "CCC-c"]);
        assert_eq!(chains[0].length, 3);
        assert!(!chains[0].is_circular);
        assert!(chains[0].risk_factors.is_empty());
    }

    #[test]
    fn test_acyclic_collection_never_circular() {
        let docs = vec![
            doc("AAA-a", &["BBB-b", "CCC-c"], DocumentStatus::Accepted),
            doc("BBB-b", &["DDD-d"], DocumentStatus::Review),
            doc("CCC-c", &["DDD-d"], DocumentStatus::Accepted),
            doc("DDD-d", &[], DocumentStatus::Accepted),
            doc("EEE-e", &["CCC-c"], DocumentStatus::Accepted),
        ];
        let chains = find_chains(&docs);
        assert!(!chains.is_empty());
        assert!(chains.iter().all(|c| !c.is_circular));
    }

    #[test]
    fn test_cycle_reported_circular() {
        let docs = vec![
            doc("AAA-a", &["BBB-b"], DocumentStatus::Draft),
            doc("BBB-b", &["AAA-a"], DocumentStatus::Draft),
        ];
        let chains = find_chains(&docs);
        assert_eq!(chains.len(), 1);
        let chain = &chains[0];
        assert!(chain.is_circular);
        assert_eq!(chain.chain.first(), chain.chain.last());
        assert!(chain.risk_factors.contains(&"circular dependency".to_string()));
        assert!(chain.risk_factors.contains(&"many draft documents in chain".to_string()));
    }

    #[test]
    fn test_sorted_longest_first_and_visited_skipped() {
        let docs = vec![
            doc("AAA-a", &["BBB-b"], DocumentStatus::Accepted),
            doc("BBB-b", &[], DocumentStatus::Accepted),
            doc("CCC-c", &["DDD-d"], DocumentStatus::Accepted),
            doc("DDD-d", &["EEE-e"], DocumentStatus::Accepted),
            doc("EEE-e", &[], DocumentStatus::Accepted),
        ];
        let chains = find_chains(&docs);
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0].chain, vec!["CCC-c", "DDD-d", "EEE-e"]);
        assert_eq!(chains[1].chain, vec!["AAA-a", "BBB-b"]);
    }

    #[test]
    fn test_very_long_chain_flagged() {
        let ids: Vec<String> = (0..12).map(|i| format!("DOC-{:02}", i)).collect();
        let docs: Vec<Document> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let next: Vec<&str> = ids.get(i + 1).map(|n| vec![n.as_str()]).unwrap_or_default();
                doc(id, &next, DocumentStatus::Accepted)
            })
            .collect();
        let chains = find_chains(&docs);
        assert_eq!(chains[0].length, 12);
        assert_eq!(chains[0].risk_factors, vec!["very long chain"]);
    }

    #[test]
    fn test_empty_collection_no_chains() {
        assert!(find_chains(&[]).is_empty());
    }
}
