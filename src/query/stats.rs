use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::QueryEngine;
use crate::model::{BusinessDomain, Document, TypeCode};

/// Collection-wide counts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub total_documents: usize,
    pub by_type: BTreeMap<TypeCode, usize>,
    pub by_domain: BTreeMap<BusinessDomain, usize>,
    pub by_status: BTreeMap<String, usize>,
    pub relationship_stats: RelationshipStats,
    pub temporal_stats: TemporalStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipStats {
    pub total_dependencies: usize,
    pub total_enablements: usize,
    pub total_conflicts: usize,
    /// (dependencies + enablements + conflicts) / documents; 0 when empty
    pub avg_relationships_per_doc: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalStats {
    /// Earliest `created` date
    pub oldest_document: Option<String>,
    /// Latest `created` date
    pub newest_document: Option<String>,
    /// Mean age in days of documents with a parsable `created` date
    pub avg_age_days: f64,
}

impl QueryEngine {
    pub fn stats(&self) -> CollectionStats {
        let today = chrono::Utc::now().date_naive();
        collection_stats(self.collection.documents(), &self.domains, today)
    }
}

/// `domains` is parallel to `documents`.
fn collection_stats(
    documents: &[Document],
    domains: &[BusinessDomain],
    today: NaiveDate,
) -> CollectionStats {
    let mut by_type = BTreeMap::new();
    let mut by_domain = BTreeMap::new();
    let mut by_status = BTreeMap::new();

    for (doc, domain) in documents.iter().zip(domains) {
        *by_type.entry(doc.doc_type.clone()).or_insert(0) += 1;
        *by_domain.entry(*domain).or_insert(0) += 1;
        *by_status.entry(doc.status.as_str().to_string()).or_insert(0) += 1;
    }

    CollectionStats {
        total_documents: documents.len(),
        by_type,
        by_domain,
        by_status,
        relationship_stats: relationship_stats(documents),
        temporal_stats: temporal_stats(documents, today),
    }
}

fn relationship_stats(documents: &[Document]) -> RelationshipStats {
    let total_dependencies: usize = documents.iter().map(|d| d.depends_on.len()).sum();
    let total_enablements: usize = documents.iter().map(|d| d.enables.len()).sum();
    let total_conflicts: usize = documents.iter().map(|d| d.conflicts_with.len()).sum();

    let avg_relationships_per_doc = if documents.is_empty() {
        0.0
    } else {
        (total_dependencies + total_enablements + total_conflicts) as f64 / documents.len() as f64
    };

    RelationshipStats {
        total_dependencies,
        total_enablements,
        total_conflicts,
        avg_relationships_per_doc,
    }
}

fn temporal_stats(documents: &[Document], today: NaiveDate) -> TemporalStats {
    let oldest_document = documents.iter().map(|d| &d.created).min().cloned();
    let newest_document = documents.iter().map(|d| &d.created).max().cloned();

    let ages: Vec<i64> = documents
        .iter()
        .filter_map(|d| NaiveDate::parse_from_str(&d.created, "%Y-%m-%d").ok())
        .map(|created| (today - created).num_days())
        .collect();
    let avg_age_days = if ages.is_empty() {
        0.0
    } else {
        ages.iter().sum::<i64>() as f64 / ages.len() as f64
    };

    TemporalStats {
        oldest_document,
        newest_document,
        avg_age_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocumentStatus;

    fn doc(id: &str, created: &str) -> Document {
        let mut d = Document::new(id, &id[..3]);
        d.created = created.to_string();
        d
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_counts_and_relationships() {
        let mut a = doc("STR-growth", "2024-01-01");
        a.depends_on = vec!["MSN-core".into(), "VSN-2030".into()];
        a.conflicts_with = vec!["STR-old".into()];
        a.status = DocumentStatus::Accepted;
        let mut b = doc("MSN-core", "2024-01-11");
        b.enables = vec!["STR-growth".into()];
        let c = doc("PER-buyer", "2024-01-21");
        let docs = vec![a, b, c];
        let domains = vec![
            BusinessDomain::Strategic,
            BusinessDomain::Strategic,
            BusinessDomain::Customer,
        ];

        let stats = collection_stats(&docs, &domains, date("2024-01-31"));
        assert_eq!(stats.total_documents, 3);
        assert_eq!(stats.by_type.get(&TypeCode::from("STR")), Some(&1));
        assert_eq!(stats.by_domain.get(&BusinessDomain::Strategic), Some(&2));
        assert_eq!(stats.by_status.get("Draft"), Some(&2));
        assert_eq!(stats.relationship_stats.total_dependencies, 2);
        assert_eq!(stats.relationship_stats.total_enablements, 1);
        assert_eq!(stats.relationship_stats.total_conflicts, 1);
        assert!((stats.relationship_stats.avg_relationships_per_doc - 4.0 / 3.0).abs() < 1e-12);

        assert_eq!(stats.temporal_stats.oldest_document.as_deref(), Some("2024-01-01"));
        assert_eq!(stats.temporal_stats.newest_document.as_deref(), Some("2024-01-21"));
        // ages 30, 20, 10
        assert_eq!(stats.temporal_stats.avg_age_days, 20.0);
    }

    #[test]
    fn test_unparsable_dates_skipped_in_age() {
        let docs = vec![doc("MSN-core", "2024-01-01"), doc("VSN-2030", "someday")];
        let domains = vec![BusinessDomain::Strategic; 2];
        let stats = collection_stats(&docs, &domains, date("2024-01-11"));
        assert_eq!(stats.temporal_stats.avg_age_days, 10.0);
    }

    #[test]
    fn test_empty_collection_stats() {
        let stats = collection_stats(&[], &[], date("2024-01-01"));
        assert_eq!(stats.total_documents, 0);
        assert!(stats.by_type.is_empty());
        assert_eq!(stats.relationship_stats.avg_relationships_per_doc, 0.0);
        assert_eq!(stats.temporal_stats.oldest_document, None);
        assert_eq!(stats.temporal_stats.newest_document, None);
        assert_eq!(stats.temporal_stats.avg_age_days, 0.0);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let stats = collection_stats(&[doc("MSN-core", "2024-01-01")], &[BusinessDomain::Strategic], date("2024-01-02"));
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["byDomain"]["strategic"], 1);
        assert_eq!(json["byType"]["MSN"], 1);
        assert_eq!(json["temporalStats"]["avgAgeDays"], 1.0);
    }
}
