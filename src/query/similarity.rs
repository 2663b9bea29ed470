//! Heuristic document similarity.
//!
//! A weighted sum of shared attributes, not an embedding or a learned metric:
//!
//! | signal | weight |
//! |---|---|
//! | same resolved domain | +0.3 |
//! | same type family | +0.2 |
//! | each shared depends_on / enables target | +0.1 |
//! | shared lower-cased content words | +min(count / 100, 0.3) |
//!
//! The total is clamped to 1.0. The weights are kept as-is for compatibility
//! with existing scores; a more principled measure would be a new function.

use std::collections::HashSet;

use serde::Serialize;

use super::{by_score_desc, QueryEngine};
use crate::model::Document;

const DOMAIN_WEIGHT: f64 = 0.3;
const FAMILY_WEIGHT: f64 = 0.2;
const SHARED_TARGET_WEIGHT: f64 = 0.1;
const WORDS_PER_POINT: f64 = 100.0;
const MAX_CONTENT_WEIGHT: f64 = 0.3;

/// A document ranked against a reference document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarDocument {
    pub similarity: f64,
    #[serde(flatten)]
    pub document: Document,
}

fn shared_count(a: &[String], b: &[String]) -> usize {
    let a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let b: HashSet<&str> = b.iter().map(String::as_str).collect();
    a.intersection(&b).count()
}

fn content_words(content: &str) -> HashSet<String> {
    content.split_whitespace().map(str::to_lowercase).collect()
}

impl QueryEngine {
    /// Similarity of the documents at two collection positions, in [0, 1].
    fn similarity(&self, a: usize, b: usize) -> f64 {
        let docs = self.collection.documents();
        let (doc_a, doc_b) = (&docs[a], &docs[b]);
        let mut score = 0.0;

        if self.domains[a] == self.domains[b] {
            score += DOMAIN_WEIGHT;
        }

        // Types outside every family never match each other
        let family_a = self.taxonomy.family_of(&doc_a.doc_type);
        if family_a.is_some() && family_a == self.taxonomy.family_of(&doc_b.doc_type) {
            score += FAMILY_WEIGHT;
        }

        let shared_targets = shared_count(&doc_a.depends_on, &doc_b.depends_on)
            + shared_count(&doc_a.enables, &doc_b.enables);
        score += shared_targets as f64 * SHARED_TARGET_WEIGHT;

        let common_words = content_words(&doc_a.content)
            .intersection(&content_words(&doc_b.content))
            .count();
        score += (common_words as f64 / WORDS_PER_POINT).min(MAX_CONTENT_WEIGHT);

        score.min(1.0)
    }

    /// Up to `limit` documents most similar to `document_id`, best first.
    ///
    /// Equal scores keep collection order. An unknown id yields an empty list.
    pub fn similar(&self, document_id: &str, limit: usize) -> Vec<SimilarDocument> {
        let docs = self.collection.documents();
        let Some(source) = docs.iter().position(|doc| doc.id == document_id) else {
            log::debug!("Similarity requested for unknown document {}", document_id);
            return Vec::new();
        };

        let mut scored: Vec<(usize, f64)> = (0..docs.len())
            .filter(|&position| docs[position].id != document_id)
            .map(|position| (position, self.similarity(source, position)))
            .collect();
        scored.sort_by(|a, b| by_score_desc(a.1, b.1));

        scored
            .into_iter()
            .take(limit)
            .map(|(position, similarity)| SimilarDocument {
                similarity,
                document: docs[position].clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::DocumentCollection;
    use crate::model::BusinessDomain;
    use crate::taxonomy::Taxonomy;

    fn engine(docs: Vec<Document>) -> QueryEngine {
        QueryEngine::new(DocumentCollection::new(docs), Taxonomy::default())
    }

    #[test]
    fn test_shared_domain_and_dependency_scores_point_four() {
        let mut a = Document::new("MSN-core", "MSN");
        a.domain = Some(BusinessDomain::Market);
        a.depends_on = vec!["VSN-2030".into()];
        let mut b = Document::new("MKT-eu", "MKT");
        b.domain = Some(BusinessDomain::Market);
        b.depends_on = vec!["VSN-2030".into(), "SEG-smb".into()];

        let engine = engine(vec![a, b]);
        assert!((engine.similarity(0, 1) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_family_and_content_contributions() {
        let mut a = Document::new("MSN-core", "MSN");
        a.content = "Build the BEST tools".to_string();
        let mut b = Document::new("VSN-2030", "VSN");
        b.content = "best tools everywhere".to_string();

        let engine = engine(vec![a, b]);
        // domain 0.3 + family 0.2 + 2 common words 0.02
        assert!((engine.similarity(0, 1) - 0.52).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_families_do_not_match() {
        let a = Document::new("XYZ-a", "XYZ");
        let b = Document::new("QQQ-b", "QQQ");
        let engine = engine(vec![a, b]);
        // both fall back to the strategic domain, no family bonus
        assert!((engine.similarity(0, 1) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_score_clamped_to_one() {
        let targets: Vec<String> = (0..10).map(|i| format!("OBJ-{}", i)).collect();
        let mut a = Document::new("STR-a", "STR");
        a.depends_on = targets.clone();
        let mut b = Document::new("STR-b", "STR");
        b.depends_on = targets;
        let engine = engine(vec![a, b]);
        assert_eq!(engine.similarity(0, 1), 1.0);
    }

    #[test]
    fn test_similar_ranks_and_limits() {
        let mut source = Document::new("STR-growth", "STR");
        source.depends_on = vec!["MSN-core".into()];
        let mut close = Document::new("OBJ-q1", "OBJ");
        close.depends_on = vec!["MSN-core".into()];
        let far = Document::new("PER-buyer", "PER");
        let same_family = Document::new("VSN-2030", "VSN");

        let engine = engine(vec![source, far, same_family, close]);
        let similar = engine.similar("STR-growth", 2);
        let ids: Vec<&str> = similar.iter().map(|s| s.document.id.as_str()).collect();
        assert_eq!(ids, vec!["OBJ-q1", "VSN-2030"]);
        assert!(similar[0].similarity > similar[1].similarity);
    }

    #[test]
    fn test_similar_unknown_id_is_empty() {
        let engine = engine(vec![Document::new("MSN-core", "MSN")]);
        assert!(engine.similar("STR-none", 5).is_empty());
    }
}
