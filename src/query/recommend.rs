use std::collections::HashSet;

use serde::Serialize;

use super::QueryEngine;
use crate::model::{BusinessDomain, TypeCode};

/// Gaps in a collection worth filling
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    /// Known type codes with no document, sorted
    pub missing_types: Vec<TypeCode>,
    /// `"{source} -> {target}"` for each depends_on/enables reference to an absent id
    pub incomplete_chains: Vec<String>,
    /// One entry per taxonomy domain with no documents
    pub opportunities: Vec<String>,
}

impl QueryEngine {
    pub fn recommendations(&self) -> Recommendations {
        let docs = self.collection.documents();

        let present: HashSet<&TypeCode> = docs.iter().map(|doc| &doc.doc_type).collect();
        let missing_types = self
            .taxonomy
            .known_types()
            .into_iter()
            .filter(|code| !present.contains(code))
            .collect();

        let incomplete_chains = docs
            .iter()
            .flat_map(|doc| {
                doc.depends_on
                    .iter()
                    .chain(doc.enables.iter())
                    .filter(|target| !self.collection.contains(target))
                    .map(move |target| format!("{} -> {}", doc.id, target))
            })
            .collect();

        let opportunities = self
            .taxonomy
            .domains()
            .filter(|domain| !self.domains.contains(domain))
            .map(|domain| format!("No {} documents yet: start with {}", domain, self.first_expected(domain)))
            .collect();

        Recommendations {
            missing_types,
            incomplete_chains,
            opportunities,
        }
    }

    fn first_expected(&self, domain: BusinessDomain) -> String {
        self.taxonomy
            .expected_types(domain)
            .iter()
            .take(3)
            .map(TypeCode::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::DocumentCollection;
    use crate::model::Document;
    use crate::taxonomy::Taxonomy;

    #[test]
    fn test_recommendations() {
        let mut str_doc = Document::new("STR-growth", "STR");
        str_doc.depends_on = vec!["MSN-core".into(), "VSN-missing".into()];
        str_doc.enables = vec!["OBJ-missing".into()];
        str_doc.related = vec!["PER-missing".into()];
        let msn = Document::new("MSN-core", "MSN");
        let engine = QueryEngine::new(DocumentCollection::new(vec![str_doc, msn]), Taxonomy::default());

        let recs = engine.recommendations();
        assert_eq!(
            recs.incomplete_chains,
            vec!["STR-growth -> VSN-missing", "STR-growth -> OBJ-missing"]
        );
        assert!(recs.missing_types.contains(&TypeCode::from("VSN")));
        assert!(!recs.missing_types.contains(&TypeCode::from("STR")));
        assert_eq!(recs.missing_types.len(), Taxonomy::default().known_types().len() - 2);
        assert!(!recs.missing_types.contains(&TypeCode::from("WIS")));
        // every domain but strategic is empty
        assert_eq!(recs.opportunities.len(), 10);
        assert_eq!(recs.opportunities[0], "No market documents yet: start with MKT, SEG, CMP");
    }

    #[test]
    fn test_empty_collection_recommendations() {
        let engine = QueryEngine::new(DocumentCollection::default(), Taxonomy::default());
        let recs = engine.recommendations();
        assert!(recs.incomplete_chains.is_empty());
        assert_eq!(recs.opportunities.len(), 11);
    }
}
