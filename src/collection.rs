//! Caller-owned, immutable document collection.
//!
//! Built once from parsed documents and passed by reference into every
//! analysis. The id index is computed on construction and never patched: a
//! changed document set means a new `DocumentCollection`.

use std::collections::{BTreeSet, HashMap};

use crate::model::Document;

#[derive(Debug, Clone, Default)]
pub struct DocumentCollection {
    documents: Vec<Document>,
    index: HashMap<String, usize>,
    duplicates: Vec<String>,
}

impl DocumentCollection {
    /// Take ownership of `documents`, keeping input order.
    ///
    /// Duplicate ids are recorded, not dropped; lookups by id resolve to the
    /// first occurrence.
    pub fn new(documents: Vec<Document>) -> Self {
        let mut index = HashMap::with_capacity(documents.len());
        let mut duplicates = BTreeSet::new();

        for (position, doc) in documents.iter().enumerate() {
            if index.contains_key(&doc.id) {
                duplicates.insert(doc.id.clone());
            } else {
                index.insert(doc.id.clone(), position);
            }
        }

        if !duplicates.is_empty() {
            log::warn!(
                "Collection contains {} duplicated document id(s): {}",
                duplicates.len(),
                duplicates.iter().cloned().collect::<Vec<_>>().join(", ")
            );
        }

        Self {
            documents,
            index,
            duplicates: duplicates.into_iter().collect(),
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.index.get(id).map(|&position| &self.documents[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Ids that occur more than once, sorted
    pub fn duplicate_ids(&self) -> &[String] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl From<Vec<Document>> for DocumentCollection {
    fn from(documents: Vec<Document>) -> Self {
        Self::new(documents)
    }
}
