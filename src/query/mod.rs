//! Query engine over a document collection.
//!
//! A [`QueryEngine`] owns one [`DocumentCollection`] and the lookup data
//! derived from it (lower-cased search text, resolved domains). That data is
//! computed once in [`QueryEngine::new`] and never patched; a changed
//! collection means a new engine.

mod filters;
mod recommend;
mod similarity;
mod stats;

pub use recommend::Recommendations;
pub use similarity::SimilarDocument;
pub use stats::{CollectionStats, RelationshipStats, TemporalStats};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;

use crate::collection::DocumentCollection;
use crate::model::{BusinessDomain, Document, DocumentStatus, Priority, TypeCode};
use crate::taxonomy::Taxonomy;

/// Result count above which a narrowing suggestion is emitted, unless configured
pub const DEFAULT_SUGGESTION_THRESHOLD: usize = 100;

/// Document field searched by `textSearch`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Title,
    Content,
    Id,
    Tags,
}

impl SearchField {
    pub const ALL: [SearchField; 4] = [
        SearchField::Title,
        SearchField::Content,
        SearchField::Id,
        SearchField::Tags,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Created,
    Updated,
    Title,
    Type,
    Status,
    /// depends_on + enables count
    Relationships,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Filters, sort and pagination for [`QueryEngine::query`].
///
/// Every field is optional; an empty list or absent value disables that
/// filter. Deserialises from the camelCase JSON accepted by the `bspec_query`
/// tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryOptions {
    pub types: Vec<TypeCode>,
    pub domains: Vec<BusinessDomain>,
    pub statuses: Vec<DocumentStatus>,
    pub priorities: Vec<Priority>,

    pub text_search: Option<String>,
    /// Fields searched by `text_search`; all four when absent
    pub search_fields: Option<Vec<SearchField>>,

    pub depends_on: Vec<String>,
    pub enables: Vec<String>,
    pub related_to: Vec<String>,
    pub conflicts_with: Vec<String>,

    /// Inclusive `YYYY-MM-DD` bounds
    pub created_after: Option<String>,
    pub created_before: Option<String>,
    pub updated_after: Option<String>,
    pub updated_before: Option<String>,

    pub owner: Option<String>,
    pub stakeholders: Vec<String>,
    pub reviewers: Vec<String>,

    pub has_success_criteria: Option<bool>,
    pub has_risks: Option<bool>,
    pub has_metrics: Option<bool>,

    pub sort_by: Option<SortField>,
    pub sort_order: SortOrder,
    pub offset: usize,
    /// All remaining results when absent
    pub limit: Option<usize>,
    pub include_content: bool,
}

/// One filter that narrowed the result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedFilter {
    pub name: String,
    pub value: String,
}

impl AppliedFilter {
    fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// The requested page
    pub documents: Vec<Document>,
    /// Matches before pagination
    pub total_count: usize,
    pub execution_time_ms: u64,
    pub applied_filters: Vec<AppliedFilter>,
    pub suggestions: Vec<String>,
}

/// Lower-cased searchable text of one document
#[derive(Debug, Clone)]
struct SearchText {
    title: String,
    content: String,
    id: String,
    tags: Vec<String>,
}

impl SearchText {
    fn new(doc: &Document) -> Self {
        Self {
            title: doc.title.to_lowercase(),
            content: doc.content.to_lowercase(),
            id: doc.id.to_lowercase(),
            tags: doc.tags.iter().map(|tag| tag.to_lowercase()).collect(),
        }
    }

    fn matches(&self, field: SearchField, term: &str) -> bool {
        match field {
            SearchField::Title => self.title.contains(term),
            SearchField::Content => self.content.contains(term),
            SearchField::Id => self.id.contains(term),
            SearchField::Tags => self.tags.iter().any(|tag| tag.contains(term)),
        }
    }
}

pub struct QueryEngine {
    collection: DocumentCollection,
    taxonomy: Taxonomy,
    /// Parallel to `collection.documents()`
    search_text: Vec<SearchText>,
    /// Parallel to `collection.documents()`
    domains: Vec<BusinessDomain>,
    suggestion_threshold: usize,
}

impl QueryEngine {
    pub fn new(collection: DocumentCollection, taxonomy: Taxonomy) -> Self {
        let search_text = collection.documents().iter().map(SearchText::new).collect();
        let domains = collection
            .documents()
            .iter()
            .map(|doc| taxonomy.resolve_domain(doc))
            .collect();

        log::debug!("Query engine indexed {} documents", collection.len());

        Self {
            collection,
            taxonomy,
            search_text,
            domains,
            suggestion_threshold: DEFAULT_SUGGESTION_THRESHOLD,
        }
    }

    /// Override the result count above which a narrowing hint is emitted
    pub fn with_suggestion_threshold(mut self, threshold: usize) -> Self {
        self.suggestion_threshold = threshold;
        self
    }

    pub fn collection(&self) -> &DocumentCollection {
        &self.collection
    }

    pub fn documents(&self) -> &[Document] {
        self.collection.documents()
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Run a filter/sort/paginate query.
    ///
    /// # Arguments
    ///
    /// * `options` - Filters, sort key and page bounds
    ///
    /// # Returns
    ///
    /// The requested page plus the unpaginated match count, the filters that
    /// were applied (in application order) and hint strings.
    ///
    /// # Implementation Details
    ///
    /// - Filter stages run in a fixed order: type/domain, status/priority,
    ///   relationships, dates, ownership, business context, text search
    /// - The sort is stable, so ties keep collection order
    /// - `limit: None` returns everything after `offset`
    pub fn query(&self, options: &QueryOptions) -> QueryResult {
        let start = Instant::now();
        let mut applied = Vec::new();

        let mut positions: Vec<usize> = (0..self.collection.len()).collect();
        positions = self.filter_type_and_domain(positions, options, &mut applied);
        positions = self.filter_status_and_priority(positions, options, &mut applied);
        positions = self.filter_relationships(positions, options, &mut applied);
        positions = self.filter_dates(positions, options, &mut applied);
        positions = self.filter_ownership(positions, options, &mut applied);
        positions = self.filter_business_context(positions, options, &mut applied);
        positions = self.filter_text(positions, options, &mut applied);

        self.sort(&mut positions, options);

        let total_count = positions.len();
        let documents: Vec<Document> = positions
            .into_iter()
            .skip(options.offset)
            .take(options.limit.unwrap_or(usize::MAX))
            .map(|position| {
                let doc = &self.collection.documents()[position];
                if options.include_content {
                    doc.clone()
                } else {
                    doc.without_content()
                }
            })
            .collect();

        let suggestions = self.suggestions(total_count);
        let execution_time_ms = start.elapsed().as_millis() as u64;

        log::debug!(
            "Query matched {} documents ({} returned, {} filters) in {}ms",
            total_count,
            documents.len(),
            applied.len(),
            execution_time_ms
        );

        QueryResult {
            documents,
            total_count,
            execution_time_ms,
            applied_filters: applied,
            suggestions,
        }
    }

    fn sort(&self, positions: &mut [usize], options: &QueryOptions) {
        let Some(field) = options.sort_by else {
            return;
        };
        let docs = self.collection.documents();

        positions.sort_by(|&a, &b| {
            let (a, b) = (&docs[a], &docs[b]);
            let ordering = match field {
                SortField::Created => a.created.cmp(&b.created),
                SortField::Updated => a.updated.cmp(&b.updated),
                SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
                SortField::Type => a.doc_type.cmp(&b.doc_type),
                SortField::Status => a
                    .status
                    .as_str()
                    .to_lowercase()
                    .cmp(&b.status.as_str().to_lowercase()),
                SortField::Relationships => a.relationship_count().cmp(&b.relationship_count()),
            };
            match options.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }

    fn suggestions(&self, total_count: usize) -> Vec<String> {
        let mut suggestions = Vec::new();
        if total_count == 0 {
            suggestions.push("Try removing some filters to get more results".to_string());
            suggestions.push("Check document type spellings (MSN, VSN, STR, etc.)".to_string());
        }
        if total_count > self.suggestion_threshold {
            suggestions.push("Consider adding more specific filters to narrow results".to_string());
        }
        suggestions
    }
}

/// Descending by score, ties keep their existing order
fn by_score_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
