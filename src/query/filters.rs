//! Filter stages of [`QueryEngine::query`]. Each stage takes the surviving
//! collection positions and returns the subset that passes, recording itself
//! in `applied` when its option is set.

use super::{AppliedFilter, QueryEngine, QueryOptions, SearchField};
use crate::model::Document;

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Any-match: true when `list` shares at least one id with `wanted`
fn intersects(list: &[String], wanted: &[String]) -> bool {
    list.iter().any(|id| wanted.contains(id))
}

impl QueryEngine {
    fn doc(&self, position: usize) -> &Document {
        &self.collection.documents()[position]
    }

    fn retain(&self, positions: Vec<usize>, keep: impl Fn(usize, &Document) -> bool) -> Vec<usize> {
        positions
            .into_iter()
            .filter(|&position| keep(position, self.doc(position)))
            .collect()
    }

    pub(super) fn filter_type_and_domain(
        &self,
        mut positions: Vec<usize>,
        options: &QueryOptions,
        applied: &mut Vec<AppliedFilter>,
    ) -> Vec<usize> {
        if !options.types.is_empty() {
            applied.push(AppliedFilter::new("types", join(&options.types)));
            positions = self.retain(positions, |_, doc| options.types.contains(&doc.doc_type));
        }

        if !options.domains.is_empty() {
            applied.push(AppliedFilter::new("domains", join(&options.domains)));
            positions = self.retain(positions, |position, _| {
                options.domains.contains(&self.domains[position])
            });
        }

        positions
    }

    pub(super) fn filter_status_and_priority(
        &self,
        mut positions: Vec<usize>,
        options: &QueryOptions,
        applied: &mut Vec<AppliedFilter>,
    ) -> Vec<usize> {
        if !options.statuses.is_empty() {
            applied.push(AppliedFilter::new("statuses", join(&options.statuses)));
            positions = self.retain(positions, |_, doc| options.statuses.contains(&doc.status));
        }

        if !options.priorities.is_empty() {
            applied.push(AppliedFilter::new("priorities", join(&options.priorities)));
            positions = self.retain(positions, |_, doc| {
                doc.priority
                    .is_some_and(|priority| options.priorities.contains(&priority))
            });
        }

        positions
    }

    pub(super) fn filter_relationships(
        &self,
        mut positions: Vec<usize>,
        options: &QueryOptions,
        applied: &mut Vec<AppliedFilter>,
    ) -> Vec<usize> {
        let stages: [(&str, &Vec<String>, fn(&Document) -> &Vec<String>); 4] = [
            ("depends on", &options.depends_on, |doc| &doc.depends_on),
            ("enables", &options.enables, |doc| &doc.enables),
            ("related to", &options.related_to, |doc| &doc.related),
            ("conflicts with", &options.conflicts_with, |doc| &doc.conflicts_with),
        ];

        for (name, wanted, list) in stages {
            if wanted.is_empty() {
                continue;
            }
            applied.push(AppliedFilter::new(name, join(wanted)));
            positions = self.retain(positions, |_, doc| intersects(list(doc), wanted));
        }

        positions
    }

    /// Lexical comparison on ISO dates, inclusive bounds
    pub(super) fn filter_dates(
        &self,
        mut positions: Vec<usize>,
        options: &QueryOptions,
        applied: &mut Vec<AppliedFilter>,
    ) -> Vec<usize> {
        if let Some(after) = &options.created_after {
            applied.push(AppliedFilter::new("created after", after.as_str()));
            positions = self.retain(positions, |_, doc| doc.created.as_str() >= after.as_str());
        }
        if let Some(before) = &options.created_before {
            applied.push(AppliedFilter::new("created before", before.as_str()));
            positions = self.retain(positions, |_, doc| doc.created.as_str() <= before.as_str());
        }
        if let Some(after) = &options.updated_after {
            applied.push(AppliedFilter::new("updated after", after.as_str()));
            positions = self.retain(positions, |_, doc| doc.updated.as_str() >= after.as_str());
        }
        if let Some(before) = &options.updated_before {
            applied.push(AppliedFilter::new("updated before", before.as_str()));
            positions = self.retain(positions, |_, doc| doc.updated.as_str() <= before.as_str());
        }

        positions
    }

    pub(super) fn filter_ownership(
        &self,
        mut positions: Vec<usize>,
        options: &QueryOptions,
        applied: &mut Vec<AppliedFilter>,
    ) -> Vec<usize> {
        if let Some(owner) = &options.owner {
            applied.push(AppliedFilter::new("owner", owner.as_str()));
            positions = self.retain(positions, |_, doc| &doc.owner == owner);
        }
        if !options.stakeholders.is_empty() {
            applied.push(AppliedFilter::new("stakeholders", join(&options.stakeholders)));
            positions = self.retain(positions, |_, doc| {
                intersects(&doc.stakeholders, &options.stakeholders)
            });
        }
        if !options.reviewers.is_empty() {
            applied.push(AppliedFilter::new("reviewers", join(&options.reviewers)));
            positions = self.retain(positions, |_, doc| intersects(&doc.reviewers, &options.reviewers));
        }

        positions
    }

    pub(super) fn filter_business_context(
        &self,
        mut positions: Vec<usize>,
        options: &QueryOptions,
        applied: &mut Vec<AppliedFilter>,
    ) -> Vec<usize> {
        if let Some(wanted) = options.has_success_criteria {
            applied.push(AppliedFilter::new("has success criteria", wanted.to_string()));
            positions = self.retain(positions, |_, doc| doc.has_success_criteria() == wanted);
        }
        if let Some(wanted) = options.has_risks {
            applied.push(AppliedFilter::new("has risks", wanted.to_string()));
            positions = self.retain(positions, |_, doc| !doc.risks.is_empty() == wanted);
        }
        if let Some(wanted) = options.has_metrics {
            applied.push(AppliedFilter::new("has metrics", wanted.to_string()));
            positions = self.retain(positions, |_, doc| !doc.metrics.is_empty() == wanted);
        }

        positions
    }

    /// Case-insensitive substring match, OR across the searched fields
    pub(super) fn filter_text(
        &self,
        positions: Vec<usize>,
        options: &QueryOptions,
        applied: &mut Vec<AppliedFilter>,
    ) -> Vec<usize> {
        let Some(term) = options.text_search.as_deref().filter(|t| !t.is_empty()) else {
            return positions;
        };

        applied.push(AppliedFilter::new("text search", term));
        let term = term.to_lowercase();
        let fields = options.search_fields.as_deref().unwrap_or(&SearchField::ALL);

        self.retain(positions, |position, _| {
            let text = &self.search_text[position];
            fields.iter().any(|&field| text.matches(field, &term))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::DocumentCollection;
    use crate::model::{DocumentStatus, Priority};
    use crate::taxonomy::Taxonomy;

    fn engine(docs: Vec<Document>) -> QueryEngine {
        QueryEngine::new(DocumentCollection::new(docs), Taxonomy::default())
    }

    fn run(engine: &QueryEngine, options: QueryOptions) -> Vec<String> {
        engine
            .query(&options)
            .documents
            .into_iter()
            .map(|d| d.id)
            .collect()
    }

    #[test]
    fn test_priority_filter_skips_documents_without_priority() {
        let mut high = Document::new("OBJ-a", "OBJ");
        high.priority = Some(Priority::High);
        let none = Document::new("OBJ-b", "OBJ");
        let engine = engine(vec![high, none]);
        let ids = run(
            &engine,
            QueryOptions {
                priorities: vec![Priority::High, Priority::Low],
                ..QueryOptions::default()
            },
        );
        assert_eq!(ids, vec!["OBJ-a"]);
    }

    #[test]
    fn test_relationship_filters_any_match() {
        let mut a = Document::new("PER-a", "PER");
        a.enables = vec!["CJM-x".into(), "CJM-y".into()];
        a.related = vec!["SEG-z".into()];
        let mut b = Document::new("PER-b", "PER");
        b.enables = vec!["CJM-y".into()];
        let mut c = Document::new("STR-c", "STR");
        c.conflicts_with = vec!["STR-old".into()];
        let engine = engine(vec![a, b, c]);

        let enables = QueryOptions {
            enables: vec!["CJM-y".into()],
            ..QueryOptions::default()
        };
        assert_eq!(run(&engine, enables), vec!["PER-a", "PER-b"]);

        let related = QueryOptions {
            related_to: vec!["SEG-z".into(), "SEG-q".into()],
            ..QueryOptions::default()
        };
        assert_eq!(run(&engine, related), vec!["PER-a"]);

        let conflicts = QueryOptions {
            conflicts_with: vec!["STR-old".into()],
            ..QueryOptions::default()
        };
        assert_eq!(run(&engine, conflicts), vec!["STR-c"]);
    }

    #[test]
    fn test_date_bounds_inclusive() {
        let docs: Vec<Document> = ["2024-01-01", "2024-02-01", "2024-03-01"]
            .iter()
            .enumerate()
            .map(|(i, date)| {
                let mut d = Document::new(format!("OBJ-{}", i), "OBJ");
                d.created = date.to_string();
                d.updated = date.to_string();
                d
            })
            .collect();
        let engine = engine(docs);
        let ids = run(
            &engine,
            QueryOptions {
                created_after: Some("2024-01-01".into()),
                updated_before: Some("2024-02-01".into()),
                ..QueryOptions::default()
            },
        );
        assert_eq!(ids, vec!["OBJ-0", "OBJ-1"]);
    }

    #[test]
    fn test_ownership_and_context_filters() {
        let mut a = Document::new("OBJ-a", "OBJ");
        a.owner = "ceo".into();
        a.stakeholders = vec!["board".into()];
        a.success_criteria = Some(vec!["ARR 1M".into()]);
        a.metrics = vec!["arr".into()];
        let mut b = Document::new("OBJ-b", "OBJ");
        b.owner = "ceo".into();
        b.success_criteria = Some(vec![]);
        b.status = DocumentStatus::Review;
        let engine = engine(vec![a, b]);

        let with_criteria = QueryOptions {
            owner: Some("ceo".into()),
            has_success_criteria: Some(true),
            ..QueryOptions::default()
        };
        assert_eq!(run(&engine, with_criteria), vec!["OBJ-a"]);

        let without_metrics = QueryOptions {
            has_metrics: Some(false),
            ..QueryOptions::default()
        };
        assert_eq!(run(&engine, without_metrics), vec!["OBJ-b"]);

        let stakeholders = QueryOptions {
            stakeholders: vec!["board".into()],
            ..QueryOptions::default()
        };
        assert_eq!(run(&engine, stakeholders), vec!["OBJ-a"]);
    }

    #[test]
    fn test_empty_text_search_is_not_a_filter() {
        let engine = engine(vec![Document::new("MSN-core", "MSN")]);
        let result = engine.query(&QueryOptions {
            text_search: Some(String::new()),
            ..QueryOptions::default()
        });
        assert_eq!(result.total_count, 1);
        assert!(result.applied_filters.is_empty());
    }

    #[test]
    fn test_applied_filter_values() {
        let engine = engine(vec![Document::new("MSN-core", "MSN")]);
        let result = engine.query(&QueryOptions {
            types: vec!["MSN".into(), "VSN".into()],
            statuses: vec![DocumentStatus::Draft],
            ..QueryOptions::default()
        });
        assert_eq!(result.applied_filters[0], AppliedFilter::new("types", "MSN, VSN"));
        assert_eq!(result.applied_filters[1], AppliedFilter::new("statuses", "Draft"));
    }
}
