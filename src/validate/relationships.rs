//! Checks of a document's references against its collection.

use std::collections::HashSet;

use super::{Findings, IssueCode, ValidationIssue};
use crate::collection::DocumentCollection;
use crate::graph::MAX_CHAIN_DEPTH;
use crate::model::{Document, DocumentStatus};

pub(super) fn check(doc: &Document, collection: &DocumentCollection, findings: &mut Findings) {
    for dep_id in &doc.depends_on {
        if !collection.contains(dep_id) {
            findings.push(
                ValidationIssue::error(
                    IssueCode::MissingDependency,
                    format!("Dependency \"{}\" not found in document collection", dep_id),
                )
                .on("depends_on"),
            );
        }
    }

    for enabled_id in &doc.enables {
        if !collection.contains(enabled_id) {
            findings.push(
                ValidationIssue::warning(
                    IssueCode::MissingEnabledDocument,
                    format!("Enabled document \"{}\" not found in collection", enabled_id),
                )
                .on("enables"),
            );
        }
    }

    if !doc.depends_on.is_empty() {
        if let Some(cycle) = find_cycle(&doc.id, collection) {
            findings.push(
                ValidationIssue::error(
                    IssueCode::CircularDependency,
                    format!("Circular dependency detected: {}", cycle.join(" -> ")),
                )
                .on("depends_on"),
            );
        }
    }

    for conflict_id in &doc.conflicts_with {
        let accepted = collection
            .get(conflict_id)
            .is_some_and(|other| other.status == DocumentStatus::Accepted);
        if accepted {
            findings.push(
                ValidationIssue::warning(
                    IssueCode::ActiveConflict,
                    format!("Document conflicts with accepted document \"{}\"", conflict_id),
                )
                .on("conflicts_with")
                .recommend("Consider updating conflict resolution or document status"),
            );
        }
    }
}

/// First `depends_on` cycle reachable from `start`, as the path from the
/// repeated id back to itself (`[B, C, B]`).
///
/// Depth-first with a global visited set, so every id is expanded once.
fn find_cycle(start: &str, collection: &DocumentCollection) -> Option<Vec<String>> {
    let mut visited = HashSet::new();
    let mut path = Vec::new();
    dfs(start, collection, &mut visited, &mut path)
}

fn dfs<'a>(
    id: &'a str,
    collection: &'a DocumentCollection,
    visited: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    if let Some(at) = path.iter().position(|&on_path| on_path == id) {
        let mut cycle: Vec<String> = path[at..].iter().map(|s| s.to_string()).collect();
        cycle.push(id.to_string());
        return Some(cycle);
    }
    if !visited.insert(id) || path.len() >= MAX_CHAIN_DEPTH {
        return None;
    }

    path.push(id);
    if let Some(doc) = collection.get(id) {
        for dep_id in &doc.depends_on {
            if let Some(cycle) = dfs(dep_id, collection, visited, path) {
                return Some(cycle);
            }
        }
    }
    path.pop();
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, depends_on: &[&str]) -> Document {
        let mut d = Document::new(id, &id[..3]);
        d.depends_on = depends_on.iter().map(|s| s.to_string()).collect();
        d
    }

    fn codes(findings: &Findings) -> Vec<IssueCode> {
        findings
            .errors
            .iter()
            .chain(findings.warnings.iter())
            .map(|issue| issue.code)
            .collect()
    }

    #[test]
    fn test_find_cycle_reports_path() {
        let collection = DocumentCollection::new(vec![
            doc("AAA-a", &["BBB-b"]),
            doc("BBB-b", &["CCC-c"]),
            doc("CCC-c", &["BBB-b"]),
        ]);
        assert_eq!(
            find_cycle("AAA-a", &collection),
            Some(vec!["BBB-b".to_string(), "CCC-c".to_string(), "BBB-b".to_string()])
        );
        assert_eq!(find_cycle("ZZZ-none", &collection), None);
    }

    #[test]
    fn test_find_cycle_none_for_diamond() {
        let collection = DocumentCollection::new(vec![
            doc("AAA-a", &["BBB-b", "CCC-c"]),
            doc("BBB-b", &["DDD-d"]),
            doc("CCC-c", &["DDD-d"]),
            doc("DDD-d", &[]),
        ]);
        assert_eq!(find_cycle("AAA-a", &collection), None);
    }

    #[test]
    fn test_self_dependency_is_cycle() {
        let collection = DocumentCollection::new(vec![doc("AAA-a", &["AAA-a"])]);
        assert_eq!(
            find_cycle("AAA-a", &collection),
            Some(vec!["AAA-a".to_string(), "AAA-a".to_string()])
        );
    }

    #[test]
    fn test_relationship_checks() {
        let mut source = doc("STR-growth", &["MSN-core", "VSN-missing"]);
        source.enables = vec!["OBJ-missing".into()];
        source.conflicts_with = vec!["STR-old".into(), "STR-draft".into()];
        let mut old = doc("STR-old", &[]);
        old.status = DocumentStatus::Accepted;
        let draft = doc("STR-draft", &[]);
        let mut msn = doc("MSN-core", &["STR-growth"]);
        msn.status = DocumentStatus::Accepted;

        let collection = DocumentCollection::new(vec![source.clone(), old, draft, msn]);
        let mut findings = Findings::default();
        check(&source, &collection, &mut findings);

        assert_eq!(
            codes(&findings),
            vec![
                IssueCode::MissingDependency,
                IssueCode::CircularDependency,
                IssueCode::MissingEnabledDocument,
                IssueCode::ActiveConflict,
            ]
        );
        assert_eq!(
            findings.errors[1].message,
            "Circular dependency detected: STR-growth -> MSN-core -> STR-growth"
        );
    }
}
