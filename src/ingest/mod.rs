pub mod walker;
mod frontmatter;

use std::path::Path;

use serde::Serialize;

pub use frontmatter::{parse_document, split_frontmatter};
pub use walker::{DiscoveredFile, discover_files};

use crate::collection::DocumentCollection;
use crate::error::{BspecError, Result};
use crate::model::Document;
use crate::taxonomy::Taxonomy;

/// A file that could not be turned into a document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadFailure {
    pub path: String,
    pub errors: Vec<String>,
}

/// Outcome of loading a docs folder
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Parsed documents in sorted path order
    pub documents: Vec<Document>,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn into_collection(self) -> DocumentCollection {
        DocumentCollection::new(self.documents)
    }
}

/// Load every BSpec document under `root`.
///
/// Orchestrates the pipeline: discover → read → parse. A file that fails to
/// read or parse becomes a [`LoadFailure`]; only walking `root` itself can
/// fail the whole load.
pub fn load_collection(root: &Path, taxonomy: &Taxonomy) -> Result<LoadReport> {
    if !root.is_dir() {
        return Err(BspecError::Config(format!(
            "Docs folder is not a directory: {}",
            root.display()
        )));
    }

    let mut report = LoadReport::default();

    for file in discover_files(root)? {
        let content = match std::fs::read_to_string(&file.absolute_path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Failed to read {}: {}", file.relative_path, e);
                report.failures.push(LoadFailure {
                    path: file.relative_path,
                    errors: vec![e.to_string()],
                });
                continue;
            }
        };

        if file.is_readme() && split_frontmatter(&content).is_none() {
            log::debug!("Skipping {}", file.relative_path);
            continue;
        }

        match parse_document(&content, &file.relative_path, taxonomy) {
            Ok(document) => report.documents.push(document),
            Err(e) => {
                log::warn!("Failed to parse {}: {}", file.relative_path, e);
                let errors = match e {
                    BspecError::InvalidDocument { errors, .. } => errors,
                    other => vec![other.to_string()],
                };
                report.failures.push(LoadFailure {
                    path: file.relative_path,
                    errors,
                });
            }
        }
    }

    log::info!(
        "Loaded {} documents ({} failed) from {}",
        report.documents.len(),
        report.failures.len(),
        root.display()
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn document_text(id: &str, doc_type: &str, depends_on: &[&str]) -> String {
        let deps: String = depends_on.iter().map(|d| format!("  - {}\n", d)).collect();
        format!(
            "---\nid: {id}\ntitle: {id}\ntype: {doc_type}\nstatus: Draft\nversion: 1.0.0\nowner: team\ncreated: 2024-01-01\nupdated: 2024-01-02\ndepends_on:\n{deps}---\n\nBody of {id}\n"
        )
    }

    #[test]
    fn test_load_collection() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("strategic")).unwrap();
        fs::create_dir_all(root.join("market")).unwrap();

        fs::write(root.join("README.md"), "# BSpec docs\n").unwrap();
        fs::write(root.join("strategic/MSN-core.md"), document_text("MSN-core", "MSN", &[])).unwrap();
        fs::write(
            root.join("strategic/STR-growth.md"),
            document_text("STR-growth", "STR", &["MSN-core"]),
        )
        .unwrap();
        fs::write(root.join("market/MKT-broken.md"), "---\nid: MKT-broken\n---\n").unwrap();
        fs::write(root.join("market/notes.md"), "no frontmatter here").unwrap();

        let report = load_collection(root, &Taxonomy::default()).unwrap();

        let ids: Vec<&str> = report.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["MSN-core", "STR-growth"]);
        assert_eq!(report.documents[1].source.as_deref(), Some("strategic/STR-growth.md"));
        assert_eq!(report.documents[1].depends_on, vec!["MSN-core"]);
        assert_eq!(report.documents[1].content, "Body of STR-growth");

        let failed: Vec<&str> = report.failures.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(failed, vec!["market/MKT-broken.md", "market/notes.md"]);
        assert!(report.failures[0]
            .errors
            .contains(&"Missing required field: owner".to_string()));
        assert_eq!(report.failures[1].errors, vec!["No YAML frontmatter found in document"]);

        let collection = report.into_collection();
        assert_eq!(collection.len(), 2);
        assert!(collection.contains("MSN-core"));
    }

    #[test]
    fn test_load_collection_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_collection(&temp_dir.path().join("absent"), &Taxonomy::default());
        assert!(matches!(result, Err(BspecError::Config(_))));
    }
}
