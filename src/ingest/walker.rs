use walkdir::WalkDir;
use std::path::{Path, PathBuf};
use crate::error::{BspecError, Result};

/// A markdown file found under the docs root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Path relative to the docs root, `/`-separated
    pub relative_path: String,
    pub absolute_path: PathBuf,
}

impl DiscoveredFile {
    /// Whether the file is a `README.md` (any case)
    pub fn is_readme(&self) -> bool {
        self.absolute_path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.eq_ignore_ascii_case("readme.md"))
    }
}

/// Discover every `.md` file under `root`, sorted by relative path.
///
/// Unreadable directory entries are skipped rather than aborting the walk.
pub fn discover_files(root: &Path) -> Result<Vec<DiscoveredFile>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let is_markdown = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
        if !is_markdown {
            continue;
        }

        let relative_path = path
            .strip_prefix(root)
            .map_err(|_| BspecError::Config(
                format!("Failed to compute relative path for: {}", path.display())
            ))?
            .to_string_lossy()
            .replace('\\', "/");

        files.push(DiscoveredFile {
            relative_path,
            absolute_path: path.to_path_buf(),
        });
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    log::info!("Discovered {} markdown files in {}", files.len(), root.display());
    Ok(files)
}
