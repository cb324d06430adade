//! Source file discovery
//!
//! Walks the analysis root in sorted order, applies the ignore filter, and
//! keeps files whose extension maps to a supported language.

use crate::ignore::IgnoreFilter;
use crate::language::LanguageId;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A source file selected for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// Forward-slash path relative to the analysis root
    pub relative_path: String,
    pub language: LanguageId,
    pub is_test_file: bool,
}

/// Collect supported source files under `root`, sorted by path.
pub fn discover_files(
    root: &Path,
    languages: &[LanguageId],
    include_pyi: bool,
    filter: IgnoreFilter,
) -> Result<Vec<DiscoveredFile>> {
    std::fs::read_dir(root).map_err(|e| Error::AnalysisRoot(format!("{}: {}", root.display(), e)))?;

    let filter = Arc::new(filter);
    let walk_root = root.to_path_buf();
    let entry_filter = Arc::clone(&filter);

    let walker = ::ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let Ok(relative) = entry.path().strip_prefix(&walk_root) else {
                return true;
            };
            if relative.as_os_str().is_empty() {
                return true;
            }
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !entry_filter.is_ignored(relative, is_dir)
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        let Some(language) = LanguageId::from_path(path, include_pyi) else {
            continue;
        };
        if !languages.contains(&language) {
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };

        let relative_path = to_slash_path(relative);
        tracing::debug!("Discovered {} ({})", relative_path, language);
        files.push(DiscoveredFile {
            path: path.to_path_buf(),
            is_test_file: is_test_path(relative),
            relative_path,
            language,
        });
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(files)
}

/// A file is a test file when its name mentions `test` or it lives under a
/// `test`/`tests` directory.
pub fn is_test_path(relative: &Path) -> bool {
    let name_is_test = relative
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.to_lowercase().contains("test"));
    let dir_is_test = relative
        .parent()
        .into_iter()
        .flat_map(|p| p.components())
        .filter_map(|c| c.as_os_str().to_str())
        .any(|c| c == "test" || c == "tests");
    name_is_test || dir_is_test
}

fn to_slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_discover_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "pkg/b.py", "x = 1\n");
        write(root, "pkg/a.py", "x = 1\n");
        write(root, "pkg/stub.pyi", "x: int\n");
        write(root, "src/lib.rs", "fn f() {}\n");
        write(root, "target/debug/gen.rs", "fn g() {}\n");
        write(root, "README.md", "# readme\n");

        let filter = IgnoreFilter::new(root, &[]);
        let files = discover_files(root, LanguageId::all(), false, filter).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.relative_path.as_str()).collect();

        assert_eq!(paths, vec!["pkg/a.py", "pkg/b.py", "src/lib.rs"]);
        assert_eq!(files[2].language, LanguageId::Rust);
    }

    #[test]
    fn test_discover_respects_language_selection_and_pyi() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "pkg/mod.py", "x = 1\n");
        write(root, "pkg/mod.pyi", "x: int\n");
        write(root, "src/lib.rs", "fn f() {}\n");

        let filter = IgnoreFilter::new(root, &[]);
        let files = discover_files(root, &[LanguageId::Python], true, filter).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.relative_path.as_str()).collect();

        assert_eq!(paths, vec!["pkg/mod.py", "pkg/mod.pyi"]);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let filter = IgnoreFilter::new(dir.path(), &[]);

        let err = discover_files(&missing, LanguageId::all(), false, filter).unwrap_err();
        assert!(matches!(err, Error::AnalysisRoot(_)));
    }

    #[test]
    fn test_is_test_path() {
        assert!(is_test_path(Path::new("tests/helpers.py")));
        assert!(is_test_path(Path::new("pkg/test_mod.py")));
        assert!(is_test_path(Path::new("pkg/mod_tests.rs")));
        assert!(!is_test_path(Path::new("pkg/mod.py")));
        assert!(!is_test_path(Path::new("testing/mod.py")));
    }
}
