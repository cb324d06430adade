//! Ignore-list filtering for the file walker

use ::ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// Directories never descended into.
pub const IGNORE_DIRS: &[&str] = &[
    ".git", ".svn", ".hg", "target", "build", "dist", "node_modules",
    "venv", ".venv", "env", "__pycache__", ".pytest_cache",
    ".mypy_cache", ".ruff_cache", ".vscode", ".idea", "docs", "examples",
    "site-packages", "migrations",
];

/// Files skipped wherever they appear.
pub const IGNORE_FILES: &[&str] = &[
    ".gitignore", "LICENSE", "MANIFEST.in", "requirements.txt", "setup.py", "setup.cfg",
    "Pipfile", "Pipfile.lock", "poetry.lock", "uv.lock", ".DS_Store",
    "pyproject.toml", "Cargo.toml", "Cargo.lock", "package.json", "go.mod",
];

pub struct IgnoreFilter {
    inner: Gitignore,
}

impl IgnoreFilter {
    pub fn new(root: &Path, extra_excludes: &[String]) -> Self {
        let mut builder = GitignoreBuilder::new(root);

        // Project ignore files are optional; a missing one is not an error
        if root.join(".gitignore").is_file() {
            builder.add(root.join(".gitignore"));
        }

        for dir in IGNORE_DIRS {
            builder.add_line(None, &format!("{dir}/")).ok();
        }
        for file in IGNORE_FILES {
            builder.add_line(None, file).ok();
        }

        for pattern in extra_excludes {
            if let Err(err) = builder.add_line(None, pattern) {
                tracing::warn!("Invalid exclude pattern {:?}: {}", pattern, err);
            }
        }

        let inner = builder.build().unwrap_or_else(|err| {
            tracing::warn!("Failed to build ignore matcher: {}", err);
            Gitignore::empty()
        });

        Self { inner }
    }

    /// Check a path relative to the analysis root, including its parents.
    pub fn is_ignored(&self, relative: &Path, is_dir: bool) -> bool {
        self.inner
            .matched_path_or_any_parents(relative, is_dir)
            .is_ignore()
    }
}
