//! Diagnostics
//!
//! Every recoverable failure during a run becomes a [`Diagnostic`]. Nothing is
//! dropped silently: each push is also mirrored to `tracing`.

use serde::Serialize;
use std::fmt;

/// A recoverable problem observed during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A language's configuration or parser could not be set up
    LanguageUnavailable { language: String, reason: String },
    /// A single query template failed to compile
    QueryCompilation {
        language: String,
        query: String,
        reason: String,
    },
    /// A file produced no usable tree
    ParseFailure { path: String, reason: String },
    /// A declaration whose name could not be read
    UnresolvedName {
        path: String,
        line: usize,
        node_kind: String,
    },
    /// A file could not be read from disk
    UnreadableFile { path: String, reason: String },
    /// A file failed for any other reason
    FileFailed { path: String, reason: String },
}

impl Diagnostic {
    /// Whether this diagnostic disables a whole language rather than one file.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Diagnostic::LanguageUnavailable { .. } | Diagnostic::QueryCompilation { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::LanguageUnavailable { language, reason } => {
                write!(f, "language {} unavailable: {}", language, reason)
            }
            Diagnostic::QueryCompilation {
                language,
                query,
                reason,
            } => write!(f, "query '{}' for {} failed to compile: {}", query, language, reason),
            Diagnostic::ParseFailure { path, reason } => {
                write!(f, "skipping {}: {}", path, reason)
            }
            Diagnostic::UnresolvedName {
                path,
                line,
                node_kind,
            } => write!(f, "{}:{}: {} has no readable name", path, line, node_kind),
            Diagnostic::UnreadableFile { path, reason } => {
                write!(f, "cannot read {}: {}", path, reason)
            }
            Diagnostic::FileFailed { path, reason } => {
                write!(f, "extraction of {} failed: {}", path, reason)
            }
        }
    }
}

/// Ordered collection of diagnostics for one run.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_configuration() {
            tracing::error!("{}", diagnostic);
        } else {
            tracing::warn!("{}", diagnostic);
        }
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::ParseFailure {
            path: "a.py".to_string(),
            reason: "empty source".to_string(),
        });
        diagnostics.push(Diagnostic::UnreadableFile {
            path: "b.py".to_string(),
            reason: "permission denied".to_string(),
        });

        let paths: Vec<_> = diagnostics
            .iter()
            .map(|d| match d {
                Diagnostic::ParseFailure { path, .. } | Diagnostic::UnreadableFile { path, .. } => {
                    path.as_str()
                }
                _ => "",
            })
            .collect();
        assert_eq!(paths, vec!["a.py", "b.py"]);
    }

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic::UnresolvedName {
            path: "src/lib.rs".to_string(),
            line: 12,
            node_kind: "function_item".to_string(),
        };
        assert_eq!(diagnostic.to_string(), "src/lib.rs:12: function_item has no readable name");
        assert!(!diagnostic.is_configuration());
    }
}
