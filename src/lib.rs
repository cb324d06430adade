//! # codeir - Source Extraction Engine
//!
//! Language-agnostic extraction of declarations into a canonical
//! intermediate representation (IR).
//!
//! codeir provides:
//! - A language registry with lazily-initialized tree-sitter parsers
//! - A node classifier mapping concrete node types onto abstract roles
//! - Docstring, signature, and fully-qualified-name extractors
//! - Per-language extraction drivers (Python, Rust)
//! - An aggregator folding per-file records into components
//! - JSON, YAML and plain-text context output

pub mod language;
pub mod syntax;
pub mod extract;
pub mod adapter;
pub mod ir;
pub mod diagnostics;
pub mod pipeline;
pub mod config;
pub mod ignore;
pub mod walk;
pub mod metadata;
pub mod library;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use diagnostics::{Diagnostic, Diagnostics};
pub use ir::{Component, FunctionRecord, RepositoryIr, StructureRecord, TestSpecRecord};
pub use language::{LanguageId, LanguageRegistry};
pub use pipeline::Pipeline;

/// Result type alias for codeir operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for codeir operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error for {language}: {message}")]
    Configuration { language: String, message: String },

    #[error("No language configurations could be loaded")]
    NoLanguages,

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Manifest error: {0}")]
    Manifest(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Library not found: {name} ({reason})")]
    LibraryNotFound { name: String, reason: String },

    #[error("Analysis root unreadable: {0}")]
    AnalysisRoot(String),
}
