//! Language registry
//!
//! Per-language grammar handles, role alias tables, query templates, and
//! namespace styles, plus the lazily-built parser pool that serves them.

pub mod builtin;
pub mod pool;
pub mod registry;

pub use pool::{CompiledQuerySet, LanguageRuntime};
pub use registry::{LanguageConfig, LanguageRegistry, QueryOverrides};

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Abstract role keys shared by every language's alias table.
pub mod roles {
    pub const MODULE: &str = "module";
    pub const INLINE_MODULE: &str = "inline_module";
    pub const CLASS_DEF: &str = "class_def";
    pub const STRUCT_DEF: &str = "struct_def";
    pub const ENUM_DEF: &str = "enum_def";
    pub const TRAIT_DEF: &str = "trait_def";
    pub const IMPL_BLOCK: &str = "impl_block";
    pub const FUNC_DEF: &str = "func_def";
    pub const FUNC_SIGNATURE: &str = "func_signature";
    pub const DECORATED_DEF: &str = "decorated_def";
    pub const BLOCK: &str = "block";
    pub const EXPRESSION_STATEMENT: &str = "expression_statement";
    pub const STRING: &str = "string";
    pub const CONCATENATED_STRING: &str = "concatenated_string";
    pub const ASSIGNMENT: &str = "assignment";
    pub const COMMENT: &str = "comment";
    pub const IDENTIFIER: &str = "identifier";
    pub const MEMBER_ACCESS: &str = "member_access";
    pub const KEYWORD_ARGUMENT: &str = "keyword_argument";
    pub const LINE_COMMENT: &str = "line_comment";
    pub const BLOCK_COMMENT: &str = "block_comment";
    pub const ATTRIBUTE: &str = "attribute";
    pub const INNER_ATTRIBUTE: &str = "inner_attribute";
    pub const FIELD_LIST: &str = "field_list";
    pub const TUPLE_FIELD_LIST: &str = "tuple_field_list";
    pub const FIELD: &str = "field";
    pub const VARIANT_LIST: &str = "variant_list";
    pub const VARIANT: &str = "variant";
    pub const MODIFIERS: &str = "modifiers";
}

/// Supported source languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageId {
    Python,
    Rust,
}

impl LanguageId {
    /// Get the string representation of the language
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageId::Python => "python",
            LanguageId::Rust => "rust",
        }
    }

    /// Get all supported languages
    pub fn all() -> &'static [LanguageId] {
        &[LanguageId::Python, LanguageId::Rust]
    }

    /// File extensions (without the dot) handled by this language.
    ///
    /// Python stub files are only included on request.
    pub fn extensions(&self, include_pyi: bool) -> &'static [&'static str] {
        match self {
            LanguageId::Python if include_pyi => &["py", "pyi"],
            LanguageId::Python => &["py"],
            LanguageId::Rust => &["rs"],
        }
    }

    /// Detect the language of a file from its extension.
    pub fn from_path(path: &Path, include_pyi: bool) -> Option<LanguageId> {
        let ext = path.extension().and_then(|e| e.to_str())?;
        Self::all()
            .iter()
            .copied()
            .find(|lang| lang.extensions(include_pyi).contains(&ext))
    }
}

impl FromStr for LanguageId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "python" | "py" => Ok(LanguageId::Python),
            "rust" | "rs" => Ok(LanguageId::Rust),
            _ => Err(Error::UnknownLanguage(s.to_string())),
        }
    }
}

impl std::fmt::Display for LanguageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_str() {
        assert_eq!(LanguageId::from_str("Python").unwrap(), LanguageId::Python);
        assert_eq!(LanguageId::from_str("rs").unwrap(), LanguageId::Rust);
        assert!(LanguageId::from_str("cobol").is_err());
    }

    #[test]
    fn test_language_from_path() {
        assert_eq!(LanguageId::from_path(Path::new("a/b.py"), false), Some(LanguageId::Python));
        assert_eq!(LanguageId::from_path(Path::new("src/lib.rs"), false), Some(LanguageId::Rust));
        assert_eq!(LanguageId::from_path(Path::new("stubs.pyi"), false), None);
        assert_eq!(LanguageId::from_path(Path::new("stubs.pyi"), true), Some(LanguageId::Python));
        assert_eq!(LanguageId::from_path(Path::new("README.md"), true), None);
    }
}
