//! Core strategy framework
//!
//! Defines the trait every language driver implements and the per-file
//! context and result types they share.

use crate::diagnostics::Diagnostic;
use crate::extract::{docstring, signature, FqnBuilder, Signature};
use crate::ir::{FunctionRecord, IrRecord, StructureRecord, TestSpecRecord};
use crate::language::{LanguageConfig, LanguageId};
use crate::syntax::{classify, classify_any, line_range, Declaration, ParsedSource};
use tree_sitter::Node;

/// Records extracted from one file.
#[derive(Debug, Default)]
pub struct FileExtraction {
    pub structures: Vec<StructureRecord>,
    pub functions: Vec<FunctionRecord>,
    pub tests: Vec<TestSpecRecord>,
    /// Problems local to this file that did not stop extraction
    pub diagnostics: Vec<Diagnostic>,
}

impl FileExtraction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level declarations found (nested methods excluded).
    pub fn declaration_count(&self) -> usize {
        self.structures.len() + self.functions.len() + self.tests.len()
    }

    /// Records in emission order: structures, then functions, then tests.
    pub fn into_records(self) -> (Vec<IrRecord>, Vec<Diagnostic>) {
        let records = self
            .structures
            .into_iter()
            .map(IrRecord::Structure)
            .chain(self.functions.into_iter().map(IrRecord::Function))
            .chain(self.tests.into_iter().map(IrRecord::Test))
            .collect();
        (records, self.diagnostics)
    }
}

/// Everything a driver needs to know about the file being extracted.
pub struct FileContext<'a> {
    pub parsed: &'a ParsedSource<'a>,
    pub config: &'a LanguageConfig,
    /// Path relative to the analysis root, forward slashes
    pub source_file: &'a str,
    pub fqn: &'a FqnBuilder,
    pub is_test_file: bool,
}

impl<'a> FileContext<'a> {
    pub fn source(&self) -> &'a [u8] {
        self.parsed.source()
    }

    pub fn root(&self) -> Node<'a> {
        self.parsed.root()
    }

    pub fn text(&self, node: Node<'_>) -> String {
        self.parsed.text(node)
    }

    /// Whether `node` plays `role` in this language.
    pub fn is(&self, node: Node<'_>, role: &str) -> bool {
        classify(node, self.config, role)
    }

    pub fn is_any(&self, node: Node<'_>, roles: &[&str]) -> bool {
        classify_any(node, self.config, roles)
    }

    /// Non-empty text of the node's `name` field.
    pub fn name_of(&self, node: Node<'_>) -> Option<String> {
        node.child_by_field_name("name")
            .map(|name| self.text(name))
            .filter(|name| !name.is_empty())
    }

    /// Diagnostic for a declaration whose name cannot be read.
    pub fn unresolved(&self, node: Node<'_>) -> Diagnostic {
        Diagnostic::UnresolvedName {
            path: self.source_file.to_string(),
            line: node.start_position().row + 1,
            node_kind: node.kind().to_string(),
        }
    }
}

/// A language driver.
///
/// The three capabilities have language-neutral defaults backed by the
/// shared extractors; drivers override them where their language differs.
pub trait LanguageStrategy: Send + Sync {
    /// The language this strategy extracts
    fn language(&self) -> LanguageId;

    /// Signature of a function-like declaration
    fn extract_signature(&self, node: Node<'_>, cx: &FileContext<'_>) -> Signature {
        signature::extract(node, cx.source(), cx.config)
    }

    /// Docstring of a declaration, if any
    fn extract_docstring(&self, node: Node<'_>, cx: &FileContext<'_>) -> Option<String> {
        docstring::extract(node, cx.source(), cx.config)
    }

    /// Qualified name of `name`, optionally under an enclosing declaration
    fn build_fqn_segment(&self, name: &str, parent: Option<&str>, cx: &FileContext<'_>) -> String {
        cx.fqn.qualify(name, parent).value
    }

    /// Extract every supported declaration of a parsed file
    fn extract_file(&self, cx: &FileContext<'_>) -> FileExtraction;

    /// Build a function record for a classified declaration.
    fn function_record(
        &self,
        decl: &Declaration<'_>,
        name: String,
        qualified_name: String,
        cx: &FileContext<'_>,
    ) -> FunctionRecord {
        let (line_start, line_end) = line_range(decl.span);
        FunctionRecord {
            name,
            qualified_name,
            source_file: cx.source_file.to_string(),
            line_start,
            line_end,
            signature: self.extract_signature(decl.node, cx),
            docstring: self.extract_docstring(decl.node, cx),
            raw_text: cx.text(decl.span),
            language: self.language(),
        }
    }

    /// Build a test record for a classified declaration.
    fn test_record(
        &self,
        decl: &Declaration<'_>,
        name: String,
        qualified_name: String,
        cx: &FileContext<'_>,
    ) -> TestSpecRecord {
        let (line_start, line_end) = line_range(decl.span);
        TestSpecRecord {
            id: qualified_name,
            scenario_name: name,
            source_file: cx.source_file.to_string(),
            line_start,
            line_end,
            docstring: self.extract_docstring(decl.node, cx),
            raw_text: cx.text(decl.span),
            language: self.language(),
        }
    }
}

/// Registry of language strategies
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn LanguageStrategy>>,
}

impl StrategyRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy
    pub fn register(&mut self, strategy: impl LanguageStrategy + 'static) {
        self.strategies.push(Box::new(strategy));
    }

    /// Find the strategy for a language
    pub fn find(&self, language: LanguageId) -> Option<&dyn LanguageStrategy> {
        self.strategies
            .iter()
            .find(|s| s.language() == language)
            .map(|s| s.as_ref())
    }

    /// Get all registered strategies
    pub fn strategies(&self) -> &[Box<dyn LanguageStrategy>] {
        &self.strategies
    }
}

/// Create a registry with all built-in strategies
pub fn default_strategies() -> StrategyRegistry {
    let mut registry = StrategyRegistry::new();
    registry.register(super::python::PythonStrategy::new());
    registry.register(super::rust::RustStrategy::new());
    registry
}
