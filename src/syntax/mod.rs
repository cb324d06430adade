//! Syntax tree adapter
//!
//! Parses source bytes into a tree-sitter tree for one language and offers
//! the small set of node operations the extractors rely on: byte-range text
//! slicing, field lookup, child iteration and named query execution.

pub mod classify;

pub use classify::{classify, classify_any, Declaration, Role};

use crate::diagnostics::Diagnostics;
use crate::language::{LanguageId, LanguageRegistry, LanguageRuntime};
use crate::{Error, Result};
use std::sync::Arc;
use tree_sitter::{Node, QueryCursor, Tree};

/// Parse behaviour switches.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Treat a tree containing syntax errors as a parse failure
    pub skip_malformed: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            skip_malformed: true,
        }
    }
}

/// A parsed file: the tree, the bytes it was parsed from, and the runtime
/// holding the language's compiled queries.
///
/// Nodes borrowed from [`ParsedSource::root`] cannot outlive this value.
pub struct ParsedSource<'src> {
    tree: Tree,
    source: &'src [u8],
    runtime: Arc<LanguageRuntime>,
}

/// One capture produced by a named query.
#[derive(Debug, Clone)]
pub struct QueryHit<'tree> {
    pub capture: String,
    pub node: Node<'tree>,
}

/// Parse `source` as `language`.
///
/// Fails with [`Error::Parse`] when no parser is available, the source is
/// blank, the parser yields no tree, or (with `skip_malformed`) the tree has
/// syntax errors.
pub fn parse<'src>(
    registry: &LanguageRegistry,
    source: &'src [u8],
    language: LanguageId,
    options: ParseOptions,
    diagnostics: &mut Diagnostics,
) -> Result<ParsedSource<'src>> {
    if source.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::Parse("empty source".to_string()));
    }

    let runtime = registry
        .get_or_init(language, diagnostics)
        .map_err(|e| Error::Parse(format!("no {} parser: {}", language, e)))?;

    let tree = runtime
        .parse(source)?
        .ok_or_else(|| Error::Parse("parser produced no tree".to_string()))?;

    if options.skip_malformed && tree.root_node().has_error() {
        return Err(Error::Parse("source contains syntax errors".to_string()));
    }

    Ok(ParsedSource {
        tree,
        source,
        runtime,
    })
}

impl<'src> ParsedSource<'src> {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn source(&self) -> &'src [u8] {
        self.source
    }

    pub fn language(&self) -> LanguageId {
        self.runtime.language()
    }

    /// Text of a node in this file.
    pub fn text(&self, node: Node<'_>) -> String {
        text_of(node, self.source)
    }

    /// Run the named query under `node`.
    ///
    /// An unknown or uncompiled query yields no hits.
    pub fn run_query<'tree>(&'tree self, name: &str, node: Node<'tree>) -> Vec<QueryHit<'tree>> {
        let Some(query) = self.runtime.queries().get(name) else {
            return Vec::new();
        };

        let names = query.capture_names();
        let mut cursor = QueryCursor::new();
        let mut hits = Vec::new();

        for (query_match, index) in cursor.captures(query, node, self.source) {
            let capture = query_match.captures[index];
            hits.push(QueryHit {
                capture: names[capture.index as usize].to_string(),
                node: capture.node,
            });
        }

        hits
    }
}

/// Lossy UTF-8 text of a node's byte range.
///
/// An empty or out-of-range extent yields an empty string.
pub fn text_of(node: Node<'_>, source: &[u8]) -> String {
    byte_range_text(node.start_byte(), node.end_byte(), source)
}

fn byte_range_text(start: usize, end: usize, source: &[u8]) -> String {
    if start >= end || end > source.len() {
        return String::new();
    }
    String::from_utf8_lossy(&source[start..end]).into_owned()
}

/// Child stored under a grammar field.
pub fn child_by_field<'tree>(node: Node<'tree>, field: &str) -> Option<Node<'tree>> {
    node.child_by_field_name(field)
}

/// Named children in source order.
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// All children, anonymous tokens included, in source order.
pub fn children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Every child stored under a repeated grammar field.
pub fn children_by_field<'tree>(node: Node<'tree>, field: &str) -> Vec<Node<'tree>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

/// 1-based inclusive line range of a node.
pub fn line_range(node: Node<'_>) -> (usize, usize) {
    (node.start_position().row + 1, node.end_position().row + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::QueryOverrides;

    fn registry(diagnostics: &mut Diagnostics) -> LanguageRegistry {
        LanguageRegistry::builtin(LanguageId::all(), &QueryOverrides::new(), diagnostics).unwrap()
    }

    #[test]
    fn test_parse_python() {
        let mut diagnostics = Diagnostics::new();
        let registry = registry(&mut diagnostics);
        let source = b"def hello(name):\n    return name\n";

        let parsed = parse(&registry, source, LanguageId::Python, ParseOptions::default(), &mut diagnostics)
            .unwrap();
        let root = parsed.root();
        assert_eq!(root.kind(), "module");
        assert_eq!(parsed.language(), LanguageId::Python);

        let function = named_children(root)[0];
        let name = child_by_field(function, "name").unwrap();
        assert_eq!(parsed.text(name), "hello");
        assert_eq!(line_range(function), (1, 2));
    }

    #[test]
    fn test_parse_rejects_blank_source() {
        let mut diagnostics = Diagnostics::new();
        let registry = registry(&mut diagnostics);

        for source in [&b""[..], &b"  \n\t\n"[..]] {
            let result = parse(&registry, source, LanguageId::Rust, ParseOptions::default(), &mut diagnostics);
            assert!(matches!(result, Err(Error::Parse(_))));
        }
    }

    #[test]
    fn test_parse_malformed() {
        let mut diagnostics = Diagnostics::new();
        let registry = registry(&mut diagnostics);
        let source = b"def broken(:\n    pass\n";

        let strict = parse(&registry, source, LanguageId::Python, ParseOptions::default(), &mut diagnostics);
        assert!(matches!(strict, Err(Error::Parse(_))));

        let lenient = parse(
            &registry,
            source,
            LanguageId::Python,
            ParseOptions { skip_malformed: false },
            &mut diagnostics,
        );
        assert!(lenient.is_ok());
    }

    #[test]
    fn test_text_of_extents() {
        let mut diagnostics = Diagnostics::new();
        let registry = registry(&mut diagnostics);
        let source = b"fn main() {}\n";
        let parsed = parse(&registry, source, LanguageId::Rust, ParseOptions::default(), &mut diagnostics)
            .unwrap();

        let function = named_children(parsed.root())[0];
        assert_eq!(text_of(function, source), "fn main() {}");
        assert_eq!(text_of(function, b"fn"), "");
        assert_eq!(byte_range_text(3, 3, source), "");
        assert_eq!(byte_range_text(0, 2, b"\xff\xfe"), "\u{fffd}\u{fffd}");
    }

    #[test]
    fn test_run_query() {
        let mut diagnostics = Diagnostics::new();
        let registry = registry(&mut diagnostics);
        let source = b"def test_one():\n    pass\n\ndef helper():\n    pass\n";
        let parsed = parse(&registry, source, LanguageId::Python, ParseOptions::default(), &mut diagnostics)
            .unwrap();

        let names: Vec<_> = parsed
            .run_query("test_funcs", parsed.root())
            .into_iter()
            .filter(|hit| hit.capture == "name")
            .map(|hit| parsed.text(hit.node))
            .collect();
        assert_eq!(names, vec!["test_one"]);

        assert!(parsed.run_query("no_such_query", parsed.root()).is_empty());
    }
}
