//! Docstring extraction
//!
//! Two policies cover the supported languages:
//! - *leading block string*: the first statement of a body is a bare string
//!   literal (Python)
//! - *adjacent comment run*: doc-marked comments directly above a declaration,
//!   plus inner doc comments at the top of its body (Rust)

use crate::language::{roles, LanguageConfig};
use crate::syntax::{children, classify, classify_any, named_children, text_of};
use tree_sitter::Node;

/// Comment markers recognised by the adjacent-comment-run policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentMarkers {
    pub outer_line: &'static str,
    pub inner_line: &'static str,
    pub outer_block: &'static str,
    pub inner_block: &'static str,
    pub block_end: &'static str,
}

impl CommentMarkers {
    pub const fn rust() -> Self {
        Self {
            outer_line: "///",
            inner_line: "//!",
            outer_block: "/**",
            inner_block: "/*!",
            block_end: "*/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocstringPolicy {
    LeadingBlockString,
    AdjacentCommentRun(CommentMarkers),
}

/// Extract the docstring of a declaration using the language's policy.
pub fn extract(node: Node<'_>, source: &[u8], config: &LanguageConfig) -> Option<String> {
    match config.docstring_policy {
        DocstringPolicy::LeadingBlockString => {
            leading_block_string(node.child_by_field_name("body")?, source, config)
        }
        DocstringPolicy::AdjacentCommentRun(markers) => {
            adjacent_comment_run(node, source, config, &markers)
        }
    }
}

/// Docstring from the first statement of `body`, if it is a bare string.
///
/// Comments before the statement are skipped.
pub fn leading_block_string(body: Node<'_>, source: &[u8], config: &LanguageConfig) -> Option<String> {
    let first = named_children(body)
        .into_iter()
        .find(|n| !classify(*n, config, roles::COMMENT))?;

    if !classify(first, config, roles::EXPRESSION_STATEMENT) {
        return None;
    }

    let parts = named_children(first);
    let [literal] = parts.as_slice() else {
        return None;
    };

    let raw = string_literal_content(*literal, source, config)?;
    non_empty(dedent(&raw).trim())
}

const STRING_DELIMITERS: &[&str] = &["string_start", "string_end", "\"", "'", "\"\"\"", "'''"];

fn string_literal_content(node: Node<'_>, source: &[u8], config: &LanguageConfig) -> Option<String> {
    if classify(node, config, roles::STRING) {
        Some(string_parts(node, source))
    } else if classify(node, config, roles::CONCATENATED_STRING) {
        Some(
            named_children(node)
                .into_iter()
                .filter(|n| classify(*n, config, roles::STRING))
                .map(|n| string_parts(n, source))
                .collect(),
        )
    } else {
        None
    }
}

fn string_parts(string: Node<'_>, source: &[u8]) -> String {
    if string.child_count() == 0 {
        return strip_quotes(&text_of(string, source)).to_string();
    }

    children(string)
        .into_iter()
        .filter(|part| !STRING_DELIMITERS.contains(&part.kind()))
        .map(|part| text_of(part, source))
        .collect()
}

fn strip_quotes(literal: &str) -> &str {
    let body = literal.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(inner) = body
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    body
}

enum DocComment {
    Outer(Vec<String>),
    Inner(Vec<String>),
}

/// Docstring assembled from doc comments around a declaration.
///
/// Outer doc comments directly above `item` come first (attributes between
/// them and the item are stepped over), followed by inner doc comments at
/// the top of the item or its body.
pub fn adjacent_comment_run(
    item: Node<'_>,
    source: &[u8],
    config: &LanguageConfig,
    markers: &CommentMarkers,
) -> Option<String> {
    let mut lines = outer_doc_lines(item, source, config, markers);
    lines.extend(inner_doc_lines(item, source, config, markers));
    if let Some(body) = item.child_by_field_name("body") {
        lines.extend(inner_doc_lines(body, source, config, markers));
    }

    non_empty(lines.join("\n").trim())
}

fn outer_doc_lines(
    item: Node<'_>,
    source: &[u8],
    config: &LanguageConfig,
    markers: &CommentMarkers,
) -> Vec<String> {
    let mut reversed = Vec::new();
    let mut sibling = item.prev_named_sibling();

    while let Some(node) = sibling {
        sibling = node.prev_named_sibling();
        if classify(node, config, roles::ATTRIBUTE) {
            continue;
        }
        match doc_comment(node, source, config, markers) {
            Some(DocComment::Outer(lines)) => reversed.extend(lines.into_iter().rev()),
            _ => break,
        }
    }

    reversed.reverse();
    reversed
}

fn inner_doc_lines(
    container: Node<'_>,
    source: &[u8],
    config: &LanguageConfig,
    markers: &CommentMarkers,
) -> Vec<String> {
    let mut lines = Vec::new();

    for child in named_children(container) {
        if classify_any(child, config, &[roles::ATTRIBUTE, roles::INNER_ATTRIBUTE]) {
            continue;
        }
        if !is_comment(child, config) {
            break;
        }
        if let Some(DocComment::Inner(inner)) = doc_comment(child, source, config, markers) {
            lines.extend(inner);
        }
    }

    lines
}

fn is_comment(node: Node<'_>, config: &LanguageConfig) -> bool {
    classify_any(node, config, &[roles::LINE_COMMENT, roles::BLOCK_COMMENT, roles::COMMENT])
}

fn doc_comment(
    node: Node<'_>,
    source: &[u8],
    config: &LanguageConfig,
    markers: &CommentMarkers,
) -> Option<DocComment> {
    let text = text_of(node, source);

    if classify(node, config, roles::LINE_COMMENT) {
        if let Some(rest) = text.strip_prefix(markers.outer_line) {
            // `////` is an ordinary comment
            if rest.starts_with('/') {
                return None;
            }
            return Some(DocComment::Outer(vec![line_body(rest)]));
        }
        return text
            .strip_prefix(markers.inner_line)
            .map(|rest| DocComment::Inner(vec![line_body(rest)]));
    }

    if classify(node, config, roles::BLOCK_COMMENT) {
        let open = text.strip_suffix(markers.block_end)?;
        if let Some(rest) = open.strip_prefix(markers.outer_block) {
            // `/***` and `/**/` are ordinary comments
            if rest.starts_with('*') {
                return None;
            }
            return Some(DocComment::Outer(block_lines(rest)));
        }
        return open
            .strip_prefix(markers.inner_block)
            .map(|rest| DocComment::Inner(block_lines(rest)));
    }

    None
}

fn line_body(rest: &str) -> String {
    let rest = rest.trim_end();
    rest.strip_prefix(' ').unwrap_or(rest).to_string()
}

fn block_lines(body: &str) -> Vec<String> {
    let mut lines: Vec<String> = body
        .lines()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line).trim_end().to_string()
        })
        .collect();

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|l| l.is_empty()).count();
    lines.drain(..leading);
    lines
}

/// Remove the whitespace margin common to every non-blank line.
///
/// Whitespace-only lines do not count towards the margin and come out empty.
pub fn dedent(text: &str) -> String {
    let margin = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| &line[..line.len() - line.trim_start().len()])
        .reduce(common_prefix)
        .unwrap_or("");

    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                ""
            } else {
                line.strip_prefix(margin).unwrap_or(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x.len_utf8())
        .sum();
    &a[..len]
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::builtin;
    use tree_sitter::{Parser, Tree};

    fn parse(config: &LanguageConfig, source: &str) -> Tree {
        let mut parser = Parser::new();
        parser.set_language(&config.grammar).unwrap();
        parser.parse(source, None).unwrap()
    }

    fn python_doc(source: &str) -> Option<String> {
        let config = builtin::python();
        let tree = parse(&config, source);
        let decl = named_children(tree.root_node())[0];
        extract(decl, source.as_bytes(), &config)
    }

    fn rust_doc(source: &str, index: usize) -> Option<String> {
        let config = builtin::rust();
        let tree = parse(&config, source);
        let items: Vec<_> = named_children(tree.root_node())
            .into_iter()
            .filter(|n| !is_comment(*n, &config) && !classify(*n, &config, roles::ATTRIBUTE))
            .collect();
        extract(items[index], source.as_bytes(), &config)
    }

    #[test]
    fn test_block_string_dedented() {
        let source = "def f():\n    \"\"\"\n    line one\n    line two\n    \"\"\"\n    return 1\n";
        assert_eq!(python_doc(source).as_deref(), Some("line one\nline two"));
    }

    #[test]
    fn test_block_string_single_line() {
        let source = "class A:\n    '''A thing.'''\n    x = 1\n";
        assert_eq!(python_doc(source).as_deref(), Some("A thing."));
    }

    #[test]
    fn test_block_string_after_comment() {
        let source = "def f():\n    # note\n    \"\"\"Doc.\"\"\"\n";
        assert_eq!(python_doc(source).as_deref(), Some("Doc."));
    }

    #[test]
    fn test_concatenated_block_string() {
        let source = "def f():\n    \"abc\" \"def\"\n";
        assert_eq!(python_doc(source).as_deref(), Some("abcdef"));
    }

    #[test]
    fn test_no_block_string() {
        assert_eq!(python_doc("def f():\n    return \"nope\"\n"), None);
        assert_eq!(python_doc("def f():\n    x = 1\n    \"\"\"late\"\"\"\n"), None);
        assert_eq!(python_doc("def f():\n    \"\"\"  \"\"\"\n"), None);
    }

    #[test]
    fn test_comment_run() {
        let source = "/// a\n/// b\n/// c\nfn f() {}\n";
        assert_eq!(rust_doc(source, 0).as_deref(), Some("a\nb\nc"));
    }

    #[test]
    fn test_comment_run_steps_over_attributes() {
        let source = "/// Point.\n#[derive(Debug)]\n/// More.\n#[allow(dead_code)]\nstruct P;\n";
        assert_eq!(rust_doc(source, 0).as_deref(), Some("Point.\nMore."));
    }

    #[test]
    fn test_comment_run_stops_at_plain_comment() {
        let source = "/// far\n// plain\nfn f() {}\n";
        assert_eq!(rust_doc(source, 0), None);

        let source = "//// not a doc\nfn f() {}\n";
        assert_eq!(rust_doc(source, 0), None);
    }

    #[test]
    fn test_comment_run_only_adjacent_item() {
        let source = "/// first\nfn a() {}\nfn b() {}\n";
        assert_eq!(rust_doc(source, 0).as_deref(), Some("first"));
        assert_eq!(rust_doc(source, 1), None);
    }

    #[test]
    fn test_block_doc_comment() {
        let source = "/**\n * Summary.\n *\n * Detail.\n */\nenum E { A }\n";
        assert_eq!(rust_doc(source, 0).as_deref(), Some("Summary.\n\nDetail."));

        let source = "/*** banner ***/\nenum E { A }\n";
        assert_eq!(rust_doc(source, 0), None);
    }

    #[test]
    fn test_inner_doc_in_body() {
        let source = "/// Outer.\nmod net {\n    //! Inner.\n    //! More inner.\n    fn f() {}\n}\n";
        assert_eq!(rust_doc(source, 0).as_deref(), Some("Outer.\nInner.\nMore inner."));
    }

    #[test]
    fn test_file_level_inner_doc_is_not_item_doc() {
        let source = "//! Crate docs.\n\nfn f() {}\n";
        assert_eq!(rust_doc(source, 0), None);
    }

    #[test]
    fn test_dedent() {
        assert_eq!(dedent("    a\n      b\n    c"), "a\n  b\nc");
        assert_eq!(dedent("\n    a\n   \n    b\n"), "\na\n\nb");
        assert_eq!(dedent("a\n    b"), "a\n    b");
        assert_eq!(dedent("\tx\n\ty"), "x\ny");
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("r\"\"\"raw\"\"\""), "raw");
        assert_eq!(strip_quotes("'x'"), "x");
    }
}
