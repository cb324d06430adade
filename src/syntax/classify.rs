//! Node classifier
//!
//! Maps concrete node types onto the abstract roles of a language's alias
//! table. Drivers never compare node kinds directly; they ask whether a node
//! plays a role.

use crate::ir::StructureKind;
use crate::language::LanguageConfig;
use tree_sitter::Node;

/// Whether `node` plays `role` in this language. Unknown roles never match.
pub fn classify(node: Node<'_>, config: &LanguageConfig, role: &str) -> bool {
    config.alias(role).is_some_and(|kind| node.kind() == kind)
}

/// Whether `node` plays any of `roles`.
pub fn classify_any(node: Node<'_>, config: &LanguageConfig, roles: &[&str]) -> bool {
    roles.iter().any(|role| classify(node, config, role))
}

/// The closed set of declaration roles a driver acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Module,
    Structure(StructureKind),
    Function,
    TestFunction,
}

/// A classified declaration node.
///
/// `node` is the declaration itself; `span` is the node whose text and line
/// range represent it (a decorated wrapper, for instance).
#[derive(Debug, Clone, Copy)]
pub struct Declaration<'tree> {
    pub role: Role,
    pub node: Node<'tree>,
    pub span: Node<'tree>,
}

impl<'tree> Declaration<'tree> {
    pub fn new(role: Role, node: Node<'tree>) -> Self {
        Self {
            role,
            node,
            span: node,
        }
    }

    pub fn with_span(mut self, span: Node<'tree>) -> Self {
        self.span = span;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{builtin, roles};
    use crate::syntax::named_children;
    use tree_sitter::Parser;

    #[test]
    fn test_classify_by_alias() {
        let config = builtin::python();
        let mut parser = Parser::new();
        parser.set_language(&config.grammar).unwrap();
        let tree = parser
            .parse("class A:\n    pass\n\ndef f():\n    pass\n", None)
            .unwrap();

        let items = named_children(tree.root_node());
        assert!(classify(items[0], &config, roles::CLASS_DEF));
        assert!(!classify(items[0], &config, roles::FUNC_DEF));
        assert!(classify(items[1], &config, roles::FUNC_DEF));
        assert!(classify_any(items[1], &config, &[roles::CLASS_DEF, roles::FUNC_DEF]));
        assert!(!classify(items[1], &config, "not_a_role"));
        // Roles the language does not alias never match.
        assert!(!classify(items[0], &config, roles::IMPL_BLOCK));
    }

    #[test]
    fn test_declaration_span() {
        let config = builtin::rust();
        let mut parser = Parser::new();
        parser.set_language(&config.grammar).unwrap();
        let tree = parser.parse("struct A;\nfn f() {}\n", None).unwrap();

        let items = named_children(tree.root_node());
        let decl = Declaration::new(Role::Structure(StructureKind::Struct), items[0]);
        assert_eq!(decl.span.id(), decl.node.id());

        let decl = decl.with_span(items[1]);
        assert_eq!(decl.span.kind(), "function_item");
        assert_eq!(decl.role, Role::Structure(StructureKind::Struct));
    }
}
