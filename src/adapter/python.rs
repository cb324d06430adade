//! Python language driver
//!
//! Extracts classes, functions, and test functions from Python modules.
//! Decorated definitions are unwrapped; class bodies contribute methods,
//! class-level fields, `self.x` fields assigned in `__init__`, and nested
//! classes.

use super::framework::{FileContext, FileExtraction, LanguageStrategy};
use crate::ir::{FieldScope, FieldSpec, StructureKind, StructureRecord};
use crate::language::builtin::PYTHON_TEST_FUNCS;
use crate::language::{roles, LanguageId};
use crate::syntax::{line_range, named_children, Declaration, Role};
use std::collections::HashSet;
use tree_sitter::Node;

/// Python language strategy
#[derive(Debug, Default)]
pub struct PythonStrategy;

impl PythonStrategy {
    /// Create a new Python strategy
    pub fn new() -> Self {
        Self
    }

    /// Node ids of function definitions selected by the test query.
    fn test_function_ids(&self, cx: &FileContext<'_>) -> HashSet<usize> {
        cx.parsed
            .run_query(PYTHON_TEST_FUNCS, cx.root())
            .into_iter()
            .filter(|hit| hit.capture == "function")
            .map(|hit| hit.node.id())
            .collect()
    }

    /// Split a possibly-decorated statement into (definition, span).
    fn unwrap_decorated<'t>(&self, node: Node<'t>, cx: &FileContext<'_>) -> Option<(Node<'t>, Node<'t>)> {
        if cx.is(node, roles::DECORATED_DEF) {
            Some((node.child_by_field_name("definition")?, node))
        } else {
            Some((node, node))
        }
    }

    /// Classify a module-level statement.
    fn classify<'t>(
        &self,
        node: Node<'t>,
        cx: &FileContext<'_>,
        test_ids: &HashSet<usize>,
    ) -> Option<Declaration<'t>> {
        let (inner, span) = self.unwrap_decorated(node, cx)?;

        let role = if cx.is(inner, roles::CLASS_DEF) {
            Role::Structure(StructureKind::Class)
        } else if cx.is(inner, roles::FUNC_DEF) {
            if cx.is_test_file || test_ids.contains(&inner.id()) {
                Role::TestFunction
            } else {
                Role::Function
            }
        } else {
            return None;
        };

        Some(Declaration::new(role, inner).with_span(span))
    }

    fn extract_declaration(
        &self,
        decl: Declaration<'_>,
        parent: Option<&str>,
        cx: &FileContext<'_>,
        out: &mut FileExtraction,
    ) {
        let Some(name) = cx.name_of(decl.node) else {
            out.diagnostics.push(cx.unresolved(decl.span));
            return;
        };
        let qualified_name = self.build_fqn_segment(&name, parent, cx);
        tracing::debug!("Extracting {:?} {}", decl.role, qualified_name);

        match decl.role {
            Role::Structure(kind) => self.extract_class(decl, kind, name, qualified_name, cx, out),
            Role::Function => {
                let record = self.function_record(&decl, name, qualified_name, cx);
                out.functions.push(record);
            }
            Role::TestFunction => {
                let record = self.test_record(&decl, name, qualified_name, cx);
                out.tests.push(record);
            }
            Role::Module => {}
        }
    }

    fn extract_class(
        &self,
        decl: Declaration<'_>,
        kind: StructureKind,
        name: String,
        qualified_name: String,
        cx: &FileContext<'_>,
        out: &mut FileExtraction,
    ) {
        let (line_start, line_end) = line_range(decl.span);
        let mut record = StructureRecord {
            name,
            qualified_name,
            kind,
            source_file: cx.source_file.to_string(),
            line_start,
            line_end,
            docstring: self.extract_docstring(decl.node, cx),
            raw_text: cx.text(decl.span),
            language: LanguageId::Python,
            base_type_names: self.base_types(decl.node, cx),
            fields: Vec::new(),
            nested_methods: Vec::new(),
        };

        let mut nested = Vec::new();
        let body = decl.node.child_by_field_name("body");

        for child in body.map(named_children).unwrap_or_default() {
            let Some((inner, span)) = self.unwrap_decorated(child, cx) else {
                continue;
            };

            if cx.is(inner, roles::FUNC_DEF) {
                let method = Declaration::new(Role::Function, inner).with_span(span);
                let Some(method_name) = cx.name_of(inner) else {
                    out.diagnostics.push(cx.unresolved(span));
                    continue;
                };
                if method_name == "__init__" {
                    self.instance_fields(inner, cx, &mut record.fields);
                }
                let method_fqn = self.build_fqn_segment(&method_name, Some(&record.qualified_name), cx);
                record
                    .nested_methods
                    .push(self.function_record(&method, method_name, method_fqn, cx));
            } else if cx.is(inner, roles::CLASS_DEF) {
                nested.push(Declaration::new(Role::Structure(StructureKind::Class), inner).with_span(span));
            } else if cx.is(child, roles::EXPRESSION_STATEMENT) {
                if let Some(field) = self.class_field(child, cx) {
                    record.fields.push(field);
                }
            }
        }

        let parent = record.qualified_name.clone();
        out.structures.push(record);
        for decl in nested {
            self.extract_declaration(decl, Some(&parent), cx, out);
        }
    }

    /// Base classes from the superclass list; keyword arguments such as
    /// `metaclass=` are not bases.
    fn base_types(&self, class: Node<'_>, cx: &FileContext<'_>) -> Vec<String> {
        class
            .child_by_field_name("superclasses")
            .map(named_children)
            .unwrap_or_default()
            .into_iter()
            .filter(|n| !cx.is_any(*n, &[roles::COMMENT, roles::KEYWORD_ARGUMENT]))
            .map(|n| cx.text(n))
            .collect()
    }

    /// `name = value` or `name: T = value` directly in a class body.
    fn class_field(&self, statement: Node<'_>, cx: &FileContext<'_>) -> Option<FieldSpec> {
        let assignment = named_children(statement)
            .into_iter()
            .find(|n| cx.is(*n, roles::ASSIGNMENT))?;
        let left = assignment.child_by_field_name("left")?;
        if !cx.is(left, roles::IDENTIFIER) {
            return None;
        }

        Some(FieldSpec {
            name: cx.text(left),
            declared_type: assignment.child_by_field_name("type").map(|t| cx.text(t)),
            scope: FieldScope::Class,
        })
    }

    /// `self.x = ...` assignments anywhere in `__init__`, first occurrence
    /// of each name only. Nested functions and classes are not searched.
    fn instance_fields(&self, init: Node<'_>, cx: &FileContext<'_>, fields: &mut Vec<FieldSpec>) {
        let Some(body) = init.child_by_field_name("body") else {
            return;
        };

        let mut stack = vec![body];
        let mut found = Vec::new();
        while let Some(node) = stack.pop() {
            if cx.is(node, roles::ASSIGNMENT) {
                if let Some(field) = self.self_assignment(node, cx) {
                    found.push((node.start_byte(), field));
                }
            }
            for child in named_children(node) {
                if !cx.is_any(child, &[roles::FUNC_DEF, roles::CLASS_DEF]) {
                    stack.push(child);
                }
            }
        }

        found.sort_by_key(|(offset, _)| *offset);
        for (_, field) in found {
            let seen = fields
                .iter()
                .any(|f| f.scope == FieldScope::Instance && f.name == field.name);
            if !seen {
                fields.push(field);
            }
        }
    }

    fn self_assignment(&self, assignment: Node<'_>, cx: &FileContext<'_>) -> Option<FieldSpec> {
        let left = assignment.child_by_field_name("left")?;
        if !cx.is(left, roles::MEMBER_ACCESS) {
            return None;
        }
        let object = left.child_by_field_name("object")?;
        if cx.text(object) != "self" {
            return None;
        }
        let attribute = left.child_by_field_name("attribute")?;

        Some(FieldSpec {
            name: cx.text(attribute),
            declared_type: assignment.child_by_field_name("type").map(|t| cx.text(t)),
            scope: FieldScope::Instance,
        })
    }
}

impl LanguageStrategy for PythonStrategy {
    fn language(&self) -> LanguageId {
        LanguageId::Python
    }

    fn extract_file(&self, cx: &FileContext<'_>) -> FileExtraction {
        let mut out = FileExtraction::new();
        let test_ids = self.test_function_ids(cx);

        for child in named_children(cx.root()) {
            if let Some(decl) = self.classify(child, cx, &test_ids) {
                self.extract_declaration(decl, None, cx, &mut out);
            }
        }

        out
    }
}
