//! Rust language driver
//!
//! Extracts structs, enums, traits, functions, and `#[test]` functions.
//! Inline `mod` blocks are walked with their contents qualified under the
//! module. Methods of an `impl` block are attached to a structure declared
//! alongside it; otherwise they are emitted as functions qualified under the
//! implemented type.

use super::framework::{FileContext, FileExtraction, LanguageStrategy};
use crate::ir::{FieldScope, FieldSpec, FunctionRecord, StructureKind, StructureRecord};
use crate::language::builtin::RUST_TEST_ATTRIBUTES;
use crate::language::{roles, LanguageId};
use crate::syntax::{children_by_field, line_range, named_children, Declaration, Role};
use std::collections::{HashMap, HashSet};
use tree_sitter::Node;

/// Methods of one impl block waiting to be attached to a local structure.
struct PendingImpl {
    type_name: String,
    trait_name: Option<String>,
    methods: Vec<FunctionRecord>,
}

/// Rust language strategy
#[derive(Debug, Default)]
pub struct RustStrategy;

impl RustStrategy {
    /// Create a new Rust strategy
    pub fn new() -> Self {
        Self
    }

    /// Node ids of attribute items selected by the test-attribute query.
    fn test_attribute_ids(&self, cx: &FileContext<'_>) -> HashSet<usize> {
        cx.parsed
            .run_query(RUST_TEST_ATTRIBUTES, cx.root())
            .into_iter()
            .filter(|hit| hit.capture == "attribute")
            .map(|hit| hit.node.id())
            .collect()
    }

    /// Whether a test attribute sits in the run of attributes and comments
    /// directly above `item`.
    fn has_test_attribute(&self, item: Node<'_>, cx: &FileContext<'_>, attrs: &HashSet<usize>) -> bool {
        let mut sibling = item.prev_named_sibling();
        while let Some(node) = sibling {
            if cx.is(node, roles::ATTRIBUTE) {
                if attrs.contains(&node.id()) {
                    return true;
                }
            } else if !cx.is_any(node, &[roles::LINE_COMMENT, roles::BLOCK_COMMENT]) {
                break;
            }
            sibling = node.prev_named_sibling();
        }
        false
    }

    fn classify<'t>(
        &self,
        node: Node<'t>,
        cx: &FileContext<'_>,
        attrs: &HashSet<usize>,
    ) -> Option<Declaration<'t>> {
        let role = if cx.is(node, roles::INLINE_MODULE) {
            Role::Module
        } else if cx.is(node, roles::STRUCT_DEF) {
            Role::Structure(StructureKind::Struct)
        } else if cx.is(node, roles::ENUM_DEF) {
            Role::Structure(StructureKind::Enum)
        } else if cx.is(node, roles::TRAIT_DEF) {
            Role::Structure(StructureKind::Trait)
        } else if cx.is(node, roles::FUNC_DEF) {
            if self.has_test_attribute(node, cx, attrs) {
                Role::TestFunction
            } else {
                Role::Function
            }
        } else {
            return None;
        };

        Some(Declaration::new(role, node))
    }

    /// Extract the items of a source file or inline module body.
    fn walk_items(
        &self,
        container: Node<'_>,
        parent: Option<&str>,
        cx: &FileContext<'_>,
        attrs: &HashSet<usize>,
        out: &mut FileExtraction,
    ) {
        let items = named_children(container);
        let local_types: HashSet<String> = items
            .iter()
            .filter(|n| cx.is_any(**n, &[roles::STRUCT_DEF, roles::ENUM_DEF, roles::TRAIT_DEF]))
            .filter_map(|n| cx.name_of(*n))
            .collect();
        let mut local_index: HashMap<String, usize> = HashMap::new();
        let mut pending = Vec::new();

        for item in items {
            if cx.is(item, roles::IMPL_BLOCK) {
                if let Some(block) = self.extract_impl(item, parent, cx, out) {
                    if local_types.contains(&block.type_name) {
                        pending.push(block);
                    } else {
                        out.functions.extend(block.methods);
                    }
                }
                continue;
            }

            let Some(decl) = self.classify(item, cx, attrs) else {
                continue;
            };
            let Some(name) = cx.name_of(decl.node) else {
                out.diagnostics.push(cx.unresolved(decl.span));
                continue;
            };
            let qualified_name = self.build_fqn_segment(&name, parent, cx);
            tracing::debug!("Extracting {:?} {}", decl.role, qualified_name);

            match decl.role {
                Role::Module => {
                    if let Some(body) = decl.node.child_by_field_name("body") {
                        self.walk_items(body, Some(&qualified_name), cx, attrs, out);
                    }
                }
                Role::Structure(kind) => {
                    let record = self.structure_record(&decl, kind, name.clone(), qualified_name, cx, out);
                    local_index.entry(name).or_insert(out.structures.len());
                    out.structures.push(record);
                }
                Role::Function => {
                    let record = self.function_record(&decl, name, qualified_name, cx);
                    out.functions.push(record);
                }
                Role::TestFunction => {
                    let record = self.test_record(&decl, name, qualified_name, cx);
                    out.tests.push(record);
                }
            }
        }

        for block in pending {
            if let Some(&index) = local_index.get(&block.type_name) {
                let structure = &mut out.structures[index];
                structure.base_type_names.extend(block.trait_name);
                structure.nested_methods.extend(block.methods);
            }
        }
    }

    /// Collect the methods of an impl block, qualified under its type.
    fn extract_impl(
        &self,
        item: Node<'_>,
        parent: Option<&str>,
        cx: &FileContext<'_>,
        out: &mut FileExtraction,
    ) -> Option<PendingImpl> {
        let Some(type_node) = item.child_by_field_name("type") else {
            out.diagnostics.push(cx.unresolved(item));
            return None;
        };
        let type_name = base_type_name(&cx.text(type_node));
        let trait_name = item.child_by_field_name("trait").map(|t| cx.text(t));
        let owner = self.build_fqn_segment(&type_name, parent, cx);

        let methods = self.member_functions(item, &owner, &[roles::FUNC_DEF], cx, out);
        Some(PendingImpl {
            type_name,
            trait_name,
            methods,
        })
    }

    /// Function-like members of an item's body, qualified under `owner`.
    fn member_functions(
        &self,
        item: Node<'_>,
        owner: &str,
        member_roles: &[&str],
        cx: &FileContext<'_>,
        out: &mut FileExtraction,
    ) -> Vec<FunctionRecord> {
        let mut methods = Vec::new();
        let body = item.child_by_field_name("body");

        for member in body.map(named_children).unwrap_or_default() {
            if !cx.is_any(member, member_roles) {
                continue;
            }
            let Some(name) = cx.name_of(member) else {
                out.diagnostics.push(cx.unresolved(member));
                continue;
            };
            let qualified_name = self.build_fqn_segment(&name, Some(owner), cx);
            let decl = Declaration::new(Role::Function, member);
            methods.push(self.function_record(&decl, name, qualified_name, cx));
        }

        methods
    }

    fn structure_record(
        &self,
        decl: &Declaration<'_>,
        kind: StructureKind,
        name: String,
        qualified_name: String,
        cx: &FileContext<'_>,
        out: &mut FileExtraction,
    ) -> StructureRecord {
        let (line_start, line_end) = line_range(decl.span);
        let node = decl.node;

        let (fields, nested_methods, base_type_names) = match kind {
            StructureKind::Enum => (self.variants(node, cx), Vec::new(), Vec::new()),
            StructureKind::Trait => (
                Vec::new(),
                self.member_functions(
                    node,
                    &qualified_name,
                    &[roles::FUNC_DEF, roles::FUNC_SIGNATURE],
                    cx,
                    out,
                ),
                self.supertraits(node, cx),
            ),
            _ => (self.struct_fields(node, cx), Vec::new(), Vec::new()),
        };

        StructureRecord {
            name,
            qualified_name,
            kind,
            source_file: cx.source_file.to_string(),
            line_start,
            line_end,
            docstring: self.extract_docstring(node, cx),
            raw_text: cx.text(decl.span),
            language: LanguageId::Rust,
            base_type_names,
            fields,
            nested_methods,
        }
    }

    /// Named fields, or positional fields named by index.
    fn struct_fields(&self, item: Node<'_>, cx: &FileContext<'_>) -> Vec<FieldSpec> {
        let Some(body) = item.child_by_field_name("body") else {
            return Vec::new();
        };

        if cx.is(body, roles::FIELD_LIST) {
            named_children(body)
                .into_iter()
                .filter(|n| cx.is(*n, roles::FIELD))
                .filter_map(|field| {
                    Some(FieldSpec {
                        name: cx.name_of(field)?,
                        declared_type: field.child_by_field_name("type").map(|t| cx.text(t)),
                        scope: FieldScope::Instance,
                    })
                })
                .collect()
        } else if cx.is(body, roles::TUPLE_FIELD_LIST) {
            children_by_field(body, "type")
                .into_iter()
                .enumerate()
                .map(|(index, ty)| FieldSpec {
                    name: index.to_string(),
                    declared_type: Some(cx.text(ty)),
                    scope: FieldScope::Instance,
                })
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Enum variants, with their payload as the declared type.
    fn variants(&self, item: Node<'_>, cx: &FileContext<'_>) -> Vec<FieldSpec> {
        item.child_by_field_name("body")
            .map(named_children)
            .unwrap_or_default()
            .into_iter()
            .filter(|n| cx.is(*n, roles::VARIANT))
            .filter_map(|variant| {
                Some(FieldSpec {
                    name: cx.name_of(variant)?,
                    declared_type: variant.child_by_field_name("body").map(|b| cx.text(b)),
                    scope: FieldScope::Variant,
                })
            })
            .collect()
    }

    /// Supertrait bounds, `trait A: B + C`.
    fn supertraits(&self, item: Node<'_>, cx: &FileContext<'_>) -> Vec<String> {
        item.child_by_field_name("bounds")
            .map(named_children)
            .unwrap_or_default()
            .into_iter()
            .map(|bound| cx.text(bound))
            .collect()
    }
}

/// The bare type name an impl targets: `&'a mut crate::net::Conn<T>` is
/// `Conn`.
fn base_type_name(type_text: &str) -> String {
    let without_generics = type_text.split('<').next().unwrap_or(type_text);
    let last_path = without_generics.rsplit("::").next().unwrap_or(without_generics);
    last_path
        .split_whitespace()
        .last()
        .unwrap_or(last_path)
        .trim_start_matches('&')
        .to_string()
}

impl LanguageStrategy for RustStrategy {
    fn language(&self) -> LanguageId {
        LanguageId::Rust
    }

    /// Raw identifiers qualify without their `r#` prefix.
    fn build_fqn_segment(&self, name: &str, parent: Option<&str>, cx: &FileContext<'_>) -> String {
        let name = name.strip_prefix("r#").unwrap_or(name);
        cx.fqn.qualify(name, parent).value
    }

    fn extract_file(&self, cx: &FileContext<'_>) -> FileExtraction {
        let mut out = FileExtraction::new();
        let attrs = self.test_attribute_ids(cx);
        self.walk_items(cx.root(), None, cx, &attrs, &mut out);
        out
    }
}
