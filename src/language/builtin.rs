//! Built-in language configurations

use super::registry::LanguageConfig;
use super::{roles, LanguageId};
use crate::extract::docstring::{CommentMarkers, DocstringPolicy};
use crate::extract::fqn::NamespaceStyle;
use crate::extract::signature::ParamShape;
use crate::Result;
use std::collections::{BTreeMap, HashMap};

/// Name of the Python query selecting test functions by name.
pub const PYTHON_TEST_FUNCS: &str = "test_funcs";
/// Name of the Rust query selecting `#[test]`-style attributes.
pub const RUST_TEST_ATTRIBUTES: &str = "test_attributes";

/// Build the configuration for a built-in language, applying query overrides.
pub fn load(id: LanguageId, overrides: Option<&BTreeMap<String, String>>) -> Result<LanguageConfig> {
    let config = match id {
        LanguageId::Python => python(),
        LanguageId::Rust => rust(),
    };
    Ok(config.with_query_overrides(overrides))
}

fn aliases(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(role, kind)| (role.to_string(), kind.to_string()))
        .collect()
}

fn shapes(pairs: &[(&str, ParamShape)]) -> HashMap<String, ParamShape> {
    pairs
        .iter()
        .map(|(kind, shape)| (kind.to_string(), *shape))
        .collect()
}

/// Python: dot namespaces, leading-block-string docstrings.
pub fn python() -> LanguageConfig {
    let mut query_templates = BTreeMap::new();
    query_templates.insert(
        PYTHON_TEST_FUNCS.to_string(),
        include_str!("../../queries/python/test_funcs.scm").to_string(),
    );

    LanguageConfig {
        id: LanguageId::Python,
        grammar: tree_sitter_python::LANGUAGE.into(),
        role_aliases: aliases(&[
            (roles::MODULE, "module"),
            (roles::CLASS_DEF, "class_definition"),
            (roles::FUNC_DEF, "function_definition"),
            (roles::DECORATED_DEF, "decorated_definition"),
            (roles::BLOCK, "block"),
            (roles::EXPRESSION_STATEMENT, "expression_statement"),
            (roles::STRING, "string"),
            (roles::CONCATENATED_STRING, "concatenated_string"),
            (roles::ASSIGNMENT, "assignment"),
            (roles::COMMENT, "comment"),
            (roles::IDENTIFIER, "identifier"),
            (roles::MEMBER_ACCESS, "attribute"),
            (roles::KEYWORD_ARGUMENT, "keyword_argument"),
        ]),
        query_templates,
        namespace: NamespaceStyle::python(),
        parameter_shapes: shapes(&[
            ("identifier", ParamShape::BareName),
            ("typed_parameter", ParamShape::Typed),
            ("default_parameter", ParamShape::Defaulted),
            ("typed_default_parameter", ParamShape::TypedDefaulted),
            ("list_splat_pattern", ParamShape::ListSplat),
            ("dictionary_splat_pattern", ParamShape::DictSplat),
            ("keyword_separator", ParamShape::KeywordOnlyMarker),
            ("*", ParamShape::KeywordOnlyMarker),
            ("positional_separator", ParamShape::PositionalOnlyMarker),
            ("/", ParamShape::PositionalOnlyMarker),
        ]),
        docstring_policy: DocstringPolicy::LeadingBlockString,
    }
}

/// Rust: colon namespaces, adjacent doc-comment runs.
pub fn rust() -> LanguageConfig {
    let mut query_templates = BTreeMap::new();
    query_templates.insert(
        RUST_TEST_ATTRIBUTES.to_string(),
        include_str!("../../queries/rust/test_attributes.scm").to_string(),
    );

    LanguageConfig {
        id: LanguageId::Rust,
        grammar: tree_sitter_rust::LANGUAGE.into(),
        role_aliases: aliases(&[
            (roles::MODULE, "source_file"),
            (roles::INLINE_MODULE, "mod_item"),
            (roles::STRUCT_DEF, "struct_item"),
            (roles::ENUM_DEF, "enum_item"),
            (roles::TRAIT_DEF, "trait_item"),
            (roles::IMPL_BLOCK, "impl_item"),
            (roles::FUNC_DEF, "function_item"),
            (roles::FUNC_SIGNATURE, "function_signature_item"),
            (roles::LINE_COMMENT, "line_comment"),
            (roles::BLOCK_COMMENT, "block_comment"),
            (roles::ATTRIBUTE, "attribute_item"),
            (roles::INNER_ATTRIBUTE, "inner_attribute_item"),
            (roles::FIELD_LIST, "field_declaration_list"),
            (roles::TUPLE_FIELD_LIST, "ordered_field_declaration_list"),
            (roles::FIELD, "field_declaration"),
            (roles::VARIANT_LIST, "enum_variant_list"),
            (roles::VARIANT, "enum_variant"),
            (roles::MODIFIERS, "function_modifiers"),
        ]),
        query_templates,
        namespace: NamespaceStyle::rust(),
        parameter_shapes: shapes(&[
            ("self_parameter", ParamShape::Receiver),
            ("parameter", ParamShape::Typed),
            ("variadic_parameter", ParamShape::Variadic),
        ]),
        docstring_policy: DocstringPolicy::AdjacentCommentRun(CommentMarkers::rust()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_configs_validate() {
        for &id in LanguageId::all() {
            let config = load(id, None).unwrap();
            assert_eq!(config.id, id);
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_overrides_replace_templates() {
        let mut overrides = BTreeMap::new();
        overrides.insert(PYTHON_TEST_FUNCS.to_string(), "(identifier) @name".to_string());

        let config = load(LanguageId::Python, Some(&overrides)).unwrap();
        assert_eq!(config.query_templates[PYTHON_TEST_FUNCS], "(identifier) @name");
    }
}
