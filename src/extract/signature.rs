//! Signature extraction
//!
//! Parameters are read by dispatching on each parameter node's concrete
//! shape, as declared in the language's configuration. Defaults and types
//! are kept verbatim; nothing is inferred.

use crate::language::{roles, LanguageConfig};
use crate::syntax::{children, classify, named_children, text_of};
use serde::{Deserialize, Serialize};
use tree_sitter::Node;

/// Kind of a formal parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Positional,
    KeywordWithDefault,
    VariadicPositional,
    VariadicKeyword,
    KeywordOnlyMarker,
    PositionalOnlyMarker,
    Receiver,
}

impl ParamKind {
    /// Markers separate parameter groups and carry no name.
    pub fn is_marker(&self) -> bool {
        matches!(self, ParamKind::KeywordOnlyMarker | ParamKind::PositionalOnlyMarker)
    }
}

/// Concrete parameter node shapes a grammar may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamShape {
    BareName,
    Typed,
    Defaulted,
    TypedDefaulted,
    ListSplat,
    DictSplat,
    Receiver,
    KeywordOnlyMarker,
    PositionalOnlyMarker,
    Variadic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
    #[serde(rename = "default_value_text", default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub kind: ParamKind,
}

impl ParameterSpec {
    fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            declared_type: None,
            default_value: None,
            kind,
        }
    }

    fn typed(mut self, declared_type: Option<String>) -> Self {
        self.declared_type = declared_type.filter(|t| !t.is_empty());
        self
    }

    fn defaulted(mut self, default_value: Option<String>) -> Self {
        self.default_value = default_value;
        self
    }

    /// Render as it would appear in a parameter list.
    pub fn render(&self) -> String {
        match self.kind {
            ParamKind::KeywordOnlyMarker => return "*".to_string(),
            ParamKind::PositionalOnlyMarker => return "/".to_string(),
            ParamKind::Receiver => {
                return self.declared_type.clone().unwrap_or_else(|| self.name.clone());
            }
            _ => {}
        }

        let prefix = match self.kind {
            ParamKind::VariadicPositional => "*",
            ParamKind::VariadicKeyword => "**",
            _ => "",
        };
        let mut out = format!("{}{}", prefix, self.name);
        if let Some(declared_type) = &self.declared_type {
            out.push_str(": ");
            out.push_str(declared_type);
        }
        if let Some(default_value) = &self.default_value {
            out.push_str(" = ");
            out.push_str(default_value);
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub parameters: Vec<ParameterSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(rename = "is_asynchronous")]
    pub is_async: bool,
    pub is_unsafe: bool,
}

impl Signature {
    /// Parameters that carry a name (group markers excluded).
    pub fn named_parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.parameters.iter().filter(|p| !p.kind.is_marker())
    }

    /// Render as `(params) -> return`.
    pub fn render(&self) -> String {
        let params: Vec<String> = self.parameters.iter().map(ParameterSpec::render).collect();
        match &self.return_type {
            Some(ret) => format!("({}) -> {}", params.join(", "), ret),
            None => format!("({})", params.join(", ")),
        }
    }
}

/// Extract the signature of a function-like declaration.
pub fn extract(decl: Node<'_>, source: &[u8], config: &LanguageConfig) -> Signature {
    Signature {
        parameters: decl
            .child_by_field_name("parameters")
            .map(|params| extract_parameters(params, source, config))
            .unwrap_or_default(),
        return_type: decl
            .child_by_field_name("return_type")
            .map(|ret| text_of(ret, source))
            .filter(|ret| !ret.is_empty()),
        is_async: has_modifier(decl, "async", config),
        is_unsafe: has_modifier(decl, "unsafe", config),
    }
}

/// Parameters of a parameter-list node, in source order.
///
/// Children whose type has no configured shape (punctuation, attributes)
/// are skipped.
pub fn extract_parameters(params: Node<'_>, source: &[u8], config: &LanguageConfig) -> Vec<ParameterSpec> {
    children(params)
        .into_iter()
        .filter_map(|child| parameter(child, source, config))
        .collect()
}

fn parameter(node: Node<'_>, source: &[u8], config: &LanguageConfig) -> Option<ParameterSpec> {
    let shape = config.parameter_shape(node.kind())?;
    let text = |n: Node<'_>| text_of(n, source);
    let field_text = |field: &str| node.child_by_field_name(field).map(text);

    let spec = match shape {
        ParamShape::BareName => ParameterSpec::new(text(node), ParamKind::Positional),
        ParamShape::Typed => {
            let target = node
                .child_by_field_name("name")
                .or_else(|| node.child_by_field_name("pattern"))
                .or_else(|| named_children(node).into_iter().next())?;
            let declared_type = field_text("type");

            // `*args: int` nests a splat inside the typed parameter
            match config.parameter_shape(target.kind()) {
                Some(ParamShape::ListSplat | ParamShape::DictSplat) => {
                    parameter(target, source, config)?.typed(declared_type)
                }
                _ => ParameterSpec::new(text(target), ParamKind::Positional).typed(declared_type),
            }
        }
        ParamShape::Defaulted => ParameterSpec::new(field_text("name")?, ParamKind::KeywordWithDefault)
            .defaulted(field_text("value")),
        ParamShape::TypedDefaulted => {
            ParameterSpec::new(field_text("name")?, ParamKind::KeywordWithDefault)
                .typed(field_text("type"))
                .defaulted(field_text("value"))
        }
        ParamShape::ListSplat => {
            ParameterSpec::new(splat_name(node, source, "args"), ParamKind::VariadicPositional)
        }
        ParamShape::DictSplat => {
            ParameterSpec::new(splat_name(node, source, "kwargs"), ParamKind::VariadicKeyword)
        }
        ParamShape::Receiver => {
            ParameterSpec::new("self", ParamKind::Receiver).typed(Some(text(node)))
        }
        ParamShape::KeywordOnlyMarker => ParameterSpec::new("", ParamKind::KeywordOnlyMarker),
        ParamShape::PositionalOnlyMarker => ParameterSpec::new("", ParamKind::PositionalOnlyMarker),
        ParamShape::Variadic => ParameterSpec::new(
            field_text("pattern").unwrap_or_else(|| "args".to_string()),
            ParamKind::VariadicPositional,
        ),
    };

    Some(spec)
}

fn splat_name(node: Node<'_>, source: &[u8], fallback: &str) -> String {
    named_children(node)
        .into_iter()
        .find(|n| n.kind() == "identifier")
        .map(|n| text_of(n, source))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Whether a declaration carries a modifier keyword such as `async`.
///
/// A grammar field of that name wins; otherwise the tokens before the
/// declaration's name are inspected, looking inside a modifiers wrapper.
pub fn has_modifier(decl: Node<'_>, marker: &str, config: &LanguageConfig) -> bool {
    if decl.child_by_field_name(marker).is_some() {
        return true;
    }

    let name_id = decl.child_by_field_name("name").map(|n| n.id());
    for child in children(decl) {
        if Some(child.id()) == name_id {
            break;
        }
        if child.kind() == marker {
            return true;
        }
        if classify(child, config, roles::MODIFIERS)
            && children(child).iter().any(|c| c.kind() == marker)
        {
            return true;
        }
    }
    false
}
