//! Language registry
//!
//! Holds one immutable [`LanguageConfig`] per loaded language and hands out
//! lazily-initialized parser runtimes from the [`ParserPool`].

use super::pool::{LanguageRuntime, ParserPool};
use super::{builtin, LanguageId};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::extract::docstring::DocstringPolicy;
use crate::extract::fqn::NamespaceStyle;
use crate::extract::signature::ParamShape;
use crate::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tree_sitter::Language;

/// Query template overrides, keyed by language and then by query name.
pub type QueryOverrides = BTreeMap<LanguageId, BTreeMap<String, String>>;

/// Everything the engine knows about one language.
///
/// Built once at startup and never mutated afterwards.
pub struct LanguageConfig {
    pub id: LanguageId,
    pub grammar: Language,
    /// Abstract role name to concrete node type
    pub role_aliases: HashMap<String, String>,
    /// Query name to query source
    pub query_templates: BTreeMap<String, String>,
    pub namespace: NamespaceStyle,
    /// Concrete parameter node type to parameter shape
    pub parameter_shapes: HashMap<String, ParamShape>,
    pub docstring_policy: DocstringPolicy,
}

impl LanguageConfig {
    /// Concrete node type for an abstract role, if the language has one.
    pub fn alias(&self, role: &str) -> Option<&str> {
        self.role_aliases.get(role).map(String::as_str)
    }

    /// Shape of a concrete parameter node type.
    pub fn parameter_shape(&self, kind: &str) -> Option<ParamShape> {
        self.parameter_shapes.get(kind).copied()
    }

    /// Replace or add query templates.
    pub fn with_query_overrides(mut self, overrides: Option<&BTreeMap<String, String>>) -> Self {
        if let Some(overrides) = overrides {
            for (name, source) in overrides {
                self.query_templates.insert(name.clone(), source.clone());
            }
        }
        self
    }

    /// Check that every role alias names a node type the grammar knows.
    pub fn validate(&self) -> Result<()> {
        for (role, kind) in &self.role_aliases {
            if self.grammar.id_for_node_kind(kind, true) == 0 {
                return Err(Error::Configuration {
                    language: self.id.to_string(),
                    message: format!("role '{}' maps to unknown node type '{}'", role, kind),
                });
            }
        }
        Ok(())
    }
}

/// Registry of loaded languages.
///
/// An explicit value owned by the pipeline; `Send + Sync` because the pool
/// guards its map and each parser behind a mutex.
pub struct LanguageRegistry {
    configs: BTreeMap<LanguageId, LanguageConfig>,
    pool: ParserPool,
}

impl LanguageRegistry {
    /// Populate the registry from configuration entries.
    ///
    /// A failing entry is skipped with a diagnostic. Loading nothing at all is
    /// fatal.
    pub fn load_all<I>(entries: I, diagnostics: &mut Diagnostics) -> Result<Self>
    where
        I: IntoIterator<Item = (LanguageId, Result<LanguageConfig>)>,
    {
        let mut configs = BTreeMap::new();

        for (id, entry) in entries {
            match entry.and_then(|config| config.validate().map(|_| config)) {
                Ok(config) => {
                    tracing::debug!(
                        "Loaded language {} ({} queries)",
                        id,
                        config.query_templates.len()
                    );
                    configs.insert(id, config);
                }
                Err(e) => diagnostics.push(Diagnostic::LanguageUnavailable {
                    language: id.to_string(),
                    reason: e.to_string(),
                }),
            }
        }

        if configs.is_empty() {
            return Err(Error::NoLanguages);
        }

        Ok(Self {
            configs,
            pool: ParserPool::default(),
        })
    }

    /// Load the built-in configurations for the requested languages.
    pub fn builtin(
        languages: &[LanguageId],
        overrides: &QueryOverrides,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let entries = languages
            .iter()
            .map(|&id| (id, builtin::load(id, overrides.get(&id))));
        Self::load_all(entries, diagnostics)
    }

    /// Look up a loaded language's configuration.
    pub fn config(&self, id: LanguageId) -> Option<&LanguageConfig> {
        self.configs.get(&id)
    }

    /// Loaded languages, in stable order.
    pub fn languages(&self) -> impl Iterator<Item = LanguageId> + '_ {
        self.configs.keys().copied()
    }

    /// Get the parser runtime for a language, building it on first use.
    pub fn get_or_init(
        &self,
        id: LanguageId,
        diagnostics: &mut Diagnostics,
    ) -> Result<Arc<LanguageRuntime>> {
        let config = self.config(id).ok_or_else(|| Error::Configuration {
            language: id.to_string(),
            message: "language is not loaded".to_string(),
        })?;

        self.pool.get_or_init(config, diagnostics)
    }

    /// Allow a language whose runtime failed to build to be built again.
    pub fn retry(&self, id: LanguageId) -> bool {
        self.pool.retry(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_registry_is_send_sync() {
        assert_send_sync::<LanguageRegistry>();
        assert_send_sync::<Arc<LanguageRuntime>>();
    }

    fn overrides(language: LanguageId, name: &str, source: &str) -> QueryOverrides {
        let mut queries = BTreeMap::new();
        queries.insert(name.to_string(), source.to_string());
        let mut overrides = QueryOverrides::new();
        overrides.insert(language, queries);
        overrides
    }

    #[test]
    fn test_builtin_registry_loads_all_languages() {
        let mut diagnostics = Diagnostics::new();
        let registry =
            LanguageRegistry::builtin(LanguageId::all(), &QueryOverrides::new(), &mut diagnostics)
                .unwrap();

        let loaded: Vec<_> = registry.languages().collect();
        assert_eq!(loaded, vec![LanguageId::Python, LanguageId::Rust]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_bad_alias_skips_language() {
        let mut diagnostics = Diagnostics::new();
        let mut broken = builtin::load(LanguageId::Rust, None).unwrap();
        broken
            .role_aliases
            .insert("func_def".to_string(), "no_such_node_type".to_string());

        let registry = LanguageRegistry::load_all(
            vec![
                (LanguageId::Python, builtin::load(LanguageId::Python, None)),
                (LanguageId::Rust, Ok(broken)),
            ],
            &mut diagnostics,
        )
        .unwrap();

        assert!(registry.config(LanguageId::Python).is_some());
        assert!(registry.config(LanguageId::Rust).is_none());
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            diagnostics.iter().next(),
            Some(Diagnostic::LanguageUnavailable { .. })
        ));
    }

    #[test]
    fn test_zero_languages_is_fatal() {
        let mut diagnostics = Diagnostics::new();
        let entries = vec![(
            LanguageId::Python,
            Err(Error::Configuration {
                language: "python".to_string(),
                message: "grammar missing".to_string(),
            }),
        )];

        let result = LanguageRegistry::load_all(entries, &mut diagnostics);
        assert!(matches!(result, Err(Error::NoLanguages)));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_get_or_init_is_cached() {
        let mut diagnostics = Diagnostics::new();
        let registry =
            LanguageRegistry::builtin(&[LanguageId::Python], &QueryOverrides::new(), &mut diagnostics)
                .unwrap();

        let first = registry.get_or_init(LanguageId::Python, &mut diagnostics).unwrap();
        let second = registry.get_or_init(LanguageId::Python, &mut diagnostics).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(registry.get_or_init(LanguageId::Rust, &mut diagnostics).is_err());
    }

    #[test]
    fn test_query_override_failure_is_not_fatal() {
        let mut diagnostics = Diagnostics::new();
        let overrides = overrides(LanguageId::Python, "test_funcs", "(function_definition");
        let registry =
            LanguageRegistry::builtin(&[LanguageId::Python], &overrides, &mut diagnostics).unwrap();

        let runtime = registry.get_or_init(LanguageId::Python, &mut diagnostics).unwrap();
        assert!(runtime.queries().get("test_funcs").is_none());
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            diagnostics.iter().next(),
            Some(Diagnostic::QueryCompilation { .. })
        ));
    }

    #[test]
    fn test_query_override_adds_query() {
        let mut diagnostics = Diagnostics::new();
        let overrides = overrides(
            LanguageId::Rust,
            "structs",
            "(struct_item name: (type_identifier) @name) @struct",
        );
        let registry =
            LanguageRegistry::builtin(&[LanguageId::Rust], &overrides, &mut diagnostics).unwrap();

        let runtime = registry.get_or_init(LanguageId::Rust, &mut diagnostics).unwrap();
        assert!(runtime.queries().get("structs").is_some());
        assert!(runtime.queries().get("test_attributes").is_some());
        assert!(diagnostics.is_empty());
    }
}
