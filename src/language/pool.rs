//! Parser pool
//!
//! Lazily builds one parser and one compiled query set per language. Built
//! runtimes are cached. A failed build is remembered and reported once; it is
//! only attempted again after an explicit [`ParserPool::retry`].

use super::registry::LanguageConfig;
use super::LanguageId;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tree_sitter::{Parser, Query, Tree};

/// Compiled queries for one language.
pub struct CompiledQuerySet {
    language: LanguageId,
    queries: BTreeMap<String, Query>,
}

impl CompiledQuerySet {
    /// Compile every query template of a language.
    ///
    /// A template that fails to compile is left out and reported.
    pub fn compile(config: &LanguageConfig, diagnostics: &mut Diagnostics) -> Self {
        let mut queries = BTreeMap::new();

        for (name, source) in &config.query_templates {
            match Query::new(&config.grammar, source) {
                Ok(query) => {
                    queries.insert(name.clone(), query);
                }
                Err(e) => diagnostics.push(Diagnostic::QueryCompilation {
                    language: config.id.to_string(),
                    query: name.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        Self {
            language: config.id,
            queries,
        }
    }

    pub fn language(&self) -> LanguageId {
        self.language
    }

    /// Look up a compiled query by name.
    pub fn get(&self, name: &str) -> Option<&Query> {
        self.queries.get(name)
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

/// A ready-to-use parser plus compiled queries for one language.
pub struct LanguageRuntime {
    language: LanguageId,
    parser: Mutex<Parser>,
    queries: CompiledQuerySet,
}

impl LanguageRuntime {
    /// Build the parser and compile the queries for a language.
    pub fn build(config: &LanguageConfig, diagnostics: &mut Diagnostics) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&config.grammar)
            .map_err(|e| Error::Configuration {
                language: config.id.to_string(),
                message: format!("Failed to set language: {}", e),
            })?;

        Ok(Self {
            language: config.id,
            parser: Mutex::new(parser),
            queries: CompiledQuerySet::compile(config, diagnostics),
        })
    }

    pub fn language(&self) -> LanguageId {
        self.language
    }

    pub fn queries(&self) -> &CompiledQuerySet {
        &self.queries
    }

    /// Parse source bytes. `None` means the parser produced no tree.
    pub fn parse(&self, source: &[u8]) -> Result<Option<Tree>> {
        let mut parser = self
            .parser
            .lock()
            .map_err(|_| Error::Parse(format!("{} parser lock poisoned", self.language)))?;
        Ok(parser.parse(source, None))
    }
}

#[derive(Default)]
struct PoolState {
    runtimes: HashMap<LanguageId, Arc<LanguageRuntime>>,
    /// Languages whose build failed, with the reason
    failed: HashMap<LanguageId, String>,
}

/// Cache of language runtimes.
#[derive(Default)]
pub struct ParserPool {
    state: Mutex<PoolState>,
}

impl ParserPool {
    /// Return the cached runtime for a language, building it on first use.
    ///
    /// The state lock is held across the build, so concurrent callers observe
    /// a single initialization.
    pub fn get_or_init(
        &self,
        config: &LanguageConfig,
        diagnostics: &mut Diagnostics,
    ) -> Result<Arc<LanguageRuntime>> {
        self.get_or_build(config.id, diagnostics, |diagnostics| {
            LanguageRuntime::build(config, diagnostics)
        })
    }

    fn get_or_build<F>(
        &self,
        language: LanguageId,
        diagnostics: &mut Diagnostics,
        build: F,
    ) -> Result<Arc<LanguageRuntime>>
    where
        F: FnOnce(&mut Diagnostics) -> Result<LanguageRuntime>,
    {
        let mut state = self.state.lock().map_err(|_| Error::Configuration {
            language: language.to_string(),
            message: "parser pool lock poisoned".to_string(),
        })?;

        if let Some(runtime) = state.runtimes.get(&language) {
            return Ok(Arc::clone(runtime));
        }
        if let Some(reason) = state.failed.get(&language) {
            return Err(Error::Configuration {
                language: language.to_string(),
                message: format!("initialization failed earlier: {}", reason),
            });
        }

        match build(diagnostics) {
            Ok(runtime) => {
                let runtime = Arc::new(runtime);
                tracing::debug!(
                    "Initialized {} parser with {} queries",
                    language,
                    runtime.queries().len()
                );
                state.runtimes.insert(language, Arc::clone(&runtime));
                Ok(runtime)
            }
            Err(e) => {
                diagnostics.push(Diagnostic::LanguageUnavailable {
                    language: language.to_string(),
                    reason: e.to_string(),
                });
                state.failed.insert(language, e.to_string());
                Err(e)
            }
        }
    }

    /// Forget a failed build so the next request tries again.
    pub fn retry(&self, language: LanguageId) -> bool {
        self.state
            .lock()
            .map(|mut state| state.failed.remove(&language).is_some())
            .unwrap_or(false)
    }

    /// Number of initialized runtimes.
    pub fn initialized(&self) -> usize {
        self.state.lock().map(|s| s.runtimes.len()).unwrap_or(0)
    }
}
