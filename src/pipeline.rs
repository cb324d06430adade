//! Extraction pipeline
//!
//! Drives one file at a time through parse, driver extraction, and
//! aggregation. Every per-file failure is caught here and turned into
//! exactly one diagnostic; the run always moves on to the next file.

use crate::adapter::{default_strategies, FileContext, FileExtraction, StrategyRegistry};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::extract::{FqnBuilder, ModulePath};
use crate::ir::{ComponentStore, RepositoryIr, SCHEMA_VERSION};
use crate::language::{LanguageId, LanguageRegistry, QueryOverrides};
use crate::metadata::ProjectMetadata;
use crate::syntax::{self, ParseOptions};
use crate::walk::DiscoveredFile;
use crate::{Error, Result};
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Outermost FQN prefix
    pub target_name: String,
    pub skip_malformed: bool,
}

impl PipelineOptions {
    pub fn new(target_name: &str) -> Self {
        Self {
            target_name: target_name.to_string(),
            skip_malformed: true,
        }
    }
}

/// Per-run counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub files_seen: usize,
    pub files_extracted: usize,
    pub files_failed: usize,
    pub declarations: usize,
}

/// One file's worth of input.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Forward-slash path relative to the analysis root
    pub relative_path: String,
    pub bytes: Vec<u8>,
    pub language: LanguageId,
    pub is_test_file: bool,
}

/// Output of a finished run.
#[derive(Debug)]
pub struct RunReport {
    pub ir: RepositoryIr,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: RunStats,
}

pub struct Pipeline {
    options: PipelineOptions,
    registry: LanguageRegistry,
    strategies: StrategyRegistry,
    store: ComponentStore,
    diagnostics: Diagnostics,
    stats: RunStats,
    languages_present: BTreeSet<LanguageId>,
}

impl Pipeline {
    /// Build a pipeline over the built-in language configurations.
    ///
    /// Fails only when none of `languages` can be loaded.
    pub fn new(options: PipelineOptions, languages: &[LanguageId], overrides: &QueryOverrides) -> Result<Self> {
        let mut diagnostics = Diagnostics::new();
        let registry = LanguageRegistry::builtin(languages, overrides, &mut diagnostics)?;
        Ok(Self::with_registry(options, registry, diagnostics))
    }

    pub fn with_registry(options: PipelineOptions, registry: LanguageRegistry, diagnostics: Diagnostics) -> Self {
        Self {
            options,
            registry,
            strategies: default_strategies(),
            store: ComponentStore::new(),
            diagnostics,
            stats: RunStats::default(),
            languages_present: BTreeSet::new(),
        }
    }

    /// Switch the FQN prefix for files processed from now on. Used when one
    /// run covers several analysis roots.
    pub fn set_target_name(&mut self, target_name: &str) {
        self.options.target_name = target_name.to_string();
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Read a discovered file from disk and process it.
    pub fn process_path(&mut self, file: &DiscoveredFile) -> bool {
        match std::fs::read(&file.path) {
            Ok(bytes) => self.process_file(SourceUnit {
                relative_path: file.relative_path.clone(),
                bytes,
                language: file.language,
                is_test_file: file.is_test_file,
            }),
            Err(err) => {
                self.stats.files_seen += 1;
                self.stats.files_failed += 1;
                self.diagnostics.push(Diagnostic::UnreadableFile {
                    path: file.relative_path.clone(),
                    reason: err.to_string(),
                });
                false
            }
        }
    }

    /// Extract one file into the component store. Returns whether the file
    /// produced a component.
    pub fn process_file(&mut self, unit: SourceUnit) -> bool {
        self.stats.files_seen += 1;
        tracing::debug!("Processing {} ({})", unit.relative_path, unit.language);

        let extracted = extract_unit(
            &self.registry,
            &self.strategies,
            &self.options,
            &mut self.diagnostics,
            &unit,
        );

        match extracted {
            Ok(extracted) => {
                self.stats.files_extracted += 1;
                self.stats.declarations += extracted.extraction.declaration_count();
                self.languages_present.insert(unit.language);
                self.aggregate(unit.language, extracted);
                true
            }
            Err(err) => {
                self.stats.files_failed += 1;
                let diagnostic = match err {
                    Error::Parse(reason) => Diagnostic::ParseFailure {
                        path: unit.relative_path,
                        reason,
                    },
                    other => Diagnostic::FileFailed {
                        path: unit.relative_path,
                        reason: other.to_string(),
                    },
                };
                self.diagnostics.push(diagnostic);
                false
            }
        }
    }

    fn aggregate(&mut self, language: LanguageId, extracted: Extracted) {
        let component_type = format!("{}_module", language);
        let Extracted {
            component_id,
            source_path,
            extraction,
        } = extracted;

        self.store.ensure(&component_id, &component_type, &source_path);
        let (records, diagnostics) = extraction.into_records();
        self.diagnostics.extend(diagnostics);
        for record in records {
            self.store.upsert(&component_id, &component_type, &source_path, record);
        }
    }

    /// Close the run and assemble the repository IR.
    pub fn finish(self, metadata: ProjectMetadata) -> RunReport {
        let stats = self.stats;
        tracing::info!(
            "Extracted {} declarations from {} of {} files ({} failed)",
            stats.declarations,
            stats.files_extracted,
            stats.files_seen,
            stats.files_failed
        );

        let ir = RepositoryIr {
            schema_version: SCHEMA_VERSION.to_string(),
            project_name: metadata.project_name.clone(),
            languages_present: self.languages_present.into_iter().collect(),
            metadata,
            components: self.store.into_components(),
        };

        RunReport {
            ir,
            diagnostics: self.diagnostics.into_vec(),
            stats,
        }
    }
}

struct Extracted {
    component_id: String,
    source_path: String,
    extraction: FileExtraction,
}

/// Parse and extract one unit. The tree is dropped before this returns.
fn extract_unit(
    registry: &LanguageRegistry,
    strategies: &StrategyRegistry,
    options: &PipelineOptions,
    diagnostics: &mut Diagnostics,
    unit: &SourceUnit,
) -> Result<Extracted> {
    let config = registry.config(unit.language).ok_or_else(|| Error::Configuration {
        language: unit.language.to_string(),
        message: "language is not loaded".to_string(),
    })?;
    let strategy = strategies
        .find(unit.language)
        .ok_or_else(|| Error::Extraction(format!("no driver for {}", unit.language)))?;

    let parse_options = ParseOptions {
        skip_malformed: options.skip_malformed,
    };
    let parsed = syntax::parse(registry, &unit.bytes, unit.language, parse_options, diagnostics)?;

    let module = ModulePath::resolve(
        Path::new(&unit.relative_path),
        &options.target_name,
        &config.namespace,
    );
    let fqn = FqnBuilder::new(&module, &config.namespace);
    let cx = FileContext {
        parsed: &parsed,
        config,
        source_file: &unit.relative_path,
        fqn: &fqn,
        is_test_file: unit.is_test_file,
    };

    let extraction = strategy.extract_file(&cx);
    tracing::debug!(
        "{}: {} declarations",
        unit.relative_path,
        extraction.declaration_count()
    );

    Ok(Extracted {
        component_id: module.component_id(),
        source_path: module.source_path(),
        extraction,
    })
}
