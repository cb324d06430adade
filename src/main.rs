//! codeir CLI - extract a repository's declarations into a canonical IR

use anyhow::Context;
use clap::Parser;
use codeir::config::{self, CodeirConfig};
use codeir::ignore::IgnoreFilter;
use codeir::library::{self, AnalysisTarget};
use codeir::output::{self, OutputFormat};
use codeir::pipeline::{Pipeline, PipelineOptions};
use codeir::ui::{self, Icons};
use codeir::{metadata, walk};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "codeir")]
#[command(version)]
#[command(about = "Extract declarations from Python and Rust sources into a language-neutral IR")]
#[command(long_about = r#"
codeir walks a repository, parses every supported source file with
tree-sitter, and writes one JSON or YAML document listing each module's
structures, functions, and tests with signatures and docstrings.

Installed Python packages can be analyzed in place with --library.

Example usage:
  codeir --repo-path ./myproject
  codeir --repo-path ./myproject -o ir.json --llm-file context.txt
  codeir --library requests urllib3 --format yaml
"#)]
struct Cli {
    /// Root of the repository to analyze [default: .]
    #[arg(long, conflicts_with = "library")]
    repo_path: Option<PathBuf>,

    /// Installed Python libraries to analyze instead of a repository
    #[arg(long, value_name = "NAME", num_args = 1..)]
    library: Vec<String>,

    /// Where to write the IR
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// IR format (inferred from the output extension by default)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Also write a plain-text context file for LLM prompts
    #[arg(long)]
    llm_file: Option<PathBuf>,

    /// Outermost name prefix (defaults to the repository directory name)
    #[arg(long)]
    target_name: Option<String>,

    /// Include Python stub files (.pyi)
    #[arg(long)]
    include_pyi: bool,

    /// Python interpreter used to locate --library packages
    #[arg(long)]
    python: Option<String>,

    /// Path to a codeir.toml config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// What one run analyzes.
enum Source {
    Repository(PathBuf),
    Libraries(Vec<String>),
}

impl Cli {
    /// Command-line values take precedence over the config file.
    fn merge(self, file: Option<CodeirConfig>) -> (Source, CodeirConfig) {
        let mut config = file.unwrap_or_default();
        if let Some(output) = self.output {
            config.output = output;
        }
        if self.format.is_some() {
            config.format = self.format;
        }
        if self.llm_file.is_some() {
            config.llm_file = self.llm_file;
        }
        if self.target_name.is_some() {
            config.target_name = self.target_name;
        }
        if let Some(python) = self.python {
            config.python = python;
        }
        config.include_pyi |= self.include_pyi;

        let source = if self.library.is_empty() {
            Source::Repository(self.repo_path.unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Source::Libraries(self.library)
        };
        (source, config)
    }
}

/// Resolve libraries, skipping the ones that cannot be located.
fn library_targets(names: &[String], python: &str) -> anyhow::Result<Vec<AnalysisTarget>> {
    let mut targets = Vec::new();
    for name in names {
        match library::resolve_library(python, name) {
            Ok(target) => {
                ui::status(Icons::FOLDER, name, &target.root.display().to_string());
                targets.push(target);
            }
            Err(e) => {
                tracing::warn!("Skipping library {}: {}", name, e);
                ui::warn(&format!("Skipping {}: {}", name, e));
            }
        }
    }
    if targets.is_empty() {
        anyhow::bail!("none of the requested libraries could be located");
    }
    Ok(targets)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let file_config = config::load_config(cli.config.as_deref())?;
    let (source, config) = cli.merge(file_config);
    let output_path = config.output_path();
    let format = config.output_format();

    let targets = match &source {
        Source::Repository(root) => {
            ui::header(&format!("Extracting {}", root.display()));
            let name = config
                .target_name
                .clone()
                .unwrap_or_else(|| metadata::directory_name(root));
            vec![AnalysisTarget {
                root: root.clone(),
                name,
            }]
        }
        Source::Libraries(names) => {
            ui::header(&format!("Extracting libraries {}", names.join(", ")));
            library_targets(names, &config.python)?
        }
    };
    for target in &targets {
        ui::status(Icons::TARGET, "Target", &target.name);
    }
    ui::status(Icons::FOLDER, "Output", &output_path.display().to_string());

    let started = Instant::now();
    let languages = config.language_ids();
    let options = PipelineOptions {
        target_name: targets.first().map(|t| t.name.clone()).unwrap_or_default(),
        skip_malformed: config.skip_malformed,
    };
    let mut pipeline = Pipeline::new(options, &languages, &config.query_overrides())?;

    let loaded: Vec<_> = pipeline.registry().languages().collect();
    let mut discovered = Vec::with_capacity(targets.len());
    for target in &targets {
        let filter = IgnoreFilter::new(&target.root, &config.exclude);
        let files = walk::discover_files(&target.root, &loaded, config.include_pyi, filter)
            .with_context(|| format!("cannot walk {}", target.root.display()))?;
        tracing::info!("Found {} source files under {}", files.len(), target.root.display());
        discovered.push((target, files));
    }

    let total = discovered.iter().map(|(_, files)| files.len()).sum();
    let progress = ui::FileProgress::new(total);
    for (target, files) in &discovered {
        pipeline.set_target_name(&target.name);
        for file in files {
            progress.start_file(&file.relative_path);
            pipeline.process_path(file);
            progress.finish_file();
        }
    }
    progress.finish();

    let project_metadata = match &source {
        Source::Repository(root) => metadata::parse_project_metadata(root),
        Source::Libraries(_) => library::libraries_metadata(&targets),
    };
    let report = pipeline.finish(project_metadata);

    format.write(&report.ir, &output_path)?;
    if let Some(llm_file) = &config.llm_file {
        output::write_llm_context(&report.ir, llm_file)?;
    }

    ui::section("Summary");
    let stats = report.stats;
    let digest = report.ir.digest()?;
    println!(
        "{}",
        ui::summary_table(&[
            ("Files processed", stats.files_seen.to_string()),
            ("Files failed", stats.files_failed.to_string()),
            ("Components", report.ir.components.len().to_string()),
            ("Structures", report.ir.structure_count().to_string()),
            ("Functions", report.ir.function_count().to_string()),
            ("Tests", report.ir.test_count().to_string()),
            ("Diagnostics", report.diagnostics.len().to_string()),
            ("Digest", digest[..16].to_string()),
            ("Elapsed", format!("{:.2?}", started.elapsed())),
        ])
    );

    if !report.diagnostics.is_empty() {
        ui::warn(&format!("{} diagnostics", report.diagnostics.len()));
        for diagnostic in &report.diagnostics {
            ui::diagnostic(diagnostic);
        }
    }

    ui::success(&format!("IR saved to {}", output_path.display()));
    Ok(())
}
