//! IR serialization
//!
//! Pretty JSON or YAML for tools, and a flat markdown-ish text file meant to
//! be pasted into an LLM prompt.

use crate::ir::{FunctionRecord, RepositoryIr, StructureRecord};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

/// Serialization format of the IR document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    /// `.yaml` and `.yml` files are YAML, anything else JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                OutputFormat::Yaml
            }
            _ => OutputFormat::Json,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }

    pub fn write(self, ir: &RepositoryIr, path: &Path) -> Result<()> {
        match self {
            OutputFormat::Json => write_json(ir, path),
            OutputFormat::Yaml => write_yaml(ir, path),
        }
    }
}

pub fn write_json(ir: &RepositoryIr, path: &Path) -> Result<()> {
    create_parent(path)?;
    let mut json = serde_json::to_string_pretty(ir)?;
    json.push('\n');
    std::fs::write(path, json)?;
    tracing::info!("IR written to {}", path.display());
    Ok(())
}

/// Block-style YAML with keys in record order.
pub fn write_yaml(ir: &RepositoryIr, path: &Path) -> Result<()> {
    create_parent(path)?;
    std::fs::write(path, serde_yaml::to_string(ir)?)?;
    tracing::info!("IR written to {}", path.display());
    Ok(())
}

pub fn write_llm_context(ir: &RepositoryIr, path: &Path) -> Result<()> {
    create_parent(path)?;
    std::fs::write(path, render_llm_context(ir))?;
    tracing::info!("LLM context written to {}", path.display());
    Ok(())
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/A")
}

pub fn render_llm_context(ir: &RepositoryIr) -> String {
    let mut out = String::new();
    let languages: Vec<&str> = ir.languages_present.iter().map(|l| l.as_str()).collect();

    // Writing into a String cannot fail
    let _ = writeln!(out, "# Project: {}", ir.project_name);
    let _ = writeln!(out, "## Schema Version: {}", ir.schema_version);
    let _ = writeln!(out, "## Languages Present: {}\n", languages.join(", "));

    let meta = &ir.metadata;
    out.push_str("--- METADATA ---\n");
    let _ = writeln!(out, "Version: {}", or_na(&meta.version));
    let _ = writeln!(out, "Description: {}", or_na(&meta.description));
    let _ = writeln!(out, "Authors: {}", meta.authors.join(", "));
    let _ = writeln!(out, "License: {}", or_na(&meta.license));
    let _ = writeln!(out, "Homepage: {}", or_na(&meta.homepage));
    let _ = writeln!(out, "Repository: {}", or_na(&meta.repository));
    let _ = writeln!(out, "Keywords: {}", meta.keywords.join(", "));

    if !meta.manifests.is_empty() {
        out.push_str("\n### Parsed Metadata Files Content:\n");
        for manifest in &meta.manifests {
            let _ = writeln!(out, "\n#### File: {}\n```\n{}\n```", manifest.source, manifest.content);
        }
    }
    if !meta.dependencies.is_empty() {
        out.push_str("\n### Dependencies:\n");
        for dep in &meta.dependencies {
            let _ = writeln!(
                out,
                "- {} (Version: {}, Source: {})",
                dep.name,
                dep.version_spec.as_deref().unwrap_or("any version"),
                dep.source
            );
        }
    }

    out.push_str("\n--- CODE ELEMENTS ---\n");
    for component in &ir.components {
        let _ = writeln!(out, "\n### Component (Module/Package): {}", component.component_id);
        let _ = writeln!(out, "Path Context: {}", component.source_path);
        let _ = writeln!(out, "Type: {}", component.component_type);

        for structure in &component.data_structures {
            render_structure(&mut out, structure);
        }
        for function in &component.functions {
            render_function(&mut out, function, "FUNCTION");
        }
        for test in &component.test_specs {
            let _ = writeln!(out, "\n#### {} TEST: {}", test.language.as_str().to_uppercase(), test.scenario_name);
            let _ = writeln!(out, "In File: {}", test.source_file);
            let _ = writeln!(out, "Qualified Name: {}", test.id);
            let _ = writeln!(out, "Lines: {}-{}", test.line_start, test.line_end);
            render_body(&mut out, test.docstring.as_deref(), test.language.as_str(), &test.raw_text);
        }
    }

    out
}

fn render_structure(out: &mut String, structure: &StructureRecord) {
    let lang = structure.language.as_str();
    let _ = writeln!(
        out,
        "\n#### {} {}: {}",
        lang.to_uppercase(),
        structure.kind.as_str().to_uppercase(),
        structure.name
    );
    let _ = writeln!(out, "In File: {}", structure.source_file);
    let _ = writeln!(out, "Qualified Name: {}", structure.qualified_name);
    let _ = writeln!(out, "Lines: {}-{}", structure.line_start, structure.line_end);
    if !structure.base_type_names.is_empty() {
        let _ = writeln!(out, "Bases: {}", structure.base_type_names.join(", "));
    }
    if !structure.fields.is_empty() {
        let fields: Vec<String> = structure
            .fields
            .iter()
            .map(|f| match &f.declared_type {
                Some(ty) => format!("{}: {}", f.name, ty),
                None => f.name.clone(),
            })
            .collect();
        let _ = writeln!(out, "Fields: {}", fields.join(", "));
    }
    render_body(out, structure.docstring.as_deref(), lang, &structure.raw_text);
    for method in &structure.nested_methods {
        render_function(out, method, "METHOD");
    }
}

fn render_function(out: &mut String, function: &FunctionRecord, label: &str) {
    let lang = function.language.as_str();
    let sig = &function.signature;
    let _ = writeln!(out, "\n#### {} {}: {}", lang.to_uppercase(), label, function.name);
    let _ = writeln!(out, "In File: {}", function.source_file);
    let _ = writeln!(out, "Qualified Name: {}", function.qualified_name);
    let _ = writeln!(out, "Lines: {}-{}", function.line_start, function.line_end);
    let _ = writeln!(
        out,
        "Signature: {}{}{}{}",
        if sig.is_unsafe { "unsafe " } else { "" },
        if sig.is_async { "async " } else { "" },
        function.name,
        sig.render()
    );
    render_body(out, function.docstring.as_deref(), lang, &function.raw_text);
}

fn render_body(out: &mut String, docstring: Option<&str>, lang: &str, raw_text: &str) {
    let _ = writeln!(
        out,
        "##### DOCSTRING:\n```\n{}\n```",
        docstring.unwrap_or("(No docstring found)")
    );
    let _ = writeln!(out, "##### SOURCE CODE:\n```{}\n{}\n```", lang, raw_text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Signature;
    use crate::ir::{Component, SCHEMA_VERSION};
    use crate::language::LanguageId;
    use crate::metadata::ProjectMetadata;

    fn sample_ir() -> RepositoryIr {
        let mut component = Component::new("pkg.mod", "python_module", "pkg/mod");
        component.functions.push(FunctionRecord {
            name: "greet".to_string(),
            qualified_name: "pkg.mod.greet".to_string(),
            source_file: "pkg/mod.py".to_string(),
            line_start: 1,
            line_end: 2,
            signature: Signature::default(),
            docstring: Some("Say hi.".to_string()),
            raw_text: "def greet():\n    \"\"\"Say hi.\"\"\"".to_string(),
            language: LanguageId::Python,
        });

        RepositoryIr {
            schema_version: SCHEMA_VERSION.to_string(),
            project_name: "demo".to_string(),
            languages_present: vec![LanguageId::Python],
            metadata: ProjectMetadata::named("demo"),
            components: vec![component],
        }
    }

    #[test]
    fn test_render_llm_context() {
        let text = render_llm_context(&sample_ir());
        assert!(text.starts_with("# Project: demo\n"));
        assert!(text.contains("## Languages Present: python"));
        assert!(text.contains("### Component (Module/Package): pkg.mod"));
        assert!(text.contains("#### PYTHON FUNCTION: greet"));
        assert!(text.contains("Signature: greet()"));
        assert!(text.contains("```\nSay hi.\n```"));
    }

    #[test]
    fn test_write_json_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/ir.json");
        let ir = sample_ir();
        write_json(&ir, &path).unwrap();

        let loaded: RepositoryIr = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, ir);
    }

    #[test]
    fn test_write_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/ir.yaml");
        let ir = sample_ir();
        OutputFormat::from_path(&path).write(&ir, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("schema_version:"));
        assert!(text.contains("qualified_name: pkg.mod.greet"));
        assert!(!text.trim_start().starts_with('{'));
        let loaded: RepositoryIr = serde_yaml::from_str(&text).unwrap();
        assert_eq!(loaded, ir);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("out/ir.yml")), OutputFormat::Yaml);
        assert_eq!(OutputFormat::from_path(Path::new("IR.YAML")), OutputFormat::Yaml);
        assert_eq!(OutputFormat::from_path(Path::new("ir.json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("ir")), OutputFormat::Json);
    }

    #[test]
    fn test_llm_context_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/context.txt");
        write_llm_context(&sample_ir(), &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("# Project: demo"));
    }
}
