//! Project manifest metadata
//!
//! Reads `Cargo.toml` and `pyproject.toml` at the analysis root. A manifest
//! that fails to parse is reported and skipped; it never aborts the run.

use serde::{Deserialize, Serialize};
use std::path::Path;
use toml::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_spec: Option<String>,
    pub source: String,
}

/// A manifest that was read, with its raw contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFile {
    pub source: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub project_name: String,
    pub version: Option<String>,
    pub description: Option<String>,
    pub authors: Vec<String>,
    pub license: Option<String>,
    pub homepage: Option<String>,
    pub repository: Option<String>,
    pub keywords: Vec<String>,
    pub dependencies: Vec<Dependency>,
    pub manifests: Vec<ManifestFile>,
}

impl ProjectMetadata {
    pub fn named(project_name: &str) -> Self {
        Self {
            project_name: project_name.to_string(),
            ..Default::default()
        }
    }
}

/// Name of the directory `root` resolves to, so `.` names the current directory.
pub fn directory_name(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .or_else(|| root.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

/// Parse every known manifest under `root`. The project name defaults to the
/// root directory's name.
pub fn parse_project_metadata(root: &Path) -> ProjectMetadata {
    let mut metadata = ProjectMetadata::named(&directory_name(root));

    for (file_name, apply) in [
        ("Cargo.toml", apply_cargo as fn(&mut ProjectMetadata, &Value)),
        ("pyproject.toml", apply_pyproject),
    ] {
        let path = root.join(file_name);
        if !path.is_file() {
            continue;
        }
        match read_manifest(&path) {
            Ok((content, value)) => {
                tracing::debug!("Parsed manifest {}", path.display());
                apply(&mut metadata, &value);
                metadata.manifests.push(ManifestFile {
                    source: file_name.to_string(),
                    content,
                });
            }
            Err(err) => tracing::warn!("Failed to parse {}: {}", path.display(), err),
        }
    }

    metadata
}

fn read_manifest(path: &Path) -> crate::Result<(String, Value)> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = toml::from_str(&content)?;
    Ok((content, value))
}

fn str_field(table: &Value, key: &str) -> Option<String> {
    table.get(key).and_then(Value::as_str).map(str::to_string)
}

fn str_list(table: &Value, key: &str) -> Option<Vec<String>> {
    let items = table.get(key)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

fn overwrite<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn apply_cargo(metadata: &mut ProjectMetadata, manifest: &Value) {
    if let Some(package) = manifest.get("package") {
        overwrite(&mut metadata.project_name, str_field(package, "name"));
        overwrite(&mut metadata.version, str_field(package, "version").map(Some));
        overwrite(&mut metadata.description, str_field(package, "description").map(Some));
        overwrite(&mut metadata.authors, str_list(package, "authors"));
        overwrite(&mut metadata.license, str_field(package, "license").map(Some));
        overwrite(&mut metadata.homepage, str_field(package, "homepage").map(Some));
        overwrite(&mut metadata.repository, str_field(package, "repository").map(Some));
        overwrite(&mut metadata.keywords, str_list(package, "keywords"));
    }

    if let Some(deps) = manifest.get("dependencies").and_then(Value::as_table) {
        for (name, detail) in deps {
            let version_spec = match detail {
                Value::String(version) => Some(version.clone()),
                other => str_field(other, "version"),
            };
            metadata.dependencies.push(Dependency {
                name: name.clone(),
                version_spec,
                source: "crates.io".to_string(),
            });
        }
    }
}

fn apply_pyproject(metadata: &mut ProjectMetadata, manifest: &Value) {
    let section = manifest
        .get("tool")
        .and_then(|tool| tool.get("poetry"))
        .or_else(|| manifest.get("project"));
    let Some(section) = section else {
        return;
    };

    overwrite(&mut metadata.project_name, str_field(section, "name"));
    overwrite(&mut metadata.version, str_field(section, "version").map(Some));
    overwrite(&mut metadata.description, str_field(section, "description").map(Some));
    overwrite(&mut metadata.authors, python_authors(section));
    overwrite(&mut metadata.license, python_license(section).map(Some));
    overwrite(&mut metadata.keywords, str_list(section, "keywords"));

    let urls = section.get("urls");
    let url = |keys: [&str; 2], fallback: &str| {
        urls.and_then(|u| keys.iter().find_map(|k| str_field(u, k)))
            .or_else(|| str_field(section, fallback))
    };
    overwrite(&mut metadata.homepage, url(["Homepage", "homepage"], "homepage").map(Some));
    overwrite(&mut metadata.repository, url(["Repository", "repository"], "repository").map(Some));

    match section.get("dependencies") {
        // Poetry: name = "spec" or name = { version = ... }
        Some(Value::Table(deps)) => {
            for (name, spec) in deps {
                if name.eq_ignore_ascii_case("python") {
                    continue;
                }
                let version_spec = match spec {
                    Value::String(s) => Some(s.clone()),
                    other => str_field(other, "version").or_else(|| Some(other.to_string())),
                };
                metadata.dependencies.push(Dependency {
                    name: name.clone(),
                    version_spec,
                    source: "pypi".to_string(),
                });
            }
        }
        // PEP 621: list of requirement strings
        Some(Value::Array(reqs)) => {
            for req in reqs.iter().filter_map(Value::as_str) {
                let name = requirement_name(req);
                if name.is_empty() {
                    continue;
                }
                metadata.dependencies.push(Dependency {
                    name: name.to_string(),
                    version_spec: Some(req.to_string()),
                    source: "pypi".to_string(),
                });
            }
        }
        _ => {}
    }
}

fn python_authors(section: &Value) -> Option<Vec<String>> {
    let items = section.get("authors")?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|author| match author {
                Value::String(s) => Some(s.clone()),
                Value::Table(_) => {
                    let name = str_field(author, "name").unwrap_or_default();
                    let email = str_field(author, "email").unwrap_or_default();
                    let rendered = if email.is_empty() {
                        name
                    } else {
                        format!("{name} <{email}>")
                    };
                    Some(rendered.trim().to_string())
                }
                _ => None,
            })
            .collect(),
    )
}

fn python_license(section: &Value) -> Option<String> {
    let license = section.get("license")?;
    match license {
        Value::String(s) => Some(s.clone()),
        Value::Table(_) => str_field(license, "text").or_else(|| str_field(license, "file")),
        _ => None,
    }
}

/// Distribution name of a requirement string such as `requests[socks]>=2.0`.
fn requirement_name(req: &str) -> &str {
    let end = req
        .find(|c: char| matches!(c, '[' | '<' | '>' | '=' | '~' | '!' | ';' | ' '))
        .unwrap_or(req.len());
    req[..end].trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_name_from_resolved_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("widget");
        fs::create_dir_all(root.join("sub")).unwrap();

        let metadata = parse_project_metadata(&root.join("sub/.."));
        assert_eq!(metadata.project_name, "widget");
        assert_eq!(directory_name(&root.join(".")), "widget");
        assert_eq!(directory_name(&dir.path().join("missing")), "missing");
    }

    #[test]
    fn test_cargo_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Cargo.toml"),
            r#"
[package]
name = "widget"
version = "0.3.1"
authors = ["Ana <ana@example.com>"]
keywords = ["parsing"]

[dependencies]
serde = { version = "1.0", features = ["derive"] }
anyhow = "1"
local = { path = "../local" }
"#,
        )
        .unwrap();

        let meta = parse_project_metadata(dir.path());
        assert_eq!(meta.project_name, "widget");
        assert_eq!(meta.version.as_deref(), Some("0.3.1"));
        assert_eq!(meta.authors, vec!["Ana <ana@example.com>"]);
        assert_eq!(meta.keywords, vec!["parsing"]);

        let deps: Vec<_> = meta
            .dependencies
            .iter()
            .map(|d| (d.name.as_str(), d.version_spec.as_deref()))
            .collect();
        assert_eq!(
            deps,
            vec![("anyhow", Some("1")), ("local", None), ("serde", Some("1.0"))]
        );
        assert_eq!(meta.manifests.len(), 1);
        assert_eq!(meta.manifests[0].source, "Cargo.toml");
    }

    #[test]
    fn test_pep621_pyproject() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("pyproject.toml"),
            r#"
[project]
name = "gizmo"
version = "2.0"
authors = [{ name = "Bo", email = "bo@example.com" }]
license = { text = "MIT" }
dependencies = ["requests[socks]>=2.31", "click"]

[project.urls]
Homepage = "https://example.com"
"#,
        )
        .unwrap();

        let meta = parse_project_metadata(dir.path());
        assert_eq!(meta.project_name, "gizmo");
        assert_eq!(meta.authors, vec!["Bo <bo@example.com>"]);
        assert_eq!(meta.license.as_deref(), Some("MIT"));
        assert_eq!(meta.homepage.as_deref(), Some("https://example.com"));
        let names: Vec<_> = meta.dependencies.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["requests", "click"]);
        assert_eq!(meta.dependencies[0].version_spec.as_deref(), Some("requests[socks]>=2.31"));
    }

    #[test]
    fn test_poetry_skips_python_dependency() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("pyproject.toml"),
            r#"
[tool.poetry]
name = "legacy"
authors = ["Cy <cy@example.com>"]

[tool.poetry.dependencies]
python = "^3.10"
httpx = "^0.27"
"#,
        )
        .unwrap();

        let meta = parse_project_metadata(dir.path());
        assert_eq!(meta.project_name, "legacy");
        assert_eq!(meta.dependencies.len(), 1);
        assert_eq!(meta.dependencies[0].name, "httpx");
        assert_eq!(meta.dependencies[0].source, "pypi");
    }

    #[test]
    fn test_malformed_manifest_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Cargo.toml"), "[package\nname = ").unwrap();

        let meta = parse_project_metadata(dir.path());
        let expected = dir.path().file_name().unwrap().to_str().unwrap();
        assert_eq!(meta.project_name, expected);
        assert!(meta.manifests.is_empty());
    }
}
