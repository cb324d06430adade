use crate::language::{LanguageId, QueryOverrides};
use crate::library::DEFAULT_PYTHON;
use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_OUTPUT_FILENAME: &str = "codeir.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CodeirConfig {
    /// Outermost FQN prefix; defaults to the repository directory name
    pub target_name: Option<String>,
    pub output: PathBuf,
    /// IR format; inferred from the output extension when unset
    pub format: Option<OutputFormat>,
    pub llm_file: Option<PathBuf>,
    pub include_pyi: bool,
    pub skip_malformed: bool,
    pub languages: Vec<String>,
    pub exclude: Vec<String>,
    /// Interpreter used to locate installed libraries
    pub python: String,
    /// `[queries.<language>]` tables replacing built-in query templates
    pub queries: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for CodeirConfig {
    fn default() -> Self {
        Self {
            target_name: None,
            output: PathBuf::from(DEFAULT_OUTPUT_FILENAME),
            format: None,
            llm_file: None,
            include_pyi: false,
            skip_malformed: true,
            languages: LanguageId::all().iter().map(|l| l.as_str().to_string()).collect(),
            exclude: Vec::new(),
            python: DEFAULT_PYTHON.to_string(),
            queries: BTreeMap::new(),
        }
    }
}

impl CodeirConfig {
    /// Requested languages. Unknown names are reported and dropped.
    pub fn language_ids(&self) -> Vec<LanguageId> {
        let mut ids = Vec::new();
        for name in &self.languages {
            match LanguageId::from_str(name) {
                Ok(id) if !ids.contains(&id) => ids.push(id),
                Ok(_) => {}
                Err(err) => tracing::warn!("Ignoring configured language: {}", err),
            }
        }
        ids
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format.unwrap_or_else(|| OutputFormat::from_path(&self.output))
    }

    /// The output path, with the default file name following the format.
    pub fn output_path(&self) -> PathBuf {
        let format = self.output_format();
        if self.output == Path::new(DEFAULT_OUTPUT_FILENAME) && format != OutputFormat::Json {
            self.output.with_extension(format.extension())
        } else {
            self.output.clone()
        }
    }

    pub fn query_overrides(&self) -> QueryOverrides {
        let mut overrides = QueryOverrides::new();
        for (name, queries) in &self.queries {
            match LanguageId::from_str(name) {
                Ok(id) => {
                    overrides.entry(id).or_default().extend(queries.clone());
                }
                Err(err) => tracing::warn!("Ignoring query overrides: {}", err),
            }
        }
        overrides
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("codeir.toml")
}

/// Load the config file if present. An explicit path that does not exist is
/// an error; a missing default file is not.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<CodeirConfig>> {
    let explicit = path.is_some();
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        if explicit {
            anyhow::bail!("config file not found at {}", path.display());
        }
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: CodeirConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_fields_missing() {
        let config: CodeirConfig = toml::from_str("target_name = \"pkg\"").unwrap();
        assert_eq!(config.target_name.as_deref(), Some("pkg"));
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT_FILENAME));
        assert!(config.skip_malformed);
        assert_eq!(config.language_ids(), vec![LanguageId::Python, LanguageId::Rust]);
    }

    #[test]
    fn test_query_overrides_by_language() {
        let config: CodeirConfig = toml::from_str(
            r#"
languages = ["python", "cobol", "py"]

[queries.python]
test_funcs = "(function_definition) @function"

[queries.fortran]
x = "(y)"
"#,
        )
        .unwrap();

        assert_eq!(config.language_ids(), vec![LanguageId::Python]);
        let overrides = config.query_overrides();
        assert_eq!(overrides.len(), 1);
        assert_eq!(
            overrides[&LanguageId::Python]["test_funcs"],
            "(function_definition) @function"
        );
    }

    #[test]
    fn test_output_format_and_path() {
        let config = CodeirConfig::default();
        assert_eq!(config.output_format(), OutputFormat::Json);
        assert_eq!(config.output_path(), PathBuf::from("codeir.json"));

        let config: CodeirConfig = toml::from_str("format = \"yaml\"").unwrap();
        assert_eq!(config.output_path(), PathBuf::from("codeir.yaml"));

        let config: CodeirConfig = toml::from_str("output = \"out/ir.yml\"").unwrap();
        assert_eq!(config.output_format(), OutputFormat::Yaml);
        assert_eq!(config.output_path(), PathBuf::from("out/ir.yml"));
        assert_eq!(config.python, "python3");
    }

    #[test]
    fn test_load_config_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("codeir.toml");
        assert!(load_config(Some(&missing)).is_err());

        std::fs::write(&missing, "include_pyi = true\nexclude = [\"gen/\"]\n").unwrap();
        let config = load_config(Some(&missing)).unwrap().unwrap();
        assert!(config.include_pyi);
        assert_eq!(config.exclude, vec!["gen/"]);
    }
}
