//! Installed-library targets
//!
//! Locates the source directory of an installed Python package by asking the
//! interpreter's import system, so a package can be analyzed the same way as
//! a repository checkout.

use crate::metadata::ProjectMetadata;
use crate::{Error, Result};
use std::path::PathBuf;
use std::process::Command;

pub const DEFAULT_PYTHON: &str = "python3";

/// Prints the package directory (first existing search location), or the
/// directory holding a single-file module or extension.
const LOCATE_SCRIPT: &str = r#"
import importlib.util, os, sys
spec = importlib.util.find_spec(sys.argv[1])
if spec is None:
    sys.exit("no module named " + sys.argv[1])
for location in spec.submodule_search_locations or []:
    if os.path.isdir(location):
        print(location)
        sys.exit(0)
if spec.origin and spec.origin not in ("built-in", "frozen", "namespace"):
    print(os.path.dirname(spec.origin))
    sys.exit(0)
sys.exit("no source location for " + sys.argv[1])
"#;

/// One root to analyze and the name its FQNs start with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTarget {
    pub root: PathBuf,
    pub name: String,
}

/// Dotted Python module name, e.g. `requests` or `google.protobuf`.
pub fn is_module_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            chars
                .next()
                .is_some_and(|c| c == '_' || c.is_alphabetic())
                && chars.all(|c| c == '_' || c.is_alphanumeric())
        })
}

/// Resolve an installed library to its source directory using `python`.
pub fn resolve_library(python: &str, name: &str) -> Result<AnalysisTarget> {
    let not_found = |reason: String| Error::LibraryNotFound {
        name: name.to_string(),
        reason,
    };

    if !is_module_name(name) {
        return Err(not_found("not a module name".to_string()));
    }

    let output = Command::new(python)
        .args(["-c", LOCATE_SCRIPT, name])
        .output()
        .map_err(|e| not_found(format!("failed to run {}: {}", python, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = stderr.lines().last().unwrap_or("lookup failed").trim();
        return Err(not_found(reason.to_string()));
    }

    let root = parse_location(&String::from_utf8_lossy(&output.stdout))
        .ok_or_else(|| not_found("interpreter printed no location".to_string()))?;
    if !root.is_dir() {
        return Err(not_found(format!("{} is not a directory", root.display())));
    }

    tracing::debug!("Library {} resolved to {}", name, root.display());
    Ok(AnalysisTarget {
        root,
        name: name.to_string(),
    })
}

/// The location is the last non-empty line; anything before it is noise
/// printed by site hooks.
fn parse_location(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .map(PathBuf::from)
}

/// Metadata for a run over installed libraries instead of a repository.
pub fn libraries_metadata(targets: &[AnalysisTarget]) -> ProjectMetadata {
    let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
    let names = names.join(", ");
    let mut metadata = ProjectMetadata::named(&format!("Libraries Analysis: {}", names));
    metadata.description = Some(format!("Static analysis of installed libraries: {}", names));
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_names() {
        assert!(is_module_name("requests"));
        assert!(is_module_name("google.protobuf"));
        assert!(is_module_name("_private2"));
        assert!(!is_module_name(""));
        assert!(!is_module_name("2fast"));
        assert!(!is_module_name("pkg..sub"));
        assert!(!is_module_name("os; rm -rf"));
    }

    #[test]
    fn test_parse_location_takes_last_line() {
        assert_eq!(
            parse_location("site hook says hi\n/usr/lib/python3/site-packages/requests\n\n"),
            Some(PathBuf::from("/usr/lib/python3/site-packages/requests"))
        );
        assert_eq!(parse_location("  \n"), None);
    }

    #[test]
    fn test_invalid_name_is_rejected_before_running() {
        let err = resolve_library("definitely-not-a-python", "bad name").unwrap_err();
        assert!(matches!(err, Error::LibraryNotFound { ref name, .. } if name == "bad name"));
    }

    #[test]
    fn test_missing_interpreter() {
        let err = resolve_library("definitely-not-a-python", "json").unwrap_err();
        assert!(err.to_string().contains("failed to run"));
    }

    #[test]
    fn test_libraries_metadata() {
        let targets = vec![
            AnalysisTarget {
                root: PathBuf::from("/a"),
                name: "alpha".to_string(),
            },
            AnalysisTarget {
                root: PathBuf::from("/b"),
                name: "beta".to_string(),
            },
        ];
        let metadata = libraries_metadata(&targets);
        assert_eq!(metadata.project_name, "Libraries Analysis: alpha, beta");
        assert_eq!(
            metadata.description.as_deref(),
            Some("Static analysis of installed libraries: alpha, beta")
        );
    }
}
