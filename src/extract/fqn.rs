//! Fully-qualified names
//!
//! A module path is derived from a file's location under the analysis root;
//! declarations are qualified by joining it (or their parent's name) with
//! the language's separator.

use std::path::{Component, Path};

/// How a language spells its namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceStyle {
    pub separator: &'static str,
    /// Source-file suffixes stripped from the last path segment
    pub source_suffixes: &'static [&'static str],
    /// File names that stand for their enclosing directory
    pub root_sentinels: &'static [&'static str],
    /// Directories that are not part of the namespace
    pub source_roots: &'static [&'static str],
}

impl NamespaceStyle {
    pub const fn python() -> Self {
        Self {
            separator: ".",
            source_suffixes: &[".py", ".pyi"],
            root_sentinels: &["__init__.py", "__init__.pyi"],
            source_roots: &[],
        }
    }

    pub const fn rust() -> Self {
        Self {
            separator: "::",
            source_suffixes: &[".rs"],
            root_sentinels: &["mod.rs", "lib.rs", "main.rs"],
            source_roots: &["src"],
        }
    }
}

/// Namespace segments of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePath {
    segments: Vec<String>,
}

impl ModulePath {
    /// Derive the module path of a file relative to the analysis root.
    ///
    /// The target name is prepended unless the path already starts with it.
    pub fn resolve(relative_path: &Path, target: &str, style: &NamespaceStyle) -> Self {
        let mut segments: Vec<String> = relative_path
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect();

        let file = segments.pop();
        // Source roots carry no namespace, wherever they sit (workspace members too)
        segments.retain(|dir| !style.source_roots.contains(&dir.as_str()));

        if let Some(last) = file {
            if !style.root_sentinels.contains(&last.as_str()) {
                let stem = style
                    .source_suffixes
                    .iter()
                    .find_map(|suffix| last.strip_suffix(suffix))
                    .unwrap_or(last.as_str());
                if !stem.is_empty() {
                    segments.push(stem.to_string());
                }
            }
        }

        if !target.is_empty() && segments.first().map(String::as_str) != Some(target) {
            segments.insert(0, target.to_string());
        }

        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn join(&self, separator: &str) -> String {
        self.segments.join(separator)
    }

    /// Stable component identifier: the segments joined with dots.
    pub fn component_id(&self) -> String {
        if self.segments.is_empty() {
            "__root__".to_string()
        } else {
            self.join(".")
        }
    }

    /// The segments joined as a forward-slash path.
    pub fn source_path(&self) -> String {
        self.join("/")
    }
}

/// Where a qualified name's parent lives relative to the current module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    /// No parent: qualified directly under the module
    TopLevel,
    /// Parent is the module itself or something declared inside it
    SameModule,
    /// Parent name does not belong to this module
    Foreign,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub value: String,
    pub nesting: Nesting,
}

/// Qualifies declaration names within one module.
#[derive(Debug, Clone)]
pub struct FqnBuilder {
    separator: &'static str,
    base: String,
}

impl FqnBuilder {
    pub fn new(module: &ModulePath, style: &NamespaceStyle) -> Self {
        Self {
            separator: style.separator,
            base: module.join(style.separator),
        }
    }

    /// The module's own qualified name.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn separator(&self) -> &'static str {
        self.separator
    }

    /// Qualify `name`, optionally under an enclosing declaration.
    pub fn qualify(&self, name: &str, parent: Option<&str>) -> QualifiedName {
        match parent {
            None if self.base.is_empty() => QualifiedName {
                value: name.to_string(),
                nesting: Nesting::TopLevel,
            },
            None => QualifiedName {
                value: format!("{}{}{}", self.base, self.separator, name),
                nesting: Nesting::TopLevel,
            },
            Some(parent) => {
                let nesting = if is_segment_prefix(&self.base, parent, self.separator) {
                    Nesting::SameModule
                } else {
                    tracing::debug!(
                        "Parent {} of {} is outside module {}",
                        parent,
                        name,
                        self.base
                    );
                    Nesting::Foreign
                };
                QualifiedName {
                    value: format!("{}{}{}", parent, self.separator, name),
                    nesting,
                }
            }
        }
    }
}

/// Whether `full` equals `prefix` or continues it at a separator boundary.
///
/// `pkg.mod` is a segment prefix of `pkg.mod.Outer` but not of `pkg.module`.
pub fn is_segment_prefix(prefix: &str, full: &str, separator: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    match full.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with(separator),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python_path(path: &str, target: &str) -> ModulePath {
        ModulePath::resolve(Path::new(path), target, &NamespaceStyle::python())
    }

    fn rust_path(path: &str, target: &str) -> ModulePath {
        ModulePath::resolve(Path::new(path), target, &NamespaceStyle::rust())
    }

    #[test]
    fn test_python_fqn_is_dotted() {
        let module = python_path("pkg/sub/mod.py", "pkg");
        let fqn = FqnBuilder::new(&module, &NamespaceStyle::python());

        assert_eq!(fqn.base(), "pkg.sub.mod");
        assert_eq!(fqn.qualify("Foo", None).value, "pkg.sub.mod.Foo");
    }

    #[test]
    fn test_rust_fqn_is_colon_separated() {
        let module = rust_path("pkg/sub/mod", "pkg");
        let fqn = FqnBuilder::new(&module, &NamespaceStyle::rust());

        // Without a file name there is no sentinel to collapse.
        assert_eq!(fqn.qualify("Foo", None).value, "pkg::sub::mod::Foo");

        let module = rust_path("pkg/sub/mod.rs", "pkg");
        let fqn = FqnBuilder::new(&module, &NamespaceStyle::rust());
        assert_eq!(fqn.qualify("Foo", None).value, "pkg::sub::Foo");
    }

    #[test]
    fn test_workspace_member_drops_src() {
        let fqn = FqnBuilder::new(&rust_path("crates/foo/src/net.rs", "ws"), &NamespaceStyle::rust());
        assert_eq!(fqn.qualify("Foo", None).value, "ws::crates::foo::net::Foo");

        let fqn = FqnBuilder::new(&rust_path("crates/foo/src/lib.rs", "ws"), &NamespaceStyle::rust());
        assert_eq!(fqn.qualify("Foo", None).value, "ws::crates::foo::Foo");

        // Only directories are source roots; a `src.rs` file is a module
        let fqn = FqnBuilder::new(&rust_path("src/src.rs", "ws"), &NamespaceStyle::rust());
        assert_eq!(fqn.qualify("Foo", None).value, "ws::src::Foo");
    }

    #[test]
    fn test_module_root_collapses() {
        let fqn = FqnBuilder::new(&python_path("pkg/sub/__init__.py", "pkg"), &NamespaceStyle::python());
        assert_eq!(fqn.qualify("Foo", None).value, "pkg.sub.Foo");

        let fqn = FqnBuilder::new(&rust_path("src/lib.rs", "mycrate"), &NamespaceStyle::rust());
        assert_eq!(fqn.qualify("Foo", None).value, "mycrate::Foo");

        let fqn = FqnBuilder::new(&rust_path("src/net/mod.rs", "mycrate"), &NamespaceStyle::rust());
        assert_eq!(fqn.qualify("Foo", None).value, "mycrate::net::Foo");
    }

    #[test]
    fn test_target_prefix_added_once() {
        assert_eq!(python_path("sub/mod.py", "pkg").join("."), "pkg.sub.mod");
        assert_eq!(python_path("pkg/sub/mod.py", "pkg").join("."), "pkg.sub.mod");
        assert_eq!(python_path("sub/mod.py", "").join("."), "sub.mod");
    }

    #[test]
    fn test_nested_in_parent() {
        let fqn = FqnBuilder::new(&python_path("pkg/sub/mod.py", "pkg"), &NamespaceStyle::python());
        let outer = fqn.qualify("Outer", None);

        let inner = fqn.qualify("Foo", Some(&outer.value));
        assert_eq!(inner.value, "pkg.sub.mod.Outer.Foo");
        assert_eq!(inner.nesting, Nesting::SameModule);
    }

    #[test]
    fn test_foreign_parent() {
        let fqn = FqnBuilder::new(&python_path("pkg/mod.py", "pkg"), &NamespaceStyle::python());

        // Shares a textual prefix with the module but not a segment boundary.
        let name = fqn.qualify("run", Some("pkg.module.Other"));
        assert_eq!(name.value, "pkg.module.Other.run");
        assert_eq!(name.nesting, Nesting::Foreign);
    }

    #[test]
    fn test_segment_prefix() {
        assert!(is_segment_prefix("pkg.mod", "pkg.mod", "."));
        assert!(is_segment_prefix("pkg.mod", "pkg.mod.Outer", "."));
        assert!(!is_segment_prefix("pkg.mod", "pkg.module", "."));
        assert!(!is_segment_prefix("a::b", "a::bc::D", "::"));
        assert!(is_segment_prefix("a::b", "a::b::D", "::"));
        assert!(is_segment_prefix("", "anything", "."));
    }

    #[test]
    fn test_component_id_and_source_path() {
        let module = rust_path("src/net/tcp.rs", "mycrate");
        assert_eq!(module.component_id(), "mycrate.net.tcp");
        assert_eq!(module.source_path(), "mycrate/net/tcp");

        let module = python_path("__init__.py", "");
        assert!(module.is_empty());
        assert_eq!(module.component_id(), "__root__");
    }

    #[test]
    fn test_deterministic() {
        let a = FqnBuilder::new(&python_path("pkg/a.py", "pkg"), &NamespaceStyle::python());
        let b = FqnBuilder::new(&python_path("pkg/a.py", "pkg"), &NamespaceStyle::python());
        assert_eq!(a.qualify("X", None), b.qualify("X", None));
    }
}
