//! Language-neutral extractors
//!
//! Heuristics shared by every driver: documentation strings, call
//! signatures, and fully-qualified names.

pub mod docstring;
pub mod fqn;
pub mod signature;

pub use docstring::{dedent, DocstringPolicy};
pub use fqn::{FqnBuilder, ModulePath, NamespaceStyle, Nesting, QualifiedName};
pub use signature::{ParamKind, ParamShape, ParameterSpec, Signature};
