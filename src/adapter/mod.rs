//! Language Driver Framework
//!
//! Each language provides a strategy that walks its parsed tree, classifies
//! declarations through the registry's role aliases, and turns them into IR
//! records with the shared extractors. The pipeline never sees
//! language-specific logic.

pub mod framework;
pub mod python;
pub mod rust;

pub use framework::{default_strategies, FileContext, FileExtraction, LanguageStrategy, StrategyRegistry};
pub use python::PythonStrategy;
pub use rust::RustStrategy;
