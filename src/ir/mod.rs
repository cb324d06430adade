//! Intermediate representation
//!
//! The language-neutral records produced by the drivers and the components
//! they are folded into. Everything here serializes with serde; field names
//! are the stable output schema.

pub mod store;

pub use store::ComponentStore;

use crate::extract::Signature;
use crate::language::LanguageId;
use crate::metadata::ProjectMetadata;
use serde::{Deserialize, Serialize};

/// Version of the serialized IR layout.
pub const SCHEMA_VERSION: &str = "1.0";

/// Kind of a type-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    Class,
    Struct,
    Enum,
    Trait,
}

impl StructureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StructureKind::Class => "class",
            StructureKind::Struct => "struct",
            StructureKind::Enum => "enum",
            StructureKind::Trait => "trait",
        }
    }
}

impl std::fmt::Display for StructureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub qualified_name: String,
    pub source_file: String,
    pub line_start: usize,
    pub line_end: usize,
    pub signature: Signature,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    pub raw_text: String,
    pub language: LanguageId,
}

/// Whether a field belongs to the type, to each instance, or names a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldScope {
    Class,
    Instance,
    Variant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
    pub scope: FieldScope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureRecord {
    pub name: String,
    pub qualified_name: String,
    pub kind: StructureKind,
    pub source_file: String,
    pub line_start: usize,
    pub line_end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    pub raw_text: String,
    pub language: LanguageId,
    pub base_type_names: Vec<String>,
    pub fields: Vec<FieldSpec>,
    pub nested_methods: Vec<FunctionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSpecRecord {
    /// Qualified name of the test function
    pub id: String,
    pub scenario_name: String,
    pub source_file: String,
    pub line_start: usize,
    pub line_end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    pub raw_text: String,
    pub language: LanguageId,
}

/// Any record a driver can emit for a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrRecord {
    Structure(StructureRecord),
    Function(FunctionRecord),
    Test(TestSpecRecord),
}

/// All declarations extracted from one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub component_id: String,
    pub component_type: String,
    pub source_path: String,
    pub data_structures: Vec<StructureRecord>,
    pub functions: Vec<FunctionRecord>,
    pub test_specs: Vec<TestSpecRecord>,
}

impl Component {
    pub fn new(component_id: &str, component_type: &str, source_path: &str) -> Self {
        Self {
            component_id: component_id.to_string(),
            component_type: component_type.to_string(),
            source_path: source_path.to_string(),
            data_structures: Vec::new(),
            functions: Vec::new(),
            test_specs: Vec::new(),
        }
    }

    /// Number of top-level declarations (nested methods excluded).
    pub fn declaration_count(&self) -> usize {
        self.data_structures.len() + self.functions.len() + self.test_specs.len()
    }
}

/// The full IR of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryIr {
    pub schema_version: String,
    pub project_name: String,
    pub languages_present: Vec<LanguageId>,
    pub metadata: ProjectMetadata,
    pub components: Vec<Component>,
}

impl RepositoryIr {
    /// Content digest of the components, stable across identical runs.
    pub fn digest(&self) -> crate::Result<String> {
        let bytes = serde_json::to_vec(&self.components)?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }

    pub fn function_count(&self) -> usize {
        self.components
            .iter()
            .map(|c| {
                c.functions.len()
                    + c.data_structures
                        .iter()
                        .map(|s| s.nested_methods.len())
                        .sum::<usize>()
            })
            .sum()
    }

    pub fn structure_count(&self) -> usize {
        self.components.iter().map(|c| c.data_structures.len()).sum()
    }

    pub fn test_count(&self) -> usize {
        self.components.iter().map(|c| c.test_specs.len()).sum()
    }
}
