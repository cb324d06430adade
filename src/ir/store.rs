//! Component store
//!
//! Folds per-file records into components keyed by component id. Appends
//! only: nothing is overwritten or deduplicated, and records keep the order
//! they arrived in.

use super::{Component, IrRecord};
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone)]
pub struct ComponentStore {
    components: BTreeMap<String, Component>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record` to its component, creating the component on first
    /// sight.
    ///
    /// `component_type` and `source_path` are only used on creation.
    pub fn upsert(
        &mut self,
        component_id: &str,
        component_type: &str,
        source_path: &str,
        record: IrRecord,
    ) {
        let component = self.ensure(component_id, component_type, source_path);
        match record {
            IrRecord::Structure(structure) => component.data_structures.push(structure),
            IrRecord::Function(function) => component.functions.push(function),
            IrRecord::Test(test) => component.test_specs.push(test),
        }
    }

    /// Get or create a component without adding records to it.
    pub fn ensure(&mut self, component_id: &str, component_type: &str, source_path: &str) -> &mut Component {
        self.components
            .entry(component_id.to_string())
            .or_insert_with(|| Component::new(component_id, component_type, source_path))
    }

    pub fn get(&self, component_id: &str) -> Option<&Component> {
        self.components.get(component_id)
    }

    /// Components in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn into_components(self) -> Vec<Component> {
        self.components.into_values().collect()
    }
}
