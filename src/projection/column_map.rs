//! Per-entity column maps: resolved column names to stable property indices,
//! plus nested-entity descriptors keyed by the `"<PropertyName>."` prefix.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::readers::ReadHandlers;
use crate::resolver::Resolvers;
use crate::shape::{EntityShape, TypeShape};

/// A property read from a single physical column.
#[derive(Clone)]
pub struct ColumnEntry {
    pub property_index: usize,
    /// Resolved column name; exact match against physical column names.
    pub name: String,
    pub shape: TypeShape,
}

/// A property mapped as a nested entity under a column-name prefix.
#[derive(Clone)]
pub struct NestedEntry {
    pub property_index: usize,
    pub name: String,
    /// `"<PropertyName>."`; the trailing delimiter disambiguates a property
    /// whose name is a strict prefix of a sibling's.
    pub prefix: String,
    pub shape: &'static EntityShape,
}

/// Ordered mapping for one entity shape. Built once per shape under lock;
/// property indices stay stable for the process lifetime.
pub struct ColumnMap {
    pub shape: &'static EntityShape,
    /// Property names by property index, shared with every record projected
    /// from this map. Records are keyed by property name; resolved column
    /// names matter only for physical matching.
    pub names: Arc<Vec<String>>,
    pub(crate) name_index: Arc<HashMap<String, usize>>,
    pub columns: Vec<ColumnEntry>,
    /// Nested descriptors in registration (declaration) order.
    pub nested: Vec<NestedEntry>,
    pub property_count: usize,
}

impl ColumnMap {
    /// Walk mapped properties in declaration order: a scalar-handled shape
    /// becomes a column, an entity shape becomes a nested descriptor, and
    /// anything else is left unmapped (always reads as the zero-value).
    pub(crate) fn build(
        shape: &'static EntityShape,
        resolvers: &Resolvers,
        handlers: &ReadHandlers,
    ) -> ColumnMap {
        let mut names = Vec::new();
        let mut columns = Vec::new();
        let mut nested = Vec::new();

        for property in shape.mapped_properties() {
            let property_index = names.len();
            let resolved = resolvers.column_name(shape, property);
            if handlers.scalar_matches(&property.shape) {
                columns.push(ColumnEntry {
                    property_index,
                    name: resolved.clone(),
                    shape: property.shape.clone(),
                });
            } else if let TypeShape::Entity(nested_shape) = &property.shape {
                nested.push(NestedEntry {
                    property_index,
                    name: resolved.clone(),
                    prefix: format!("{}.", property.name),
                    shape: nested_shape(),
                });
            } else {
                trace!(
                    entity = shape.name,
                    property = property.name,
                    shape = %property.shape.label(),
                    "property shape is neither scalar-readable nor an entity; left unmapped"
                );
            }
            names.push(property.name.to_string());
        }

        let name_index = Arc::new(
            names
                .iter()
                .enumerate()
                .map(|(i, n)| (n.clone(), i))
                .collect::<HashMap<_, _>>(),
        );
        let property_count = names.len();
        ColumnMap {
            shape,
            names: Arc::new(names),
            name_index,
            columns,
            nested,
            property_count,
        }
    }

    pub(crate) fn column_by_name(&self, name: &str) -> Option<&ColumnEntry> {
        self.columns.iter().find(|c| c.name == name)
    }
}
