//! Naming strategy registry: table name, column name, and identity property
//! resolution. Each slot holds one function and a later registration replaces
//! the previous one (single slot, last wins). Resolvers are pure; changing
//! them only affects plans compiled afterwards.

use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::SqlMapperError;
use crate::shape::{EntityShape, PropertyShape};

pub type TableNameFn = Arc<dyn Fn(&EntityShape) -> String + Send + Sync>;
pub type ColumnNameFn = Arc<dyn Fn(&EntityShape, &PropertyShape) -> String + Send + Sync>;
pub type IdentityFn =
    Arc<dyn for<'a> Fn(&'a EntityShape) -> Option<&'a PropertyShape> + Send + Sync>;

struct ResolverSet {
    table_name: TableNameFn,
    column_name: ColumnNameFn,
    identity: IdentityFn,
}

impl ResolverSet {
    fn defaults() -> Self {
        ResolverSet {
            table_name: Arc::new(default_table_name),
            column_name: Arc::new(default_column_name),
            identity: Arc::new(default_identity),
        }
    }
}

fn default_table_name(shape: &EntityShape) -> String {
    shape.table.unwrap_or(shape.name).to_string()
}

fn default_column_name(_shape: &EntityShape, property: &PropertyShape) -> String {
    property.column.unwrap_or(property.name).to_string()
}

/// Walk mapped properties in declaration order: an explicit identity marker
/// wins, else the first property named `Id` or `<ShapeName>Id`.
fn default_identity(shape: &EntityShape) -> Option<&PropertyShape> {
    if let Some(marked) = shape.mapped_properties().find(|p| p.identity) {
        return Some(marked);
    }
    let typed_id = format!("{}Id", shape.name);
    shape
        .mapped_properties()
        .find(|p| p.name.eq_ignore_ascii_case("Id") || p.name.eq_ignore_ascii_case(&typed_id))
}

/// Resolver registry. Reads clone an `Arc` snapshot; writes swap in a fresh
/// set so concurrent readers never observe a partial update.
pub struct Resolvers {
    inner: RwLock<Arc<ResolverSet>>,
}

impl Default for Resolvers {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolvers {
    #[must_use]
    pub fn new() -> Self {
        Resolvers {
            inner: RwLock::new(Arc::new(ResolverSet::defaults())),
        }
    }

    fn snapshot(&self) -> Arc<ResolverSet> {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn swap(&self, update: impl FnOnce(&ResolverSet) -> ResolverSet) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let next = update(&guard);
        *guard = Arc::new(next);
    }

    /// Replace the table-name resolver.
    pub fn set_table_name(&self, f: TableNameFn) -> Result<(), SqlMapperError> {
        debug!("resolver override: table name");
        self.swap(|cur| ResolverSet {
            table_name: f,
            column_name: cur.column_name.clone(),
            identity: cur.identity.clone(),
        });
        Ok(())
    }

    /// Replace the column-name resolver.
    pub fn set_column_name(&self, f: ColumnNameFn) -> Result<(), SqlMapperError> {
        debug!("resolver override: column name");
        self.swap(|cur| ResolverSet {
            table_name: cur.table_name.clone(),
            column_name: f,
            identity: cur.identity.clone(),
        });
        Ok(())
    }

    /// Replace the identity-property resolver.
    pub fn set_identity(&self, f: IdentityFn) -> Result<(), SqlMapperError> {
        debug!("resolver override: identity property");
        self.swap(|cur| ResolverSet {
            table_name: cur.table_name.clone(),
            column_name: cur.column_name.clone(),
            identity: f,
        });
        Ok(())
    }

    #[must_use]
    pub fn table_name(&self, shape: &EntityShape) -> String {
        (self.snapshot().table_name)(shape)
    }

    #[must_use]
    pub fn column_name(&self, shape: &EntityShape, property: &PropertyShape) -> String {
        (self.snapshot().column_name)(shape, property)
    }

    #[must_use]
    pub fn identity<'a>(&self, shape: &'a EntityShape) -> Option<&'a PropertyShape> {
        (self.snapshot().identity)(shape)
    }
}
