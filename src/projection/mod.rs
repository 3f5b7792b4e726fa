//! Projection compiler: builds and caches, per (cursor-kind, entity-shape),
//! a plan that materializes rows into records, handling nested entities and
//! absent columns.
//!
//! Plans are compiled exactly once per key under a double-checked slot and
//! never invalidated: registry changes for a shape have no effect once its
//! plan is cached, so all custom handlers and resolvers must be registered
//! before first use of a shape.

mod column_map;
mod cursor_shape;

pub use column_map::{ColumnEntry, ColumnMap, NestedEntry};
pub use cursor_shape::CursorShape;

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use tracing::{debug, trace};

use crate::cursor::Cursor;
use crate::error::SqlMapperError;
use crate::readers::{ReadHandlers, ScalarReader};
use crate::resolver::Resolvers;
use crate::shape::{EntityShape, TypeShape};
use crate::types::CursorKind;
use crate::value::{Record, Value};

type Slot = Arc<OnceLock<Option<Arc<CompiledProjector>>>>;

struct Inner {
    resolvers: Arc<Resolvers>,
    handlers: Arc<ReadHandlers>,
    maps: Mutex<HashMap<&'static str, Arc<ColumnMap>>>,
    slots: Mutex<HashMap<(CursorKind, &'static str), Slot>>,
    compile_count: AtomicUsize,
}

/// Shared projection compiler. Cloning is cheap and clones share all caches.
#[derive(Clone)]
pub struct ProjectionCompiler {
    inner: Arc<Inner>,
}

impl ProjectionCompiler {
    #[must_use]
    pub fn new(resolvers: Arc<Resolvers>, handlers: Arc<ReadHandlers>) -> Self {
        ProjectionCompiler {
            inner: Arc::new(Inner {
                resolvers,
                handlers,
                maps: Mutex::new(HashMap::new()),
                slots: Mutex::new(HashMap::new()),
                compile_count: AtomicUsize::new(0),
            }),
        }
    }

    #[must_use]
    pub fn handlers(&self) -> &ReadHandlers {
        &self.inner.handlers
    }

    #[must_use]
    pub fn resolvers(&self) -> &Resolvers {
        &self.inner.resolvers
    }

    /// Number of plan compilations so far; each (cursor-kind, shape) pair
    /// compiles at most once.
    #[must_use]
    pub fn compile_count(&self) -> usize {
        self.inner.compile_count.load(Ordering::SeqCst)
    }

    /// Column map for a shape, built on first access under lock; the first
    /// build wins and stays stable for the process lifetime.
    pub(crate) fn column_map_for(&self, shape: &'static EntityShape) -> Arc<ColumnMap> {
        {
            let maps = self
                .inner
                .maps
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(map) = maps.get(shape.name) {
                return map.clone();
            }
        }
        let built = Arc::new(ColumnMap::build(
            shape,
            &self.inner.resolvers,
            &self.inner.handlers,
        ));
        let mut maps = self
            .inner
            .maps
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        maps.entry(shape.name).or_insert(built).clone()
    }

    /// Compiled projector for (cursor kind, shape); `None` when the shape has
    /// no constructor. Rejects cyclic shape graphs up front.
    pub fn projector_for(
        &self,
        kind: CursorKind,
        shape: &'static EntityShape,
    ) -> Result<Option<Arc<CompiledProjector>>, SqlMapperError> {
        ensure_acyclic(shape)?;
        let slot = {
            let mut slots = self
                .inner
                .slots
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            slots
                .entry((kind, shape.name))
                .or_insert_with(|| Arc::new(OnceLock::new()))
                .clone()
        };
        Ok(slot.get_or_init(|| self.compile(kind, shape)).clone())
    }

    fn compile(
        &self,
        kind: CursorKind,
        shape: &'static EntityShape,
    ) -> Option<Arc<CompiledProjector>> {
        self.inner.compile_count.fetch_add(1, Ordering::SeqCst);
        if !shape.has_constructor {
            debug!(entity = shape.name, %kind, "no constructor; shape gets no projector");
            return None;
        }
        debug!(entity = shape.name, %kind, "compiling projector");
        let map = self.column_map_for(shape);
        let mut fields: Vec<FieldReader> = Vec::with_capacity(map.property_count);
        for index in 0..map.property_count {
            if let Some(entry) = map.columns.iter().find(|c| c.property_index == index) {
                match self.inner.handlers.compile_scalar(&entry.shape, kind) {
                    Some(reader) => fields.push(FieldReader::Scalar(reader)),
                    None => {
                        trace!(
                            entity = shape.name,
                            column = %entry.name,
                            "scalar handler declined to compile; field left unmapped"
                        );
                        fields.push(FieldReader::Unmapped);
                    }
                }
            } else if let Some(pos) = map.nested.iter().position(|n| n.property_index == index) {
                // Acyclicity was checked for the whole reachable graph above,
                // so the nested compile cannot fail.
                let projector = self
                    .projector_for(kind, map.nested[pos].shape)
                    .ok()
                    .flatten();
                fields.push(FieldReader::Nested {
                    nested_index: pos,
                    projector,
                });
            } else {
                fields.push(FieldReader::Unmapped);
            }
        }
        Some(Arc::new(CompiledProjector {
            shape,
            map,
            fields,
            shapes: Mutex::new(HashMap::new()),
        }))
    }
}

/// Depth-first walk over the reachable shape graph; a shape on the current
/// path twice means infinite recursion at compile time.
fn ensure_acyclic(shape: &'static EntityShape) -> Result<(), SqlMapperError> {
    fn visit(
        shape: &'static EntityShape,
        stack: &mut Vec<&'static str>,
    ) -> Result<(), SqlMapperError> {
        if stack.contains(&shape.name) {
            return Err(SqlMapperError::CyclicEntity(format!(
                "entity shape {} participates in a cycle: {}",
                shape.name,
                stack.join(" -> ")
            )));
        }
        stack.push(shape.name);
        for property in shape.mapped_properties() {
            visit_type(&property.shape, stack)?;
        }
        stack.pop();
        Ok(())
    }

    fn visit_type(
        shape: &TypeShape,
        stack: &mut Vec<&'static str>,
    ) -> Result<(), SqlMapperError> {
        match shape {
            TypeShape::Entity(entity) => visit(entity(), stack),
            TypeShape::Optional(inner)
            | TypeShape::Set(inner)
            | TypeShape::Queue(inner)
            | TypeShape::Stack(inner)
            | TypeShape::Seq(inner) => visit_type(inner, stack),
            TypeShape::Array { elem, .. } => visit_type(elem, stack),
            TypeShape::Tuple(elems) => {
                for elem in elems {
                    visit_type(elem, stack)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    let mut stack = Vec::new();
    visit(shape, &mut stack)
}

enum FieldReader {
    Scalar(ScalarReader),
    Nested {
        nested_index: usize,
        projector: Option<Arc<CompiledProjector>>,
    },
    Unmapped,
}

/// Compiled row-to-record plan for one (cursor kind, entity shape) pair.
pub struct CompiledProjector {
    shape: &'static EntityShape,
    map: Arc<ColumnMap>,
    fields: Vec<FieldReader>,
    // Cursor shapes by column-layout fingerprint, built on first encounter.
    shapes: Mutex<HashMap<u64, Arc<CursorShape>>>,
}

impl CompiledProjector {
    #[must_use]
    pub fn entity(&self) -> &'static EntityShape {
        self.shape
    }

    /// Cursor shape for this cursor's column layout, cached per layout
    /// fingerprint with a double-checked lock.
    #[must_use]
    pub fn shape_for(&self, cursor: &dyn Cursor, compiler: &ProjectionCompiler) -> Arc<CursorShape> {
        let physical: Vec<(String, usize)> = (0..cursor.column_count())
            .map(|i| (cursor.column_name(i).to_string(), i))
            .collect();
        let fingerprint = fingerprint(&physical);
        {
            let shapes = self
                .shapes
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(shape) = shapes.get(&fingerprint) {
                return shape.clone();
            }
        }
        let built = Arc::new(CursorShape::build(&self.map, &physical, compiler));
        let mut shapes = self
            .shapes
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        shapes.entry(fingerprint).or_insert(built).clone()
    }

    /// Materialize the current row. Absent columns and absent nested shapes
    /// yield zero-values; the cursor is not advanced.
    #[must_use]
    pub fn project(&self, cursor: &mut dyn Cursor, shape: &CursorShape) -> Record {
        let mut fields = Vec::with_capacity(self.map.property_count);
        for (index, field) in self.fields.iter().enumerate() {
            let value = match field {
                FieldReader::Scalar(reader) => match shape.columns.get(index).copied().flatten() {
                    Some(physical) => reader(cursor, physical),
                    None => Value::Absent,
                },
                FieldReader::Nested {
                    nested_index,
                    projector,
                } => match (shape.nested.get(*nested_index), projector) {
                    (Some(Some(nested_shape)), Some(projector)) => {
                        Value::Entity(projector.project(cursor, nested_shape))
                    }
                    _ => Value::Absent,
                },
                FieldReader::Unmapped => Value::Absent,
            };
            fields.push(value);
        }
        Record::with_index(
            self.shape.name,
            self.map.names.clone(),
            fields,
            self.map.name_index.clone(),
        )
    }
}

fn fingerprint(physical: &[(String, usize)]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for (name, idx) in physical {
        name.hash(&mut hasher);
        idx.hash(&mut hasher);
    }
    hasher.finish()
}
