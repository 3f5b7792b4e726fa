//! The top-level mapper facade: one shared set of resolvers, read handler
//! chains, a projection compiler, the dialect translation tables, and the
//! parameter binder.

use std::sync::Arc;

use tracing::trace;

use crate::binder::{BindValue, ParameterBinder};
use crate::command::Command;
use crate::cursor::Cursor;
use crate::dialect::{DialectRegistry, Expr, Translated};
use crate::error::SqlMapperError;
use crate::readers::{ReadHandlers, zero_value};
use crate::resolver::Resolvers;
use crate::projection::ProjectionCompiler;
use crate::shape::{EntityShape, TypeShape};
use crate::types::Dialect;
use crate::value::{Entity, Record, Value};

/// Shared mapper state. Construct once, register customizations, then share
/// across threads; all registries are internally synchronized.
pub struct MapperRegistry {
    resolvers: Arc<Resolvers>,
    handlers: Arc<ReadHandlers>,
    compiler: ProjectionCompiler,
    dialects: DialectRegistry,
    binder: ParameterBinder,
}

impl Default for MapperRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MapperRegistry {
    /// Registry preloaded with the built-in read handlers and dialect
    /// translation tables.
    #[must_use]
    pub fn new() -> Self {
        let resolvers = Arc::new(Resolvers::new());
        let handlers = Arc::new(ReadHandlers::with_defaults());
        let compiler = ProjectionCompiler::new(resolvers.clone(), handlers.clone());
        MapperRegistry {
            resolvers,
            handlers,
            compiler,
            dialects: DialectRegistry::with_defaults(),
            binder: ParameterBinder::new(),
        }
    }

    #[must_use]
    pub fn resolvers(&self) -> &Resolvers {
        &self.resolvers
    }

    #[must_use]
    pub fn handlers(&self) -> &ReadHandlers {
        &self.handlers
    }

    #[must_use]
    pub fn compiler(&self) -> &ProjectionCompiler {
        &self.compiler
    }

    #[must_use]
    pub fn dialects(&self) -> &DialectRegistry {
        &self.dialects
    }

    #[must_use]
    pub fn binder(&self) -> &ParameterBinder {
        &self.binder
    }

    /// Read one value of `shape` from the cursor. Advances once; an already
    /// exhausted cursor yields the shape's zero-value. Aggregate handlers are
    /// consulted before scalar handlers; a scalar read takes column 0.
    pub fn read_value(
        &self,
        cursor: &mut dyn Cursor,
        shape: &TypeShape,
    ) -> Result<Value, SqlMapperError> {
        let kind = cursor.kind();
        if !cursor.advance() {
            trace!(%kind, shape = %shape.label(), "empty cursor; zero-value");
            return Ok(zero_value(shape));
        }
        if let Some(reader) = self.handlers.compile_aggregate(shape, kind, &self.compiler)? {
            return reader(cursor);
        }
        if let Some(reader) = self.handlers.compile_scalar(shape, kind) {
            return Ok(reader(cursor, 0));
        }
        Err(SqlMapperError::ProjectionError(format!(
            "no read handler accepts shape {}",
            shape.label()
        )))
    }

    /// Materialize the next row as a record of `shape`, or `None` when the
    /// cursor is exhausted.
    pub fn read_record(
        &self,
        cursor: &mut dyn Cursor,
        shape: &'static EntityShape,
    ) -> Result<Option<Record>, SqlMapperError> {
        let kind = cursor.kind();
        let Some(projector) = self.compiler.projector_for(kind, shape)? else {
            return Err(SqlMapperError::ProjectionError(format!(
                "entity shape {} has no constructor",
                shape.name
            )));
        };
        if !cursor.advance() {
            return Ok(None);
        }
        let layout = projector.shape_for(cursor, &self.compiler);
        Ok(Some(projector.project(cursor, &layout)))
    }

    /// Typed single-row read.
    pub fn read_one<T: Entity>(
        &self,
        cursor: &mut dyn Cursor,
    ) -> Result<Option<T>, SqlMapperError> {
        Ok(self
            .read_record(cursor, T::shape())?
            .map(|record| T::from_record(&record)))
    }

    /// Typed whole-cursor read; consumes every remaining row.
    pub fn read_many<T: Entity>(&self, cursor: &mut dyn Cursor) -> Result<Vec<T>, SqlMapperError> {
        let shape = T::shape();
        let kind = cursor.kind();
        let Some(projector) = self.compiler.projector_for(kind, shape)? else {
            return Err(SqlMapperError::ProjectionError(format!(
                "entity shape {} has no constructor",
                shape.name
            )));
        };
        let mut out = Vec::new();
        while cursor.advance() {
            let layout = projector.shape_for(cursor, &self.compiler);
            let record = projector.project(cursor, &layout);
            out.push(T::from_record(&record));
        }
        Ok(out)
    }

    /// Translate one expression IR node for a dialect.
    #[must_use]
    pub fn translate(&self, expr: &Expr, dialect: Dialect) -> Translated {
        self.dialects.translate(expr, dialect)
    }

    /// Attach a runtime value to a command as a named parameter.
    pub fn bind_parameter(
        &self,
        command: &mut dyn Command,
        name: &str,
        value: &BindValue,
    ) -> Result<(), SqlMapperError> {
        self.binder.bind(command, name, value)
    }
}
