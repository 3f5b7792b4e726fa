//! Read handler registry: ordered chains mapping a target shape to either a
//! single-column scalar read or a whole-value aggregate read.
//!
//! Both chains are append-only and searched in reverse registration order, so
//! a later registration shadows an earlier one for the shapes it matches
//! without erasing the earlier handler for shapes only it matches. Mutation
//! swaps a fresh `Arc` under the write lock; readers clone the current
//! snapshot and never observe a partial chain.

mod aggregate;
mod scalar;

use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::cursor::Cursor;
use crate::error::SqlMapperError;
use crate::projection::ProjectionCompiler;
use crate::shape::TypeShape;
use crate::types::{CursorKind, SqlValue};
use crate::value::{Table, Value};

/// Compiled single-column read: `(cursor, column index) -> value`.
pub type ScalarReader = Arc<dyn Fn(&mut dyn Cursor, usize) -> Value + Send + Sync>;

/// Compiled whole-value read; may consume many rows.
pub type AggregateReader =
    Arc<dyn Fn(&mut dyn Cursor) -> Result<Value, SqlMapperError> + Send + Sync>;

pub type MatchFn = Arc<dyn Fn(&TypeShape) -> bool + Send + Sync>;
pub type ScalarCompileFn =
    Arc<dyn Fn(&TypeShape, CursorKind, &ReadHandlers) -> Option<ScalarReader> + Send + Sync>;
pub type AggregateCompileFn = Arc<
    dyn Fn(
            &TypeShape,
            CursorKind,
            &ProjectionCompiler,
        ) -> Result<Option<AggregateReader>, SqlMapperError>
        + Send
        + Sync,
>;

/// Predicate + builder pair for single-column reads.
#[derive(Clone)]
pub struct ScalarHandler {
    name: &'static str,
    matches: MatchFn,
    compile: ScalarCompileFn,
}

impl ScalarHandler {
    pub fn new(
        name: &'static str,
        matches: impl Fn(&TypeShape) -> bool + Send + Sync + 'static,
        compile: impl Fn(&TypeShape, CursorKind, &ReadHandlers) -> Option<ScalarReader>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        ScalarHandler {
            name,
            matches: Arc::new(matches),
            compile: Arc::new(compile),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Predicate + builder pair for whole-value reads.
#[derive(Clone)]
pub struct AggregateHandler {
    name: &'static str,
    matches: MatchFn,
    compile: AggregateCompileFn,
}

impl AggregateHandler {
    pub fn new(
        name: &'static str,
        matches: impl Fn(&TypeShape) -> bool + Send + Sync + 'static,
        compile: impl Fn(
            &TypeShape,
            CursorKind,
            &ProjectionCompiler,
        ) -> Result<Option<AggregateReader>, SqlMapperError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        AggregateHandler {
            name,
            matches: Arc::new(matches),
            compile: Arc::new(compile),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Append-only scalar and aggregate handler chains.
pub struct ReadHandlers {
    scalars: RwLock<Arc<Vec<ScalarHandler>>>,
    aggregates: RwLock<Arc<Vec<AggregateHandler>>>,
}

impl Default for ReadHandlers {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ReadHandlers {
    /// Empty chains; every read of an unhandled shape fails.
    #[must_use]
    pub fn empty() -> Self {
        ReadHandlers {
            scalars: RwLock::new(Arc::new(Vec::new())),
            aggregates: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Chains preloaded with the built-in handlers. Registration order is the
    /// reverse of lookup order: the typed-accessor scalar handler and the
    /// tabular-snapshot aggregate handler are tried first.
    #[must_use]
    pub fn with_defaults() -> Self {
        ReadHandlers {
            scalars: RwLock::new(Arc::new(scalar::builtins())),
            aggregates: RwLock::new(Arc::new(aggregate::builtins())),
        }
    }

    /// Append a scalar handler; it shadows earlier handlers for shapes it
    /// matches. Handlers cannot be removed.
    pub fn push_scalar(&self, handler: ScalarHandler) -> Result<(), SqlMapperError> {
        if handler.name.is_empty() {
            return Err(SqlMapperError::RegistrationError(
                "scalar handler name must not be empty".into(),
            ));
        }
        debug!(handler = handler.name, "register scalar read handler");
        let mut guard = self
            .scalars
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut next = guard.as_ref().clone();
        next.push(handler);
        *guard = Arc::new(next);
        Ok(())
    }

    /// Append an aggregate handler; same shadowing rule as scalars.
    pub fn push_aggregate(&self, handler: AggregateHandler) -> Result<(), SqlMapperError> {
        if handler.name.is_empty() {
            return Err(SqlMapperError::RegistrationError(
                "aggregate handler name must not be empty".into(),
            ));
        }
        debug!(handler = handler.name, "register aggregate read handler");
        let mut guard = self
            .aggregates
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut next = guard.as_ref().clone();
        next.push(handler);
        *guard = Arc::new(next);
        Ok(())
    }

    fn scalar_snapshot(&self) -> Arc<Vec<ScalarHandler>> {
        self.scalars
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn aggregate_snapshot(&self) -> Arc<Vec<AggregateHandler>> {
        self.aggregates
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Does any scalar handler claim this shape? Drives the column-vs-nested
    /// decision during column map construction.
    #[must_use]
    pub fn scalar_matches(&self, shape: &TypeShape) -> bool {
        self.scalar_snapshot().iter().any(|h| (h.matches)(shape))
    }

    /// Resolve a scalar reader for `shape`, latest registration first. A
    /// matching handler that declines to compile falls through to earlier
    /// handlers.
    #[must_use]
    pub fn compile_scalar(&self, shape: &TypeShape, kind: CursorKind) -> Option<ScalarReader> {
        let chain = self.scalar_snapshot();
        for handler in chain.iter().rev() {
            if (handler.matches)(shape)
                && let Some(reader) = (handler.compile)(shape, kind, self)
            {
                return Some(reader);
            }
        }
        None
    }

    /// Resolve an aggregate reader for `shape`, latest registration first.
    pub fn compile_aggregate(
        &self,
        shape: &TypeShape,
        kind: CursorKind,
        compiler: &ProjectionCompiler,
    ) -> Result<Option<AggregateReader>, SqlMapperError> {
        let chain = self.aggregate_snapshot();
        for handler in chain.iter().rev() {
            if (handler.matches)(shape)
                && let Some(reader) = (handler.compile)(shape, kind, compiler)?
            {
                return Ok(Some(reader));
            }
        }
        Ok(None)
    }
}

/// The zero-value a shape degrades to when the cursor is empty or no
/// projector exists: NULL for scalars, empty containers, `Absent` for
/// entities and tuples.
#[must_use]
pub fn zero_value(shape: &TypeShape) -> Value {
    match shape {
        TypeShape::Scalar(_) | TypeShape::Optional(_) | TypeShape::Enum { .. } => {
            Value::Sql(SqlValue::Null)
        }
        TypeShape::Set(_) => Value::Set(Vec::new()),
        TypeShape::Queue(_) => Value::Queue(Vec::new()),
        TypeShape::Stack(_) => Value::Stack(Vec::new()),
        TypeShape::Seq(_) => Value::Seq(Vec::new()),
        TypeShape::Array { len, .. } => Value::Seq(vec![Value::Absent; *len]),
        TypeShape::Tuple(_) | TypeShape::Entity(_) => Value::Absent,
        TypeShape::Table => Value::Table(Table::default()),
    }
}
