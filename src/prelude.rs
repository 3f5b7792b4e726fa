//! Convenient imports for common functionality.
//!
//! Re-exports the types most callers need: the registry facade, the consumed
//! contracts, the shape and value model, and the dialect IR.

pub use crate::binder::{AttachFn, BindKind, BindValue, ParameterBinder};
pub use crate::command::{Command, Parameter, ParameterList};
pub use crate::cursor::Cursor;
pub use crate::dialect::{
    DialectProfile, DialectRegistry, Expr, Fragment, OffsetBase, Translated, render,
};
pub use crate::error::SqlMapperError;
pub use crate::readers::{AggregateHandler, ReadHandlers, ScalarHandler, zero_value};
pub use crate::registry::MapperRegistry;
pub use crate::resolver::Resolvers;
pub use crate::projection::{CompiledProjector, ProjectionCompiler};
pub use crate::shape::{EntityRef, EntityShape, EntityShapeBuilder, PropertyShape, TypeShape};
pub use crate::tx::{
    AsyncBeginTx, AsyncTxHandle, BeginTx, TxHandle, with_transaction, with_transaction_async,
};
pub use crate::types::{CursorKind, Dialect, ScalarKind, SqlValue};
pub use crate::value::{Entity, Record, Table, TableRow, Value};

#[cfg(feature = "test-utils")]
pub use crate::test_utils::{RecordingCommand, VecCursor};
