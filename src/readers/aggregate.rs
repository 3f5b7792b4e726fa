//! Built-in aggregate handlers.
//!
//! Registered entity-fallback-first so that reverse-order lookup tries:
//! tabular snapshot, generic containers, fixed-arity tuples, nested entity.
//! Aggregate readers run against a cursor positioned on the first row of the
//! value being read; container loops intentionally consume the cursor to
//! exhaustion, so a container-typed read must be the last read of its result
//! set.

use std::sync::Arc;

use crate::cursor::Cursor;
use crate::error::SqlMapperError;
use crate::projection::{CompiledProjector, ProjectionCompiler};
use crate::shape::TypeShape;
use crate::types::CursorKind;
use crate::value::{Table, Value};

use super::{AggregateHandler, AggregateReader, ScalarReader};

pub(super) fn builtins() -> Vec<AggregateHandler> {
    vec![entity_fallback(), tuple(), containers(), table_snapshot()]
}

/// Whole-cursor snapshot: every column of every remaining row.
fn table_snapshot() -> AggregateHandler {
    AggregateHandler::new(
        "table-snapshot",
        |shape| matches!(shape, TypeShape::Table),
        |_shape, _kind, _compiler| {
            let reader: AggregateReader = Arc::new(|cursor| {
                let count = cursor.column_count();
                let names = Arc::new(
                    (0..count)
                        .map(|i| cursor.column_name(i).to_string())
                        .collect::<Vec<_>>(),
                );
                let mut table = Table::with_capacity(8);
                table.set_column_names(names);
                loop {
                    let row = (0..count).map(|i| cursor.value(i)).collect();
                    table.push_row(row);
                    if !cursor.advance() {
                        break;
                    }
                }
                Ok(Value::Table(table))
            });
            Ok(Some(reader))
        },
    )
}

enum ContainerKind {
    Set,
    Queue,
    Stack,
    Seq,
    Array(usize),
}

/// How one container element is read off the current row.
enum ElementReader {
    Scalar(ScalarReader),
    Entity(Option<Arc<CompiledProjector>>),
}

impl ElementReader {
    fn resolve(
        elem: &TypeShape,
        kind: CursorKind,
        compiler: &ProjectionCompiler,
    ) -> Result<ElementReader, SqlMapperError> {
        if let Some(reader) = compiler.handlers().compile_scalar(elem, kind) {
            return Ok(ElementReader::Scalar(reader));
        }
        if let TypeShape::Entity(shape) = elem {
            return Ok(ElementReader::Entity(compiler.projector_for(kind, shape())?));
        }
        Err(SqlMapperError::ProjectionError(format!(
            "container element shape {} is neither scalar-readable nor an entity",
            elem.label()
        )))
    }
}

/// Generic containers: construct empty, then read/append/advance until the
/// cursor ends.
fn containers() -> AggregateHandler {
    AggregateHandler::new(
        "containers",
        |shape| {
            matches!(
                shape,
                TypeShape::Set(_)
                    | TypeShape::Queue(_)
                    | TypeShape::Stack(_)
                    | TypeShape::Seq(_)
                    | TypeShape::Array { .. }
            )
        },
        |shape, kind, compiler| {
            let (container, elem) = match shape {
                TypeShape::Set(e) => (ContainerKind::Set, e.as_ref()),
                TypeShape::Queue(e) => (ContainerKind::Queue, e.as_ref()),
                TypeShape::Stack(e) => (ContainerKind::Stack, e.as_ref()),
                TypeShape::Seq(e) => (ContainerKind::Seq, e.as_ref()),
                TypeShape::Array { elem, len } => (ContainerKind::Array(*len), elem.as_ref()),
                _ => return Ok(None),
            };
            let element = ElementReader::resolve(elem, kind, compiler)?;
            let compiler = compiler.clone();
            let reader: AggregateReader = Arc::new(move |cursor| {
                let mut items = read_elements(cursor, &element, &compiler, &container)?;
                Ok(match container {
                    ContainerKind::Set => Value::Set(items),
                    ContainerKind::Queue => Value::Queue(items),
                    ContainerKind::Stack => Value::Stack(items),
                    ContainerKind::Seq => Value::Seq(items),
                    ContainerKind::Array(len) => {
                        items.truncate(len);
                        while items.len() < len {
                            items.push(Value::Absent);
                        }
                        Value::Seq(items)
                    }
                })
            });
            Ok(Some(reader))
        },
    )
}

fn read_elements(
    cursor: &mut dyn Cursor,
    element: &ElementReader,
    compiler: &ProjectionCompiler,
    container: &ContainerKind,
) -> Result<Vec<Value>, SqlMapperError> {
    let mut items: Vec<Value> = Vec::new();
    // Unique-element containers collapse duplicates; ordered kinds keep them.
    let dedup = matches!(container, ContainerKind::Set);
    let mut push = |items: &mut Vec<Value>, value: Value| {
        if !dedup || !items.contains(&value) {
            items.push(value);
        }
    };
    match element {
        ElementReader::Scalar(reader) => loop {
            let value = reader(cursor, 0);
            push(&mut items, value);
            if !cursor.advance() {
                break;
            }
        },
        ElementReader::Entity(Some(projector)) => {
            let cursor_shape = projector.shape_for(cursor, compiler);
            loop {
                let value = Value::Entity(projector.project(cursor, &cursor_shape));
                push(&mut items, value);
                if !cursor.advance() {
                    break;
                }
            }
        }
        // No constructor for the element shape: each row degrades to the
        // zero-value, the cursor is still consumed.
        ElementReader::Entity(None) => loop {
            push(&mut items, Value::Absent);
            if !cursor.advance() {
                break;
            }
        },
    }
    Ok(items)
}

/// Fixed-arity tuples (1-8): N sequential columns from physical index 0.
fn tuple() -> AggregateHandler {
    AggregateHandler::new(
        "tuple",
        |shape| matches!(shape, TypeShape::Tuple(elems) if (1..=8).contains(&elems.len())),
        |shape, kind, compiler| {
            let TypeShape::Tuple(elems) = shape else {
                return Ok(None);
            };
            let mut readers = Vec::with_capacity(elems.len());
            for elem in elems {
                let reader = compiler.handlers().compile_scalar(elem, kind).ok_or_else(|| {
                    SqlMapperError::ProjectionError(format!(
                        "tuple element shape {} has no scalar handler",
                        elem.label()
                    ))
                })?;
                readers.push(reader);
            }
            let reader: AggregateReader = Arc::new(move |cursor| {
                let values = readers
                    .iter()
                    .enumerate()
                    .map(|(idx, read)| read(cursor, idx))
                    .collect();
                Ok(Value::Tuple(values))
            });
            Ok(Some(reader))
        },
    )
}

/// Fallback: treat the shape as a nested entity with its own compiled plan.
fn entity_fallback() -> AggregateHandler {
    AggregateHandler::new(
        "entity",
        |shape| matches!(shape, TypeShape::Entity(_)),
        |shape, kind, compiler| {
            let TypeShape::Entity(entity) = shape else {
                return Ok(None);
            };
            let projector = compiler.projector_for(kind, entity())?;
            let compiler = compiler.clone();
            let reader: AggregateReader = Arc::new(move |cursor| match &projector {
                Some(projector) => {
                    let cursor_shape = projector.shape_for(cursor, &compiler);
                    Ok(Value::Entity(projector.project(cursor, &cursor_shape)))
                }
                // No constructor: reads degrade to the zero-value.
                None => Ok(Value::Absent),
            });
            Ok(Some(reader))
        },
    )
}
