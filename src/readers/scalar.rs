//! Built-in scalar handlers.
//!
//! Registered enum-first so that reverse-order lookup tries them as: typed
//! accessor, untyped fallback, optional unwrap, enum decode. Caller-registered
//! handlers are appended afterwards and therefore win over all of these.

use std::sync::Arc;

use crate::shape::TypeShape;
use crate::types::{ScalarKind, SqlValue};
use crate::value::Value;

use super::{ScalarHandler, ScalarReader};

pub(super) fn builtins() -> Vec<ScalarHandler> {
    vec![
        enum_decode(),
        optional_unwrap(),
        untyped_fallback(),
        typed_accessor(),
    ]
}

/// Type-named accessor on the cursor, guarded by a null check.
fn typed_accessor() -> ScalarHandler {
    ScalarHandler::new(
        "typed-accessor",
        |shape| matches!(shape, TypeShape::Scalar(kind) if *kind != ScalarKind::Object),
        |shape, _kind, _chain| {
            let TypeShape::Scalar(kind) = shape else {
                return None;
            };
            let kind = *kind;
            let reader: ScalarReader = Arc::new(move |cursor, idx| {
                if cursor.is_null(idx) {
                    return Value::Sql(SqlValue::Null);
                }
                let value = match kind {
                    ScalarKind::Int => cursor.get_int(idx).map(SqlValue::Int),
                    ScalarKind::Float => cursor.get_float(idx).map(SqlValue::Float),
                    ScalarKind::Text => cursor.get_text(idx).map(SqlValue::Text),
                    ScalarKind::Bool => cursor.get_bool(idx).map(SqlValue::Bool),
                    ScalarKind::Timestamp => cursor.get_timestamp(idx).map(SqlValue::Timestamp),
                    ScalarKind::Json => cursor.get_json(idx).map(SqlValue::Json),
                    ScalarKind::Blob => cursor.get_blob(idx).map(SqlValue::Blob),
                    ScalarKind::Object => None,
                };
                Value::Sql(value.unwrap_or(SqlValue::Null))
            });
            Some(reader)
        },
    )
}

/// Untyped cell read for `Object`-shaped targets.
fn untyped_fallback() -> ScalarHandler {
    ScalarHandler::new(
        "untyped-fallback",
        |shape| matches!(shape, TypeShape::Scalar(ScalarKind::Object)),
        |_shape, _kind, _chain| {
            let reader: ScalarReader = Arc::new(|cursor, idx| {
                if cursor.is_null(idx) {
                    return Value::Sql(SqlValue::Null);
                }
                Value::Sql(cursor.value(idx))
            });
            Some(reader)
        },
    )
}

/// Optional unwrap: compile the inner shape's reader, NULL cells stay NULL.
fn optional_unwrap() -> ScalarHandler {
    ScalarHandler::new(
        "optional-unwrap",
        |shape| matches!(shape, TypeShape::Optional(_)),
        |shape, kind, chain| {
            let TypeShape::Optional(inner) = shape else {
                return None;
            };
            let inner_reader = chain.compile_scalar(inner, kind)?;
            let reader: ScalarReader = Arc::new(move |cursor, idx| {
                if cursor.is_null(idx) {
                    return Value::Sql(SqlValue::Null);
                }
                inner_reader(cursor, idx)
            });
            Some(reader)
        },
    )
}

/// Enum decode via the integer accessor.
fn enum_decode() -> ScalarHandler {
    ScalarHandler::new(
        "enum-decode",
        |shape| matches!(shape, TypeShape::Enum { .. }),
        |_shape, _kind, _chain| {
            let reader: ScalarReader = Arc::new(|cursor, idx| {
                if cursor.is_null(idx) {
                    return Value::Sql(SqlValue::Null);
                }
                Value::Sql(cursor.get_int(idx).map(SqlValue::Int).unwrap_or(SqlValue::Null))
            });
            Some(reader)
        },
    )
}
