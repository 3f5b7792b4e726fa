use std::sync::{Arc, LazyLock};

use sql_mapper::prelude::*;

static DOC: LazyLock<EntityShape> = LazyLock::new(|| {
    EntityShape::builder("Doc")
        .property("Title", TypeShape::Scalar(ScalarKind::Text))
        .finish()
});

fn uppercase_text_handler() -> ScalarHandler {
    ScalarHandler::new(
        "uppercase-text",
        |shape| matches!(shape, TypeShape::Scalar(ScalarKind::Text)),
        |_shape, _kind, _chain| {
            Some(Arc::new(|cursor: &mut dyn Cursor, idx| {
                match cursor.get_text(idx) {
                    Some(text) => Value::Sql(SqlValue::Text(text.to_uppercase())),
                    None => Value::Sql(SqlValue::Null),
                }
            }))
        },
    )
}

#[test]
fn later_registration_shadows_builtin_for_matching_shapes() {
    let registry = MapperRegistry::new();
    registry.handlers().push_scalar(uppercase_text_handler()).unwrap();

    let mut cursor = VecCursor::new(&["Title"], vec![vec![SqlValue::Text("quiet".into())]]);
    let record = registry.read_record(&mut cursor, &DOC).unwrap().unwrap();
    assert_eq!(
        record.get("Title").and_then(Value::as_sql).and_then(SqlValue::as_text),
        Some("QUIET")
    );

    // Non-text shapes still go through the builtin chain.
    let mut cursor = VecCursor::new(&["n"], vec![vec![SqlValue::Int(3)]]);
    let value = registry
        .read_value(&mut cursor, &TypeShape::Scalar(ScalarKind::Int))
        .unwrap();
    assert_eq!(value, Value::Sql(SqlValue::Int(3)));
}

#[test]
fn declining_handler_falls_through_to_earlier_ones() {
    let registry = MapperRegistry::new();
    registry
        .handlers()
        .push_scalar(ScalarHandler::new(
            "declines-everything",
            |shape| matches!(shape, TypeShape::Scalar(_)),
            |_shape, _kind, _chain| None,
        ))
        .unwrap();

    let mut cursor = VecCursor::new(&["n"], vec![vec![SqlValue::Int(42)]]);
    let value = registry
        .read_value(&mut cursor, &TypeShape::Scalar(ScalarKind::Int))
        .unwrap();
    assert_eq!(value, Value::Sql(SqlValue::Int(42)));
}

#[test]
fn empty_handler_name_is_rejected() {
    let registry = MapperRegistry::new();
    let err = registry
        .handlers()
        .push_scalar(ScalarHandler::new(
            "",
            |_| true,
            |_, _, _| None,
        ))
        .unwrap_err();
    assert!(matches!(err, SqlMapperError::RegistrationError(_)));
}

#[test]
fn plans_compile_once_per_cursor_kind_and_shape() {
    let registry = MapperRegistry::new();

    for _ in 0..3 {
        let mut cursor =
            VecCursor::new(&["Title"], vec![vec![SqlValue::Text("a".into())]]);
        registry.read_record(&mut cursor, &DOC).unwrap().unwrap();
    }
    assert_eq!(registry.compiler().compile_count(), 1);

    // A different cursor kind gets its own plan.
    let mut cursor = VecCursor::new(&["Title"], vec![vec![SqlValue::Text("a".into())]])
        .with_kind(CursorKind("other"));
    registry.read_record(&mut cursor, &DOC).unwrap().unwrap();
    assert_eq!(registry.compiler().compile_count(), 2);
}

#[test]
fn compiled_plans_survive_later_registrations() {
    let registry = MapperRegistry::new();

    let mut cursor = VecCursor::new(&["Title"], vec![vec![SqlValue::Text("before".into())]]);
    let record = registry.read_record(&mut cursor, &DOC).unwrap().unwrap();
    assert_eq!(
        record.get("Title").and_then(Value::as_sql).and_then(SqlValue::as_text),
        Some("before")
    );

    // Registered too late: the plan for (vec, Doc) is already compiled.
    registry.handlers().push_scalar(uppercase_text_handler()).unwrap();

    let mut cursor = VecCursor::new(&["Title"], vec![vec![SqlValue::Text("after".into())]]);
    let record = registry.read_record(&mut cursor, &DOC).unwrap().unwrap();
    assert_eq!(
        record.get("Title").and_then(Value::as_sql).and_then(SqlValue::as_text),
        Some("after")
    );
    assert_eq!(registry.compiler().compile_count(), 1);
}

#[test]
fn concurrent_first_reads_compile_exactly_once() {
    static WIDE: LazyLock<EntityShape> = LazyLock::new(|| {
        EntityShape::builder("Wide")
            .property("A", TypeShape::Scalar(ScalarKind::Int))
            .property("B", TypeShape::Scalar(ScalarKind::Text))
            .property("C", TypeShape::Scalar(ScalarKind::Bool))
            .finish()
    });

    let registry = Arc::new(MapperRegistry::new());
    std::thread::scope(|scope| {
        for _ in 0..16 {
            let registry = registry.clone();
            scope.spawn(move || {
                let mut cursor = VecCursor::new(
                    &["A", "B", "C"],
                    vec![vec![
                        SqlValue::Int(1),
                        SqlValue::Text("t".into()),
                        SqlValue::Bool(true),
                    ]],
                );
                let record = registry.read_record(&mut cursor, &WIDE).unwrap().unwrap();
                assert_eq!(
                    record.get("A").and_then(Value::as_sql).and_then(SqlValue::as_int),
                    Some(1)
                );
            });
        }
    });
    assert_eq!(registry.compiler().compile_count(), 1);
}
