use std::sync::LazyLock;

use sql_mapper::prelude::*;

static USER: LazyLock<EntityShape> = LazyLock::new(|| {
    EntityShape::builder("User")
        .property("Id", TypeShape::Scalar(ScalarKind::Int))
        .identity()
        .property("Name", TypeShape::Scalar(ScalarKind::Text))
        .property("Active", TypeShape::Scalar(ScalarKind::Bool))
        .property("Score", TypeShape::optional(TypeShape::Scalar(ScalarKind::Float)))
        .finish()
});

#[derive(Debug, PartialEq)]
struct User {
    id: i64,
    name: String,
    active: bool,
    score: Option<f64>,
}

impl Entity for User {
    fn shape() -> &'static EntityShape {
        &USER
    }

    fn from_record(record: &Record) -> Self {
        User {
            id: record
                .get("Id")
                .and_then(Value::as_sql)
                .and_then(SqlValue::as_int)
                .unwrap_or(0),
            name: record
                .get("Name")
                .and_then(Value::as_sql)
                .and_then(SqlValue::as_text)
                .unwrap_or("")
                .to_string(),
            active: record
                .get("Active")
                .and_then(Value::as_sql)
                .and_then(SqlValue::as_bool)
                .unwrap_or(false),
            score: record
                .get("Score")
                .and_then(Value::as_sql)
                .and_then(SqlValue::as_float),
        }
    }
}

#[test]
fn projects_scalar_columns_by_name() {
    let registry = MapperRegistry::new();
    let mut cursor = VecCursor::new(
        &["Id", "Name", "Active", "Score"],
        vec![vec![
            SqlValue::Int(7),
            SqlValue::Text("alice".into()),
            SqlValue::Bool(true),
            SqlValue::Float(9.5),
        ]],
    );
    let user: User = registry.read_one(&mut cursor).unwrap().unwrap();
    assert_eq!(
        user,
        User {
            id: 7,
            name: "alice".into(),
            active: true,
            score: Some(9.5),
        }
    );
}

#[test]
fn extra_cursor_columns_are_ignored() {
    let registry = MapperRegistry::new();
    let mut cursor = VecCursor::new(
        &["Unrelated", "Id", "Name", "Active", "AlsoUnrelated"],
        vec![vec![
            SqlValue::Text("noise".into()),
            SqlValue::Int(1),
            SqlValue::Text("bob".into()),
            SqlValue::Bool(false),
            SqlValue::Int(99),
        ]],
    );
    let user: User = registry.read_one(&mut cursor).unwrap().unwrap();
    assert_eq!(user.id, 1);
    assert_eq!(user.name, "bob");
    // No "Score" column in this cursor at all.
    assert_eq!(user.score, None);
}

#[test]
fn null_cells_read_as_null_not_error() {
    let registry = MapperRegistry::new();
    let mut cursor = VecCursor::new(
        &["Id", "Name", "Active", "Score"],
        vec![vec![
            SqlValue::Int(2),
            SqlValue::Null,
            SqlValue::Bool(true),
            SqlValue::Null,
        ]],
    );
    let user: User = registry.read_one(&mut cursor).unwrap().unwrap();
    assert_eq!(user.name, "");
    assert_eq!(user.score, None);
}

#[test]
fn empty_cursor_reads_none() {
    let registry = MapperRegistry::new();
    let mut cursor = VecCursor::new(&["Id", "Name", "Active"], vec![]);
    let user: Option<User> = registry.read_one(&mut cursor).unwrap();
    assert!(user.is_none());
}

#[test]
fn empty_cursor_value_read_degrades_to_zero_value() {
    let registry = MapperRegistry::new();

    let mut cursor = VecCursor::new(&["n"], vec![]);
    let scalar = registry
        .read_value(&mut cursor, &TypeShape::Scalar(ScalarKind::Int))
        .unwrap();
    assert_eq!(scalar, Value::Sql(SqlValue::Null));

    let mut cursor = VecCursor::new(&["n"], vec![]);
    let seq = registry
        .read_value(&mut cursor, &TypeShape::seq(TypeShape::Scalar(ScalarKind::Int)))
        .unwrap();
    assert_eq!(seq, Value::Seq(Vec::new()));

    let mut cursor = VecCursor::new(&["n"], vec![]);
    let entity = registry
        .read_value(&mut cursor, &TypeShape::entity(|| &USER))
        .unwrap();
    assert!(entity.is_absent());
}

#[test]
fn read_many_consumes_every_row() {
    let registry = MapperRegistry::new();
    let mut cursor = VecCursor::new(
        &["Id", "Name", "Active"],
        vec![
            vec![SqlValue::Int(1), SqlValue::Text("a".into()), SqlValue::Bool(true)],
            vec![SqlValue::Int(2), SqlValue::Text("b".into()), SqlValue::Bool(false)],
            vec![SqlValue::Int(3), SqlValue::Text("c".into()), SqlValue::Bool(true)],
        ],
    );
    let users: Vec<User> = registry.read_many(&mut cursor).unwrap();
    assert_eq!(users.len(), 3);
    assert_eq!(users[2].id, 3);
    assert!(!cursor.advance());
}

#[test]
fn explicit_column_attribute_wins_over_property_name() {
    static RENAMED: LazyLock<EntityShape> = LazyLock::new(|| {
        EntityShape::builder("Renamed")
            .property("Title", TypeShape::Scalar(ScalarKind::Text))
            .column("post_title")
            .finish()
    });

    let registry = MapperRegistry::new();
    let mut cursor = VecCursor::new(
        &["Title", "post_title"],
        vec![vec![
            SqlValue::Text("wrong".into()),
            SqlValue::Text("right".into()),
        ]],
    );
    let record = registry.read_record(&mut cursor, &RENAMED).unwrap().unwrap();
    // Record fields stay keyed by property name even with a column tag.
    assert_eq!(
        record.get("Title").and_then(Value::as_sql).and_then(SqlValue::as_text),
        Some("right")
    );
}

#[test]
fn ignored_properties_never_map() {
    static PARTIAL: LazyLock<EntityShape> = LazyLock::new(|| {
        EntityShape::builder("Partial")
            .property("Kept", TypeShape::Scalar(ScalarKind::Int))
            .property("Skipped", TypeShape::Scalar(ScalarKind::Int))
            .ignored()
            .finish()
    });

    let registry = MapperRegistry::new();
    let mut cursor = VecCursor::new(
        &["Kept", "Skipped"],
        vec![vec![SqlValue::Int(10), SqlValue::Int(20)]],
    );
    let record = registry.read_record(&mut cursor, &PARTIAL).unwrap().unwrap();
    assert_eq!(
        record.get("Kept").and_then(Value::as_sql).and_then(SqlValue::as_int),
        Some(10)
    );
    assert!(record.get("Skipped").is_none());
}
