use std::sync::Arc;

use sql_mapper::prelude::*;

fn name_col() -> Expr {
    Expr::column("name")
}

fn rendered(registry: &MapperRegistry, expr: &Expr, dialect: Dialect) -> String {
    match registry.translate(expr, dialect) {
        Translated::Fragments(fragments) => render(&fragments),
        Translated::NotHandled => panic!("{dialect:?} did not handle {expr:?}"),
    }
}

#[test]
fn string_length_varies_by_dialect() {
    let registry = MapperRegistry::new();
    let expr = Expr::member("String", "Length", name_col());
    assert_eq!(rendered(&registry, &expr, Dialect::Postgres), "LENGTH(name)");
    assert_eq!(rendered(&registry, &expr, Dialect::Mssql), "LEN(name)");
    assert_eq!(rendered(&registry, &expr, Dialect::Mysql), "CHAR_LENGTH(name)");
    assert_eq!(rendered(&registry, &expr, Dialect::Oracle), "LENGTH(name)");
}

#[test]
fn index_of_shifts_between_zero_and_one_based() {
    let registry = MapperRegistry::new();
    let expr = Expr::call(
        "String",
        "IndexOf",
        name_col(),
        vec![Expr::value(SqlValue::Text("x".into()))],
    );
    // SQL Server's CHARINDEX is 1-based; source offsets are 0-based.
    assert_eq!(
        rendered(&registry, &expr, Dialect::Mssql),
        "(CHARINDEX('x', name) - 1)"
    );

    // With a 0-based profile no shift is emitted.
    registry.dialects().set_profile(
        Dialect::Mssql,
        DialectProfile {
            string_offset_base: OffsetBase::Zero,
        },
    );
    assert_eq!(
        rendered(&registry, &expr, Dialect::Mssql),
        "CHARINDEX('x', name)"
    );
}

#[test]
fn substring_shifts_the_start_offset_only() {
    let registry = MapperRegistry::new();
    let expr = Expr::call(
        "String",
        "Substring",
        name_col(),
        vec![Expr::value(SqlValue::Int(2)), Expr::value(SqlValue::Int(5))],
    );
    assert_eq!(
        rendered(&registry, &expr, Dialect::Postgres),
        "SUBSTRING(name, 3, 5)"
    );
    assert_eq!(
        rendered(&registry, &expr, Dialect::Sqlite),
        "SUBSTR(name, 3, 5)"
    );
}

#[test]
fn index_of_with_start_is_not_handled_on_two_argument_dialects() {
    let registry = MapperRegistry::new();
    let expr = Expr::call(
        "String",
        "IndexOf",
        name_col(),
        vec![
            Expr::value(SqlValue::Text("x".into())),
            Expr::value(SqlValue::Int(4)),
        ],
    );
    assert_eq!(registry.translate(&expr, Dialect::Postgres), Translated::NotHandled);
    assert_eq!(registry.translate(&expr, Dialect::Sqlite), Translated::NotHandled);
    // Oracle's INSTR takes a start offset natively; both the offset and the
    // 1-based result shift.
    assert_eq!(
        rendered(&registry, &expr, Dialect::Oracle),
        "(INSTR(name, 'x', 5) - 1)"
    );
}

#[test]
fn starts_with_inlines_closed_form_patterns() {
    let registry = MapperRegistry::new();
    let expr = Expr::call(
        "String",
        "StartsWith",
        name_col(),
        vec![Expr::value(SqlValue::Text("ab".into()))],
    );
    assert_eq!(rendered(&registry, &expr, Dialect::Postgres), "name LIKE 'ab%'");

    let dynamic = Expr::call(
        "String",
        "StartsWith",
        name_col(),
        vec![Expr::column("prefix")],
    );
    assert_eq!(
        rendered(&registry, &dynamic, Dialect::Postgres),
        "name LIKE prefix || '%'"
    );
    assert_eq!(
        rendered(&registry, &dynamic, Dialect::Mysql),
        "name LIKE CONCAT(prefix, '%')"
    );
}

#[test]
fn empty_in_lists_collapse_to_constant_predicates() {
    let registry = MapperRegistry::new();
    let target = name_col();
    let empty_in = Expr::call("Sql", "In", target.clone(), vec![Expr::Values(vec![])]);
    let empty_not_in = Expr::call("Sql", "NotIn", target.clone(), vec![Expr::Values(vec![])]);
    assert_eq!(rendered(&registry, &empty_in, Dialect::Postgres), "1=0");
    assert_eq!(rendered(&registry, &empty_not_in, Dialect::Postgres), "1=1");
}

#[test]
fn in_lists_inline_values_in_source_order() {
    let registry = MapperRegistry::new();
    let expr = Expr::call(
        "Sql",
        "In",
        name_col(),
        vec![Expr::Values(vec![
            SqlValue::Text("b".into()),
            SqlValue::Text("a".into()),
            SqlValue::Text("c".into()),
        ])],
    );
    assert_eq!(
        rendered(&registry, &expr, Dialect::Sqlite),
        "name IN ('b', 'a', 'c')"
    );
}

#[test]
fn null_equality_renders_as_is_null() {
    let registry = MapperRegistry::new();
    let eq = Expr::call("Sql", "Eq", name_col(), vec![Expr::value(SqlValue::Null)]);
    let ne = Expr::call("Sql", "Ne", name_col(), vec![Expr::value(SqlValue::Null)]);
    assert_eq!(rendered(&registry, &eq, Dialect::Postgres), "name IS NULL");
    assert_eq!(rendered(&registry, &ne, Dialect::Postgres), "name IS NOT NULL");

    let eq_value = Expr::call(
        "Sql",
        "Eq",
        name_col(),
        vec![Expr::value(SqlValue::Int(4))],
    );
    assert_eq!(rendered(&registry, &eq_value, Dialect::Postgres), "name = 4");
}

#[test]
fn unknown_member_is_not_handled_rather_than_an_error() {
    let registry = MapperRegistry::new();
    let expr = Expr::member("String", "NoSuchMember", name_col());
    assert_eq!(registry.translate(&expr, Dialect::Postgres), Translated::NotHandled);
}

#[test]
fn dialect_table_overrides_ansi_defaults() {
    let registry = MapperRegistry::new();
    let expr = Expr::call("String", "Trim", name_col(), vec![]);
    assert_eq!(rendered(&registry, &expr, Dialect::Mssql), "TRIM(name)");

    registry
        .dialects()
        .register_method(
            Dialect::Mssql,
            "String",
            "Trim",
            &[],
            Arc::new(|expr, _profile| {
                let Expr::Call {
                    target: Some(target),
                    ..
                } = expr
                else {
                    return None;
                };
                Some(vec![
                    Fragment::sql("LTRIM(RTRIM("),
                    Fragment::expr((**target).clone()),
                    Fragment::sql("))"),
                ])
            }),
        )
        .unwrap();
    assert_eq!(rendered(&registry, &expr, Dialect::Mssql), "LTRIM(RTRIM(name))");
    // Other dialects still use the defaults table.
    assert_eq!(rendered(&registry, &expr, Dialect::Postgres), "TRIM(name)");
}

#[test]
fn generic_calls_probe_exact_key_then_open_definition() {
    let registry = MapperRegistry::new();
    let cast = Expr::call_generic(
        "Sql",
        "Cast",
        name_col(),
        vec![],
        vec!["Int64".to_string()],
    );
    assert_eq!(
        rendered(&registry, &cast, Dialect::Postgres),
        "CAST(name AS BIGINT)"
    );
    assert_eq!(
        rendered(&registry, &cast, Dialect::Oracle),
        "CAST(name AS NUMBER(19))"
    );

    // No exact key for this type argument anywhere; an open generic
    // registration picks it up.
    let custom = Expr::call_generic(
        "Sql",
        "Parse",
        name_col(),
        vec![],
        vec!["Uuid".to_string()],
    );
    assert_eq!(registry.translate(&custom, Dialect::Postgres), Translated::NotHandled);
    registry
        .dialects()
        .register_method(
            Dialect::Postgres,
            "Sql",
            "Parse",
            &[],
            Arc::new(|expr, _profile| {
                let Expr::Call {
                    target: Some(target),
                    type_args,
                    ..
                } = expr
                else {
                    return None;
                };
                let ty = type_args.first()?;
                Some(vec![
                    Fragment::expr((**target).clone()),
                    Fragment::sql(format!("::{}", ty.to_lowercase())),
                ])
            }),
        )
        .unwrap();
    assert_eq!(rendered(&registry, &custom, Dialect::Postgres), "name::uuid");
}

#[test]
fn raw_templates_splice_arguments_by_position() {
    let registry = MapperRegistry::new();
    let expr = Expr::raw(
        "COALESCE({0}, {1})",
        vec![name_col(), Expr::value(SqlValue::Text("-".into()))],
    );
    assert_eq!(
        rendered(&registry, &expr, Dialect::Postgres),
        "COALESCE(name, '-')"
    );

    // An out-of-range placeholder degrades the whole expression to one
    // literal fragment, with the arguments it does use rendered in place.
    let bad = Expr::raw("COALESCE({0}, {3})", vec![name_col()]);
    assert_eq!(
        rendered(&registry, &bad, Dialect::Postgres),
        "COALESCE(name, {3})"
    );
}

#[test]
fn date_parts_vary_by_dialect() {
    let registry = MapperRegistry::new();
    let expr = Expr::member("DateTime", "Year", Expr::column("created_at"));
    assert_eq!(
        rendered(&registry, &expr, Dialect::Postgres),
        "EXTRACT(YEAR FROM created_at)"
    );
    assert_eq!(
        rendered(&registry, &expr, Dialect::Mssql),
        "DATEPART(YEAR, created_at)"
    );
    assert_eq!(
        rendered(&registry, &expr, Dialect::Sqlite),
        "CAST(STRFTIME('%Y', created_at) AS INTEGER)"
    );
}

#[test]
fn aggregate_helpers_come_from_the_ansi_table() {
    let registry = MapperRegistry::new();
    let count_all = Expr::call_static("Sql", "Count", vec![]);
    let sum = Expr::call("Sql", "Sum", Expr::column("total"), vec![]);
    for dialect in [Dialect::Postgres, Dialect::Mysql, Dialect::Oracle] {
        assert_eq!(rendered(&registry, &count_all, dialect), "COUNT(*)");
        assert_eq!(rendered(&registry, &sum, dialect), "SUM(total)");
    }
}
