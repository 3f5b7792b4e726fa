//! Built-in translation tables: per-dialect string, date/time, and cast
//! handlers, plus the dialect-independent shape helpers registered under
//! `Ansi` and consulted by every dialect.

use std::sync::Arc;

use crate::types::{Dialect, SqlValue};

use super::expr::Expr;
use super::fragment::{Fragment, sql_literal};
use super::{DialectProfile, DialectRegistry, TranslateFn};

pub(super) fn install(registry: &DialectRegistry) {
    strings(registry);
    dates(registry);
    casts(registry);
    shape_helpers(registry);
}

fn target_of(expr: &Expr) -> Option<&Expr> {
    match expr {
        Expr::Member { target, .. } => Some(target),
        Expr::Call {
            target: Some(target),
            ..
        } => Some(target),
        _ => None,
    }
}

fn args_of(expr: &Expr) -> &[Expr] {
    if let Expr::Call { args, .. } = expr {
        args
    } else {
        &[]
    }
}

/// Unary operand: the target when present, else the first argument.
fn operand_of(expr: &Expr) -> Option<&Expr> {
    target_of(expr).or_else(|| args_of(expr).first())
}

/// `prefix <target> suffix`
fn wrap(prefix: &'static str, suffix: &'static str) -> TranslateFn {
    Arc::new(move |expr, _profile| {
        let target = target_of(expr)?;
        Some(vec![
            Fragment::sql(prefix),
            Fragment::expr(target.clone()),
            Fragment::sql(suffix),
        ])
    })
}

/// Fixed text, e.g. `NOW()`.
fn text(sql: &'static str) -> TranslateFn {
    Arc::new(move |_expr, _profile| Some(vec![Fragment::sql(sql)]))
}

/// Push a 0-based source offset, shifted to 1-based when the profile says so.
fn push_offset(out: &mut Vec<Fragment>, offset: &Expr, profile: &DialectProfile) {
    if profile.one_based() {
        if let Expr::Value(SqlValue::Int(i)) = offset {
            out.push(Fragment::sql((i + 1).to_string()));
        } else {
            out.push(Fragment::expr(offset.clone()));
            out.push(Fragment::sql(" + 1"));
        }
    } else {
        out.push(Fragment::expr(offset.clone()));
    }
}

/// The dialect's native index-of function family.
#[derive(Clone, Copy)]
enum IndexOf {
    /// `STRPOS(s, sub)`; no start-offset form.
    Strpos,
    /// `INSTR(s, sub[, start])`.
    Instr { with_start: bool },
    /// `CHARINDEX(sub, s[, start])`.
    Charindex,
    /// `LOCATE(sub, s[, start])`.
    Locate,
}

fn index_of(style: IndexOf) -> TranslateFn {
    Arc::new(move |expr, profile| {
        let target = target_of(expr)?;
        let args = args_of(expr);
        let needle = args.first()?;
        let start = args.get(1);
        let mut out = Vec::new();
        let shift = profile.one_based();
        if shift {
            out.push(Fragment::sql("("));
        }
        match style {
            IndexOf::Strpos | IndexOf::Instr { with_start: false } => {
                // Two-argument function; an explicit start offset is not
                // expressible, so decline and let the caller fall back.
                if start.is_some() {
                    return None;
                }
                let name = if matches!(style, IndexOf::Strpos) {
                    "STRPOS("
                } else {
                    "INSTR("
                };
                out.push(Fragment::sql(name));
                out.push(Fragment::expr(target.clone()));
                out.push(Fragment::sql(", "));
                out.push(Fragment::expr(needle.clone()));
            }
            IndexOf::Instr { with_start: true } => {
                out.push(Fragment::sql("INSTR("));
                out.push(Fragment::expr(target.clone()));
                out.push(Fragment::sql(", "));
                out.push(Fragment::expr(needle.clone()));
                if let Some(start) = start {
                    out.push(Fragment::sql(", "));
                    push_offset(&mut out, start, profile);
                }
            }
            IndexOf::Charindex | IndexOf::Locate => {
                let name = if matches!(style, IndexOf::Charindex) {
                    "CHARINDEX("
                } else {
                    "LOCATE("
                };
                out.push(Fragment::sql(name));
                out.push(Fragment::expr(needle.clone()));
                out.push(Fragment::sql(", "));
                out.push(Fragment::expr(target.clone()));
                if let Some(start) = start {
                    out.push(Fragment::sql(", "));
                    push_offset(&mut out, start, profile);
                }
            }
        }
        out.push(Fragment::sql(")"));
        if shift {
            // Native result is 1-based; callers expect 0-based.
            out.push(Fragment::sql(" - 1)"));
        }
        Some(out)
    })
}

fn substring(name: &'static str) -> TranslateFn {
    Arc::new(move |expr, profile| {
        let target = target_of(expr)?;
        let args = args_of(expr);
        let start = args.first()?;
        let mut out = vec![
            Fragment::sql(format!("{name}(")),
            Fragment::expr(target.clone()),
            Fragment::sql(", "),
        ];
        push_offset(&mut out, start, profile);
        if let Some(len) = args.get(1) {
            out.push(Fragment::sql(", "));
            out.push(Fragment::expr(len.clone()));
        }
        out.push(Fragment::sql(")"));
        Some(out)
    })
}

/// How the dialect concatenates strings.
#[derive(Clone, Copy)]
enum Concat {
    Pipes,
    Plus,
    Func,
}

fn concat(style: Concat) -> TranslateFn {
    Arc::new(move |expr, _profile| {
        let target = target_of(expr)?;
        let args = args_of(expr);
        let mut out = Vec::new();
        match style {
            Concat::Pipes | Concat::Plus => {
                let op = if matches!(style, Concat::Pipes) {
                    " || "
                } else {
                    " + "
                };
                out.push(Fragment::expr(target.clone()));
                for arg in args {
                    out.push(Fragment::sql(op));
                    out.push(Fragment::expr(arg.clone()));
                }
            }
            Concat::Func => {
                out.push(Fragment::sql("CONCAT("));
                out.push(Fragment::expr(target.clone()));
                for arg in args {
                    out.push(Fragment::sql(", "));
                    out.push(Fragment::expr(arg.clone()));
                }
                out.push(Fragment::sql(")"));
            }
        }
        Some(out)
    })
}

/// `LIKE 'lit%'` for a closed-form needle, dialect-native concatenation with
/// `'%'` otherwise.
fn affix_match(style: Concat, prefix_match: bool) -> TranslateFn {
    Arc::new(move |expr, _profile| {
        let target = target_of(expr)?;
        let needle = args_of(expr).first()?;
        let mut out = vec![Fragment::expr(target.clone()), Fragment::sql(" LIKE ")];
        if let Expr::Value(SqlValue::Text(s)) = needle {
            let pattern = if prefix_match {
                format!("{s}%")
            } else {
                format!("%{s}")
            };
            out.push(Fragment::sql(sql_literal(&SqlValue::Text(pattern))));
            return Some(out);
        }
        match style {
            Concat::Pipes => {
                if prefix_match {
                    out.push(Fragment::expr(needle.clone()));
                    out.push(Fragment::sql(" || '%'"));
                } else {
                    out.push(Fragment::sql("'%' || "));
                    out.push(Fragment::expr(needle.clone()));
                }
            }
            Concat::Plus => {
                if prefix_match {
                    out.push(Fragment::expr(needle.clone()));
                    out.push(Fragment::sql(" + '%'"));
                } else {
                    out.push(Fragment::sql("'%' + "));
                    out.push(Fragment::expr(needle.clone()));
                }
            }
            Concat::Func => {
                out.push(Fragment::sql("CONCAT("));
                if !prefix_match {
                    out.push(Fragment::sql("'%', "));
                }
                out.push(Fragment::expr(needle.clone()));
                if prefix_match {
                    out.push(Fragment::sql(", '%'"));
                }
                out.push(Fragment::sql(")"));
            }
        }
        Some(out)
    })
}

struct StringTable {
    dialect: Dialect,
    length: &'static str,
    index_of: IndexOf,
    substring: &'static str,
    concat: Concat,
}

fn strings(registry: &DialectRegistry) {
    let tables = [
        StringTable {
            dialect: Dialect::Postgres,
            length: "LENGTH(",
            index_of: IndexOf::Strpos,
            substring: "SUBSTRING",
            concat: Concat::Pipes,
        },
        StringTable {
            dialect: Dialect::Sqlite,
            length: "LENGTH(",
            index_of: IndexOf::Instr { with_start: false },
            substring: "SUBSTR",
            concat: Concat::Pipes,
        },
        StringTable {
            dialect: Dialect::Mssql,
            length: "LEN(",
            index_of: IndexOf::Charindex,
            substring: "SUBSTRING",
            concat: Concat::Plus,
        },
        StringTable {
            dialect: Dialect::Mysql,
            length: "CHAR_LENGTH(",
            index_of: IndexOf::Locate,
            substring: "SUBSTRING",
            concat: Concat::Func,
        },
        StringTable {
            dialect: Dialect::Oracle,
            length: "LENGTH(",
            index_of: IndexOf::Instr { with_start: true },
            substring: "SUBSTR",
            concat: Concat::Pipes,
        },
    ];
    for table in tables {
        let d = table.dialect;
        let _ = registry.register_member(d, "String", "Length", wrap(table.length, ")"));
        let _ = registry.register_method(d, "String", "IndexOf", &[], index_of(table.index_of));
        let _ = registry.register_method(d, "String", "Substring", &[], substring(table.substring));
        let _ = registry.register_method(d, "String", "Concat", &[], concat(table.concat));
        let _ = registry.register_method(
            d,
            "String",
            "StartsWith",
            &[],
            affix_match(table.concat, true),
        );
        let _ = registry.register_method(
            d,
            "String",
            "EndsWith",
            &[],
            affix_match(table.concat, false),
        );
    }
    // Identical everywhere; registered once under the defaults table.
    let _ = registry.register_method(Dialect::Ansi, "String", "ToUpper", &[], wrap("UPPER(", ")"));
    let _ = registry.register_method(Dialect::Ansi, "String", "ToLower", &[], wrap("LOWER(", ")"));
    let _ = registry.register_method(Dialect::Ansi, "String", "Trim", &[], wrap("TRIM(", ")"));
}

fn extract(part: &'static str) -> TranslateFn {
    Arc::new(move |expr, _profile| {
        let target = target_of(expr)?;
        Some(vec![
            Fragment::sql(format!("EXTRACT({part} FROM ")),
            Fragment::expr(target.clone()),
            Fragment::sql(")"),
        ])
    })
}

fn datepart(part: &'static str) -> TranslateFn {
    Arc::new(move |expr, _profile| {
        let target = target_of(expr)?;
        Some(vec![
            Fragment::sql(format!("DATEPART({part}, ")),
            Fragment::expr(target.clone()),
            Fragment::sql(")"),
        ])
    })
}

fn strftime_int(fmt: &'static str) -> TranslateFn {
    Arc::new(move |expr, _profile| {
        let target = target_of(expr)?;
        Some(vec![
            Fragment::sql(format!("CAST(STRFTIME('{fmt}', ")),
            Fragment::expr(target.clone()),
            Fragment::sql(") AS INTEGER)"),
        ])
    })
}

fn dates(registry: &DialectRegistry) {
    use Dialect::{Mssql, Mysql, Oracle, Postgres, Sqlite};

    let _ = registry.register_method(Postgres, "DateTime", "Now", &[], text("NOW()"));
    let _ = registry.register_method(Mysql, "DateTime", "Now", &[], text("NOW()"));
    let _ = registry.register_method(Mssql, "DateTime", "Now", &[], text("GETDATE()"));
    let _ = registry.register_method(
        Sqlite,
        "DateTime",
        "Now",
        &[],
        text("DATETIME('now', 'localtime')"),
    );
    let _ = registry.register_method(Oracle, "DateTime", "Now", &[], text("SYSDATE"));

    let _ = registry.register_method(
        Postgres,
        "DateTime",
        "UtcNow",
        &[],
        text("(NOW() AT TIME ZONE 'UTC')"),
    );
    let _ = registry.register_method(Mysql, "DateTime", "UtcNow", &[], text("UTC_TIMESTAMP()"));
    let _ = registry.register_method(Mssql, "DateTime", "UtcNow", &[], text("GETUTCDATE()"));
    let _ = registry.register_method(Sqlite, "DateTime", "UtcNow", &[], text("DATETIME('now')"));
    let _ = registry.register_method(
        Oracle,
        "DateTime",
        "UtcNow",
        &[],
        text("SYS_EXTRACT_UTC(SYSTIMESTAMP)"),
    );

    for d in [Postgres, Mssql, Mysql] {
        let _ = registry.register_member(d, "DateTime", "Date", wrap("CAST(", " AS DATE)"));
    }
    let _ = registry.register_member(Sqlite, "DateTime", "Date", wrap("DATE(", ")"));
    let _ = registry.register_member(Oracle, "DateTime", "Date", wrap("TRUNC(", ")"));

    for (member, part, fmt) in [
        ("Year", "YEAR", "%Y"),
        ("Month", "MONTH", "%m"),
        ("Day", "DAY", "%d"),
    ] {
        for d in [Postgres, Mysql, Oracle] {
            let _ = registry.register_member(d, "DateTime", member, extract(part));
        }
        let _ = registry.register_member(Mssql, "DateTime", member, datepart(part));
        let _ = registry.register_member(Sqlite, "DateTime", member, strftime_int(fmt));
    }
}

const CAST_TYPES: [&str; 6] = ["Int32", "Int64", "Float", "Decimal", "String", "DateTime"];

fn cast(types: &'static [(&'static str, &'static str)]) -> TranslateFn {
    Arc::new(move |expr, _profile| {
        let target = target_of(expr)?;
        let Expr::Call { type_args, .. } = expr else {
            return None;
        };
        let requested = type_args.first()?;
        let sql_type = types
            .iter()
            .find(|(name, _)| *name == requested.as_str())
            .map(|(_, sql)| *sql)?;
        Some(vec![
            Fragment::sql("CAST("),
            Fragment::expr(target.clone()),
            Fragment::sql(format!(" AS {sql_type})")),
        ])
    })
}

fn casts(registry: &DialectRegistry) {
    static POSTGRES: [(&str, &str); 6] = [
        ("Int32", "INTEGER"),
        ("Int64", "BIGINT"),
        ("Float", "DOUBLE PRECISION"),
        ("Decimal", "NUMERIC"),
        ("String", "VARCHAR"),
        ("DateTime", "TIMESTAMP"),
    ];
    static SQLITE: [(&str, &str); 6] = [
        ("Int32", "INTEGER"),
        ("Int64", "INTEGER"),
        ("Float", "REAL"),
        ("Decimal", "NUMERIC"),
        ("String", "TEXT"),
        ("DateTime", "TEXT"),
    ];
    static MSSQL: [(&str, &str); 6] = [
        ("Int32", "INT"),
        ("Int64", "BIGINT"),
        ("Float", "FLOAT"),
        ("Decimal", "DECIMAL(28, 10)"),
        ("String", "NVARCHAR(MAX)"),
        ("DateTime", "DATETIME2"),
    ];
    static MYSQL: [(&str, &str); 6] = [
        ("Int32", "SIGNED"),
        ("Int64", "SIGNED"),
        ("Float", "DOUBLE"),
        ("Decimal", "DECIMAL(28, 10)"),
        ("String", "CHAR"),
        ("DateTime", "DATETIME"),
    ];
    static ORACLE: [(&str, &str); 6] = [
        ("Int32", "NUMBER(10)"),
        ("Int64", "NUMBER(19)"),
        ("Float", "BINARY_DOUBLE"),
        ("Decimal", "NUMBER"),
        ("String", "VARCHAR2(4000)"),
        ("DateTime", "TIMESTAMP"),
    ];
    let tables: [(Dialect, &'static [(&str, &str)]); 5] = [
        (Dialect::Postgres, &POSTGRES),
        (Dialect::Sqlite, &SQLITE),
        (Dialect::Mssql, &MSSQL),
        (Dialect::Mysql, &MYSQL),
        (Dialect::Oracle, &ORACLE),
    ];
    for (dialect, types) in tables {
        for ty in CAST_TYPES {
            let _ = registry.register_method(dialect, "Sql", "Cast", &[ty], cast(types));
        }
    }
}

fn unary(prefix: &'static str, suffix: &'static str) -> TranslateFn {
    Arc::new(move |expr, _profile| {
        let operand = operand_of(expr)?;
        Some(vec![
            Fragment::sql(prefix),
            Fragment::expr(operand.clone()),
            Fragment::sql(suffix),
        ])
    })
}

fn list_predicate(negated: bool) -> TranslateFn {
    Arc::new(move |expr, _profile| {
        let target = target_of(expr)?;
        let keyword = if negated { " NOT IN (" } else { " IN (" };
        match args_of(expr).first() {
            Some(Expr::Values(values)) => {
                if values.is_empty() {
                    // Empty closed-form list: IN is always false, NOT IN
                    // always true.
                    return Some(vec![Fragment::sql(if negated { "1=1" } else { "1=0" })]);
                }
                let list = values
                    .iter()
                    .map(sql_literal)
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(vec![
                    Fragment::expr(target.clone()),
                    Fragment::sql(format!("{keyword}{list})")),
                ])
            }
            Some(other) => Some(vec![
                Fragment::expr(target.clone()),
                Fragment::sql(keyword),
                Fragment::expr(other.clone()),
                Fragment::sql(")"),
            ]),
            None => None,
        }
    })
}

fn between(negated: bool) -> TranslateFn {
    Arc::new(move |expr, _profile| {
        let target = target_of(expr)?;
        let args = args_of(expr);
        let (low, high) = (args.first()?, args.get(1)?);
        Some(vec![
            Fragment::expr(target.clone()),
            Fragment::sql(if negated { " NOT BETWEEN " } else { " BETWEEN " }),
            Fragment::expr(low.clone()),
            Fragment::sql(" AND "),
            Fragment::expr(high.clone()),
        ])
    })
}

fn comparison(negated: bool) -> TranslateFn {
    Arc::new(move |expr, _profile| {
        let target = target_of(expr)?;
        let rhs = args_of(expr).first()?;
        // Closed-form NULL comparand renders as IS [NOT] NULL, never = NULL.
        if matches!(rhs, Expr::Value(SqlValue::Null)) {
            return Some(vec![
                Fragment::expr(target.clone()),
                Fragment::sql(if negated { " IS NOT NULL" } else { " IS NULL" }),
            ]);
        }
        Some(vec![
            Fragment::expr(target.clone()),
            Fragment::sql(if negated { " <> " } else { " = " }),
            Fragment::expr(rhs.clone()),
        ])
    })
}

fn like(negated: bool) -> TranslateFn {
    Arc::new(move |expr, _profile| {
        let target = target_of(expr)?;
        let pattern = args_of(expr).first()?;
        Some(vec![
            Fragment::expr(target.clone()),
            Fragment::sql(if negated { " NOT LIKE " } else { " LIKE " }),
            Fragment::expr(pattern.clone()),
        ])
    })
}

fn count() -> TranslateFn {
    Arc::new(|expr, _profile| match operand_of(expr) {
        Some(operand) => Some(vec![
            Fragment::sql("COUNT("),
            Fragment::expr(operand.clone()),
            Fragment::sql(")"),
        ]),
        None => Some(vec![Fragment::sql("COUNT(*)")]),
    })
}

fn shape_helpers(registry: &DialectRegistry) {
    let d = Dialect::Ansi;
    let _ = registry.register_method(d, "Sql", "Asc", &[], unary("", " ASC"));
    let _ = registry.register_method(d, "Sql", "Desc", &[], unary("", " DESC"));
    let _ = registry.register_method(d, "Sql", "Distinct", &[], unary("DISTINCT ", ""));
    let _ = registry.register_method(d, "Sql", "Min", &[], unary("MIN(", ")"));
    let _ = registry.register_method(d, "Sql", "Max", &[], unary("MAX(", ")"));
    let _ = registry.register_method(d, "Sql", "Sum", &[], unary("SUM(", ")"));
    let _ = registry.register_method(d, "Sql", "Avg", &[], unary("AVG(", ")"));
    let _ = registry.register_method(d, "Sql", "Count", &[], count());
    let _ = registry.register_method(d, "Sql", "Exists", &[], unary("EXISTS (", ")"));
    let _ = registry.register_method(d, "Sql", "NotExists", &[], unary("NOT EXISTS (", ")"));
    let _ = registry.register_method(d, "Sql", "Like", &[], like(false));
    let _ = registry.register_method(d, "Sql", "NotLike", &[], like(true));
    let _ = registry.register_method(d, "Sql", "In", &[], list_predicate(false));
    let _ = registry.register_method(d, "Sql", "NotIn", &[], list_predicate(true));
    let _ = registry.register_method(d, "Sql", "Between", &[], between(false));
    let _ = registry.register_method(d, "Sql", "NotBetween", &[], between(true));
    let _ = registry.register_method(d, "Sql", "Eq", &[], comparison(false));
    let _ = registry.register_method(d, "Sql", "Ne", &[], comparison(true));
}
