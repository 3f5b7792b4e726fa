//! Translated SQL fragments and closed-form literal rendering.

use chrono::NaiveDateTime;

use crate::types::SqlValue;

use super::expr::Expr;

/// One piece of translated SQL: literal text, or a nested expression the
/// external SQL-text assembler recurses into.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Sql(String),
    Expr(Expr),
}

impl Fragment {
    #[must_use]
    pub fn sql(text: impl Into<String>) -> Fragment {
        Fragment::Sql(text.into())
    }

    #[must_use]
    pub fn expr(expr: Expr) -> Fragment {
        Fragment::Expr(expr)
    }

    #[must_use]
    pub fn as_sql(&self) -> Option<&str> {
        if let Fragment::Sql(text) = self {
            Some(text)
        } else {
            None
        }
    }
}

/// Render fragments to text for tests and diagnostics, flattening nested
/// column/literal expressions. Calls and members render as placeholders; the
/// real assembler recurses through the registry instead.
#[must_use]
pub fn render(fragments: &[Fragment]) -> String {
    let mut out = String::new();
    for fragment in fragments {
        match fragment {
            Fragment::Sql(text) => out.push_str(text),
            Fragment::Expr(Expr::Column { table, name }) => {
                if let Some(table) = table {
                    out.push_str(table);
                    out.push('.');
                }
                out.push_str(name);
            }
            Fragment::Expr(Expr::Value(value)) => out.push_str(&sql_literal(value)),
            Fragment::Expr(other) => {
                out.push('<');
                out.push_str(&format!("{other:?}"));
                out.push('>');
            }
        }
    }
    out
}

fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Render a closed-form value as an inline SQL literal. Text quoting doubles
/// embedded quotes; booleans render as 1/0 since not every dialect has
/// TRUE/FALSE literals.
#[must_use]
pub fn sql_literal(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Int(i) => i.to_string(),
        SqlValue::Float(f) => f.to_string(),
        SqlValue::Bool(true) => "1".to_string(),
        SqlValue::Bool(false) => "0".to_string(),
        SqlValue::Text(s) => quote_text(s),
        SqlValue::Timestamp(dt) => format!("'{}'", format_timestamp(dt)),
        SqlValue::Json(v) => quote_text(&v.to_string()),
        SqlValue::Blob(bytes) => {
            let mut out = String::with_capacity(bytes.len() * 2 + 3);
            out.push_str("X'");
            for b in bytes {
                out.push_str(&format!("{b:02X}"));
            }
            out.push('\'');
            out
        }
    }
}

fn quote_text(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
