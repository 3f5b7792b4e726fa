use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Values that can appear in a cursor cell, a closed-form expression literal,
/// or an outgoing command parameter.
///
/// One enum is shared across all three roles so the projection, translation,
/// and binding layers never need to branch on driver types:
/// ```rust
/// use sql_mapper::prelude::*;
///
/// let cells = vec![
///     SqlValue::Int(1),
///     SqlValue::Text("alice".into()),
///     SqlValue::Bool(true),
/// ];
/// # let _ = cells;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    Json(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl Default for SqlValue {
    fn default() -> Self {
        SqlValue::Null
    }
}

impl SqlValue {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        if let SqlValue::Int(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let SqlValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SqlValue::Bool(value) => Some(*value),
            SqlValue::Int(0) => Some(false),
            SqlValue::Int(1) => Some(true),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let SqlValue::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            // Try "YYYY-MM-DD HH:MM:SS.SSS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S.%3f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            SqlValue::Float(value) => Some(*value),
            SqlValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&JsonValue> {
        if let SqlValue::Json(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let SqlValue::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// The scalar kind of this value, `None` for NULL.
    #[must_use]
    pub fn kind(&self) -> Option<ScalarKind> {
        match self {
            SqlValue::Int(_) => Some(ScalarKind::Int),
            SqlValue::Float(_) => Some(ScalarKind::Float),
            SqlValue::Text(_) => Some(ScalarKind::Text),
            SqlValue::Bool(_) => Some(ScalarKind::Bool),
            SqlValue::Timestamp(_) => Some(ScalarKind::Timestamp),
            SqlValue::Json(_) => Some(ScalarKind::Json),
            SqlValue::Blob(_) => Some(ScalarKind::Blob),
            SqlValue::Null => None,
        }
    }
}

/// Primitive kinds matching the cursor's typed accessors, plus `Object` for
/// the untyped fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Int,
    Float,
    Text,
    Bool,
    Timestamp,
    Json,
    Blob,
    /// Read via the untyped cell accessor.
    Object,
}

/// The SQL dialect a translation table or parameter binder applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
pub enum Dialect {
    /// `PostgreSQL`
    Postgres,
    /// `SQLite`
    Sqlite,
    /// SQL Server
    Mssql,
    /// `MySQL` / `MariaDB`
    Mysql,
    /// Oracle
    Oracle,
    /// Dialect-independent defaults, consulted after the dialect's own table.
    Ansi,
}

impl Dialect {
    /// Every registrable dialect, `Ansi` last.
    pub const ALL: [Dialect; 6] = [
        Dialect::Postgres,
        Dialect::Sqlite,
        Dialect::Mssql,
        Dialect::Mysql,
        Dialect::Oracle,
        Dialect::Ansi,
    ];
}

/// Discriminator for a physical cursor family. Part of every projection plan
/// cache key: plans compiled against one cursor kind are never reused for
/// another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CursorKind(pub &'static str);

impl std::fmt::Display for CursorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}
