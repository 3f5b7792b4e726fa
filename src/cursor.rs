//! The consumed cursor contract: a forward-only accessor over a query
//! result's rows and columns. The core never opens or closes cursors; the
//! caller owns the lifetime and supplies synchronous advancement.

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::types::{CursorKind, SqlValue};

/// Forward-only result cursor.
///
/// Typed accessors default to going through the untyped cell accessor; a
/// driver adapter can override them with native typed reads. All accessors
/// address the current row; [`Cursor::advance`] moves to the next row and
/// returns `false` at the end.
pub trait Cursor {
    /// Which cursor family this is; part of every plan cache key.
    fn kind(&self) -> CursorKind;

    fn column_count(&self) -> usize;

    fn column_name(&self, idx: usize) -> &str;

    /// Untyped cell value at `idx` in the current row.
    fn value(&self, idx: usize) -> SqlValue;

    fn is_null(&self, idx: usize) -> bool {
        self.value(idx).is_null()
    }

    fn get_int(&self, idx: usize) -> Option<i64> {
        self.value(idx).as_int()
    }

    fn get_float(&self, idx: usize) -> Option<f64> {
        self.value(idx).as_float()
    }

    fn get_text(&self, idx: usize) -> Option<String> {
        self.value(idx).as_text().map(str::to_string)
    }

    fn get_bool(&self, idx: usize) -> Option<bool> {
        self.value(idx).as_bool()
    }

    fn get_timestamp(&self, idx: usize) -> Option<NaiveDateTime> {
        self.value(idx).as_timestamp()
    }

    fn get_json(&self, idx: usize) -> Option<JsonValue> {
        self.value(idx).as_json().cloned()
    }

    fn get_blob(&self, idx: usize) -> Option<Vec<u8>> {
        self.value(idx).as_blob().map(<[u8]>::to_vec)
    }

    /// Move to the next row. Returns `false` when the cursor is exhausted.
    fn advance(&mut self) -> bool;
}
