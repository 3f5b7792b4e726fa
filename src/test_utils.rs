//! In-memory cursor and command doubles for tests (behind the `test-utils`
//! feature).

use std::sync::Arc;

use crate::command::{Command, ParameterList};
use crate::cursor::Cursor;
use crate::types::{CursorKind, Dialect, SqlValue};

/// In-memory forward-only cursor over rows of [`SqlValue`] cells. Starts
/// positioned before the first row, matching driver cursors.
pub struct VecCursor {
    kind: CursorKind,
    columns: Arc<Vec<String>>,
    rows: Vec<Vec<SqlValue>>,
    pos: Option<usize>,
}

impl VecCursor {
    #[must_use]
    pub fn new(columns: &[&str], rows: Vec<Vec<SqlValue>>) -> Self {
        VecCursor {
            kind: CursorKind("vec"),
            columns: Arc::new(columns.iter().map(|c| (*c).to_string()).collect()),
            rows,
            pos: None,
        }
    }

    /// Same data, reported under a different cursor kind. Plans are cached
    /// per kind, so two kinds over the same data compile independently.
    #[must_use]
    pub fn with_kind(mut self, kind: CursorKind) -> Self {
        self.kind = kind;
        self
    }

    fn row(&self) -> &[SqlValue] {
        static EMPTY: &[SqlValue] = &[];
        self.pos
            .and_then(|p| self.rows.get(p))
            .map_or(EMPTY, Vec::as_slice)
    }
}

impl Cursor for VecCursor {
    fn kind(&self) -> CursorKind {
        self.kind
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, idx: usize) -> &str {
        self.columns.get(idx).map_or("", String::as_str)
    }

    fn value(&self, idx: usize) -> SqlValue {
        self.row().get(idx).cloned().unwrap_or(SqlValue::Null)
    }

    fn advance(&mut self) -> bool {
        let next = self.pos.map_or(0, |p| p + 1);
        self.pos = Some(next);
        next < self.rows.len()
    }
}

/// Command double that records attached parameters.
pub struct RecordingCommand {
    dialect: Dialect,
    params: ParameterList,
}

impl RecordingCommand {
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        RecordingCommand {
            dialect,
            params: ParameterList::new(),
        }
    }

    #[must_use]
    pub fn params(&self) -> &ParameterList {
        &self.params
    }
}

impl Command for RecordingCommand {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn parameters_mut(&mut self) -> &mut ParameterList {
        &mut self.params
    }
}
