//! Materialized values produced by compiled projectors.

use std::collections::HashMap;
use std::sync::Arc;

use crate::shape::EntityShape;
use crate::types::SqlValue;

/// Result of one read: a scalar, a materialized entity record, a container,
/// a tuple, a tabular snapshot, or the zero-value `Absent`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Sql(SqlValue),
    Entity(Record),
    Seq(Vec<Value>),
    Set(Vec<Value>),
    Queue(Vec<Value>),
    Stack(Vec<Value>),
    Tuple(Vec<Value>),
    Table(Table),
    /// Zero-value: missing nested object, absent column, or a shape with no
    /// constructor.
    Absent,
}

impl Value {
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    #[must_use]
    pub fn as_sql(&self) -> Option<&SqlValue> {
        if let Value::Sql(v) = self {
            Some(v)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        if let Value::Entity(rec) = self {
            Some(rec)
        } else {
            None
        }
    }

    /// Elements of any container-kind value, in stored order.
    #[must_use]
    pub fn as_elements(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items)
            | Value::Set(items)
            | Value::Queue(items)
            | Value::Stack(items)
            | Value::Tuple(items) => Some(items),
            _ => None,
        }
    }
}

/// A materialized entity row: resolved property names shared across records of
/// the same shape, values indexed by stable property index.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Entity shape name this record was projected for.
    pub entity: &'static str,
    /// Resolved property names, by property index (shared across records).
    pub names: Arc<Vec<String>>,
    /// Field values, by property index.
    pub fields: Vec<Value>,
    // Cache for by-name lookups, shared with every record of the same plan.
    pub(crate) index: Arc<HashMap<String, usize>>,
}

impl Record {
    #[must_use]
    pub fn new(entity: &'static str, names: Arc<Vec<String>>, fields: Vec<Value>) -> Self {
        let index = Arc::new(
            names
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect::<HashMap<_, _>>(),
        );
        Self {
            entity,
            names,
            fields,
            index,
        }
    }

    pub(crate) fn with_index(
        entity: &'static str,
        names: Arc<Vec<String>>,
        fields: Vec<Value>,
        index: Arc<HashMap<String, usize>>,
    ) -> Self {
        Self {
            entity,
            names,
            fields,
            index,
        }
    }

    #[must_use]
    pub fn property_index(&self, name: &str) -> Option<usize> {
        if let Some(&idx) = self.index.get(name) {
            return Some(idx);
        }
        self.names.iter().position(|n| n == name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.property_index(name).and_then(|i| self.fields.get(i))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.fields.get(index)
    }
}

/// One row of a tabular snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Column names, shared with the owning [`Table`].
    pub column_names: Arc<Vec<String>>,
    pub values: Vec<SqlValue>,
}

impl TableRow {
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&SqlValue> {
        self.column_names
            .iter()
            .position(|col| col == column_name)
            .and_then(|i| self.values.get(i))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }
}

/// Whole-cursor snapshot: every column of every remaining row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub rows: Vec<TableRow>,
    column_names: Option<Arc<Vec<String>>>,
}

impl Table {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Table {
        Table {
            rows: Vec::with_capacity(capacity),
            column_names: None,
        }
    }

    /// Set the column names shared by all rows of this snapshot.
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_names = Some(column_names);
    }

    #[must_use]
    pub fn column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    pub fn push_row(&mut self, values: Vec<SqlValue>) {
        let names = self
            .column_names
            .clone()
            .unwrap_or_else(|| Arc::new(Vec::new()));
        self.rows.push(TableRow {
            column_names: names,
            values,
        });
    }
}

/// Typed facade over [`Record`]: lets callers recover concrete structs from
/// projected records.
pub trait Entity: Sized {
    fn shape() -> &'static EntityShape;
    fn from_record(record: &Record) -> Self;
}
