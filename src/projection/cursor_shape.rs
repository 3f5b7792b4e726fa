//! Per-result-set index from expected columns and sub-entities to physical
//! column positions.

use std::sync::Arc;

use tracing::trace;

use super::ProjectionCompiler;
use super::column_map::ColumnMap;

/// Physical layout of one column-name list for one entity shape. `columns`
/// is exactly property-count-sized; `None` marks an absent column, which is
/// never read. Nested shapes exist only where at least one prefixed column
/// matched.
pub struct CursorShape {
    pub columns: Vec<Option<usize>>,
    /// Aligned with the column map's nested descriptors.
    pub nested: Vec<Option<Arc<CursorShape>>>,
}

impl CursorShape {
    /// Scan every physical column name once: an exact column-map match wins,
    /// else nested prefixes are tried in registration order and a hit records
    /// the truncated suffix for the nested shape. Unmatched columns are
    /// silently ignored.
    pub(crate) fn build(
        map: &ColumnMap,
        physical: &[(String, usize)],
        compiler: &ProjectionCompiler,
    ) -> CursorShape {
        let mut columns: Vec<Option<usize>> = vec![None; map.property_count];
        let mut pending: Vec<Vec<(String, usize)>> = vec![Vec::new(); map.nested.len()];

        for (name, idx) in physical {
            if let Some(entry) = map.column_by_name(name) {
                // First exact match wins for duplicated column names.
                if columns[entry.property_index].is_none() {
                    columns[entry.property_index] = Some(*idx);
                }
                continue;
            }
            let mut matched = false;
            for (n, entry) in map.nested.iter().enumerate() {
                if let Some(suffix) = name.strip_prefix(&entry.prefix) {
                    pending[n].push((suffix.to_string(), *idx));
                    matched = true;
                    break;
                }
            }
            if !matched {
                trace!(entity = map.shape.name, column = %name, "unmatched column ignored");
            }
        }

        let nested = map
            .nested
            .iter()
            .zip(pending)
            .map(|(entry, suffixes)| {
                if suffixes.is_empty() {
                    return None;
                }
                let nested_map = compiler.column_map_for(entry.shape);
                Some(Arc::new(CursorShape::build(&nested_map, &suffixes, compiler)))
            })
            .collect();

        CursorShape { columns, nested }
    }
}
