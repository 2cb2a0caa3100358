//! Pinning a variable table to a single target time.
//!
//! Scatter-style dimensions reference a variable at one point in time (e.g.
//! x-axis at year 2015). The filter reduces a variable table to at most one
//! row per entity: the observation at the target time when present, else the
//! closest observation within tolerance. Entities with nothing in range are
//! dropped outright — absence, not a sentinel row.

use indexmap::IndexMap;

use crate::column::{slugs, ColumnDef};
use crate::error::Result;
use crate::table::Table;
use crate::value::Value;

/// Filters `table` down to one row per entity, resolved at `target`.
///
/// Ties at equal distance break toward the later time, consistent with the
/// closest-time policy used throughout the engine. The time column is
/// dropped (the result implicitly represents the target time); the actual
/// time each value was taken from is retained under
/// [`slugs::ORIGINAL_TIME`] for display and debugging.
///
/// # Errors
///
/// Returns [`Error::UnknownColumn`](crate::Error::UnknownColumn) when the
/// table lacks the time column or the entity-name column.
pub fn filter_to_target_time(
    table: &Table,
    time_slug: &str,
    target: i64,
    tolerance: i64,
) -> Result<Table> {
    let time_column = table.column(time_slug)?;
    let entity_column = table.column(slugs::ENTITY_NAME)?;

    // Best row per entity, entities in first-seen order.
    let mut best: IndexMap<String, (usize, i64)> = IndexMap::new();
    for row in 0..table.row_count() {
        let Some(time) = time_column.values()[row].as_number() else {
            continue;
        };
        #[allow(clippy::cast_possible_truncation)]
        let time = time as i64;
        if (time - target).abs() > tolerance {
            continue;
        }
        let entity = entity_column.values()[row].key_repr();
        match best.get_mut(&entity) {
            None => {
                best.insert(entity, (row, time));
            }
            Some(current) => {
                let (_, current_time) = *current;
                let closer = (time - target).abs() < (current_time - target).abs();
                let later_tie =
                    (time - target).abs() == (current_time - target).abs() && time > current_time;
                if closer || later_tie {
                    *current = (row, time);
                }
            }
        }
    }

    let rows: Vec<usize> = best.values().map(|&(row, _)| row).collect();
    let original_times: Vec<Value> = best.values().map(|&(_, time)| Value::from(time)).collect();

    let original_def = ColumnDef::new(slugs::ORIGINAL_TIME, time_column.def().column_type)
        .with_name("Original time");
    table
        .select_rows(&rows)
        .without_columns(&[time_slug])
        .with_column(original_def, original_times)
}
