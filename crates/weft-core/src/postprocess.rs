//! Finalizing a joined table for chart and export consumers.

use rustc_hash::FxHashMap;

use crate::column::{slugs, ColumnDef, ColumnType};
use crate::error::Result;
use crate::table::Table;
use crate::value::{ErrorValueKind, Value};

/// Injects the unified time column.
///
/// Duplicates the day column under `time_slug`, else the year column when no
/// day column exists — day takes priority as the higher-resolution axis, and
/// at most one duplication is performed. No-op when the table carries
/// neither, or already has a column under `time_slug`.
#[must_use]
pub fn inject_time_column(table: &Table, time_slug: &str) -> Table {
    if table.has_column(time_slug) {
        return table.clone();
    }
    let source_slug = if table.has_column(slugs::DAY) {
        slugs::DAY
    } else if table.has_column(slugs::YEAR) {
        slugs::YEAR
    } else {
        return table.clone();
    };
    let def = ColumnDef::new(time_slug, ColumnType::Time).with_name("Time");
    // Source presence and slug absence are checked above, so the
    // duplication cannot fail.
    table
        .duplicate_column(source_slug, def)
        .unwrap_or_else(|_| table.clone())
}

/// Appends a per-row entity color column from a selection-color map.
///
/// Rows whose entity has no assigned color (or maps to an explicit absence)
/// get the [`ErrorValueKind::UndefinedButShouldBeString`] sentinel. Returns
/// the table unchanged when the map is empty.
///
/// # Errors
///
/// Returns [`Error::UnknownColumn`](crate::Error::UnknownColumn) when the
/// table has no entity-name column, and
/// [`Error::DuplicateSlug`](crate::Error::DuplicateSlug) when a color
/// column is already present.
pub fn append_entity_colors(
    table: &Table,
    colors: &FxHashMap<String, Option<String>>,
) -> Result<Table> {
    if colors.is_empty() {
        return Ok(table.clone());
    }
    let entity_column = table.column(slugs::ENTITY_NAME)?;
    let values: Vec<Value> = entity_column
        .values()
        .iter()
        .map(|entity| {
            entity
                .as_str()
                .and_then(|name| colors.get(name).cloned().flatten())
                .map_or(
                    Value::Error(ErrorValueKind::UndefinedButShouldBeString),
                    Value::String,
                )
        })
        .collect();
    let def = ColumnDef::new(slugs::ENTITY_COLOR, ColumnType::Color).with_name("Color");
    table.with_column(def, values)
}
