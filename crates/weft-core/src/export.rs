//! Row-oriented CSV export of a table.
//!
//! Values are joined by the configured delimiter, string fields containing
//! the delimiter (or quotes/newlines) are double-quoted, and formatting
//! follows the column type: years and integers render without a fractional
//! part, day offsets render as ISO `YYYY-MM-DD` dates via the canonical
//! epoch, and error sentinels render as empty fields.

use std::cmp::Ordering;
use std::io::Write;

use chrono::NaiveDate;

use crate::column::ColumnType;
use crate::config::{WeftConfig, DEFAULT_ZERO_DAY};
use crate::error::{Error, Result};
use crate::table::Table;
use crate::time::{day_to_date, parse_date};
use crate::value::Value;

/// Export settings, usually derived from [`WeftConfig`].
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Epoch used to render day-offset columns as dates (`YYYY-MM-DD`).
    pub zero_day: String,
    /// Field delimiter.
    pub delimiter: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            zero_day: DEFAULT_ZERO_DAY.to_string(),
            delimiter: b',',
        }
    }
}

impl ExportOptions {
    /// Derives export settings from a loaded configuration.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_config(config: &WeftConfig) -> Self {
        Self {
            zero_day: config.engine.zero_day.clone(),
            delimiter: config.export.delimiter as u8,
        }
    }
}

/// Serializes the table to a CSV string.
///
/// The header row carries column display names (slug fallback).
///
/// # Errors
///
/// Returns [`Error::DateParse`] for a malformed epoch and [`Error::Csv`]
/// for serialization failures.
pub fn to_csv(table: &Table, options: &ExportOptions) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(table, &mut buffer, options)?;
    String::from_utf8(buffer).map_err(|e| Error::Internal(e.to_string()))
}

/// Writes the table as CSV to `writer`.
///
/// # Errors
///
/// Same conditions as [`to_csv`].
pub fn write_csv<W: Write>(table: &Table, writer: W, options: &ExportOptions) -> Result<()> {
    let epoch = parse_date(&options.zero_day)?;
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(writer);

    csv_writer.write_record(table.columns().map(|c| c.def().display_name()))?;
    for row in 0..table.row_count() {
        let record: Vec<String> = table
            .columns()
            .map(|c| format_cell(&c.values()[row], c.def().column_type, epoch))
            .collect();
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Returns a new table with rows stably sorted by the given column.
///
/// Numbers sort before strings, sentinels sort last; consumers that need a
/// stable export order (the join's own row order is not contractual) sort
/// by an entity or time column before serializing.
///
/// # Errors
///
/// Returns [`Error::UnknownColumn`] when the column is absent.
pub fn sorted_by(table: &Table, slug: &str) -> Result<Table> {
    let column = table.column(slug)?;
    let values = column.values();
    let mut rows: Vec<usize> = (0..table.row_count()).collect();
    rows.sort_by(|&a, &b| compare_values(&values[a], &values[b]));
    Ok(table.select_rows(&rows))
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Error(_), Value::Error(_)) => Ordering::Equal,
        (Value::Number(_), _) | (_, Value::Error(_)) => Ordering::Less,
        (_, Value::Number(_)) | (Value::Error(_), _) => Ordering::Greater,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn format_cell(value: &Value, column_type: ColumnType, epoch: NaiveDate) -> String {
    match (column_type, value) {
        (ColumnType::Day, Value::Number(day)) => day_to_date(*day as i64, epoch)
            .map_or_else(|| value.to_string(), |d| d.format("%Y-%m-%d").to_string()),
        _ => value.to_string(),
    }
}
