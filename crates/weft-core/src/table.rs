//! The columnar table: an ordered map of slug → typed value array.
//!
//! Tables are immutable. Every operation returns a new `Table`; value arrays
//! are shared via `Arc`, so duplicating or carrying a column across a
//! transformation is O(1) and a source table can be shared freely across
//! threads (the engine never writes into an existing table).

use std::sync::Arc;

use indexmap::IndexMap;

use crate::column::ColumnDef;
use crate::error::{Error, Result};
use crate::value::Value;

/// One named, typed column: a definition plus a shared value array.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    def: ColumnDef,
    values: Arc<Vec<Value>>,
}

impl Column {
    /// Creates a column from a definition and its values.
    #[must_use]
    pub fn new(def: ColumnDef, values: Vec<Value>) -> Self {
        Self {
            def,
            values: Arc::new(values),
        }
    }

    /// The column definition.
    #[must_use]
    pub fn def(&self) -> &ColumnDef {
        &self.def
    }

    /// The column slug.
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.def.slug
    }

    /// All values, error sentinels included.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Values with sentinels cleaned to `None`.
    pub fn values_clean(&self) -> impl Iterator<Item = Option<&Value>> + '_ {
        self.values
            .iter()
            .map(|v| if v.is_error() { None } else { Some(v) })
    }

    /// Numeric view: `None` for strings and sentinels.
    pub fn numeric_values(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.values.iter().map(Value::as_number)
    }

    /// String view: `None` for numbers and sentinels.
    pub fn string_values(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.values.iter().map(Value::as_str)
    }

    /// Returns the same values under a new definition.
    #[must_use]
    pub fn with_def(&self, def: ColumnDef) -> Self {
        Self {
            def,
            values: Arc::clone(&self.values),
        }
    }
}

/// A columnar table. All columns share one row count; row *i* across all
/// columns describes one observation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: IndexMap<String, Column>,
    row_count: usize,
}

impl Table {
    /// Creates a table from `(definition, values)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if the arrays differ in length and
    /// [`Error::DuplicateSlug`] if two definitions share a slug.
    pub fn new(columns: Vec<(ColumnDef, Vec<Value>)>) -> Result<Self> {
        let mut table = Self::empty();
        table.insert_columns(columns)?;
        Ok(table)
    }

    /// The zero-column, zero-row table.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns true if the table has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column slugs in column order.
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Columns in column order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    /// Returns true if a column with this slug exists.
    #[must_use]
    pub fn has_column(&self, slug: &str) -> bool {
        self.columns.contains_key(slug)
    }

    /// Looks up a column by slug.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] if absent.
    pub fn column(&self, slug: &str) -> Result<&Column> {
        self.columns
            .get(slug)
            .ok_or_else(|| Error::UnknownColumn(slug.to_string()))
    }

    /// Looks up a column by slug, `None` if absent.
    #[must_use]
    pub fn get_column(&self, slug: &str) -> Option<&Column> {
        self.columns.get(slug)
    }

    /// The value at `(slug, row)`, `None` when either is out of range.
    #[must_use]
    pub fn value_at(&self, slug: &str, row: usize) -> Option<&Value> {
        self.columns.get(slug).and_then(|c| c.values().get(row))
    }

    /// Returns a new table with the given columns appended.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateSlug`] if any new slug already exists and
    /// [`Error::ShapeMismatch`] if an array's length differs from the row
    /// count.
    pub fn with_columns(&self, columns: Vec<(ColumnDef, Vec<Value>)>) -> Result<Self> {
        let mut next = self.clone();
        next.insert_columns(columns)?;
        Ok(next)
    }

    /// Returns a new table with one column appended.
    ///
    /// # Errors
    ///
    /// Same conditions as [`with_columns`](Self::with_columns).
    pub fn with_column(&self, def: ColumnDef, values: Vec<Value>) -> Result<Self> {
        self.with_columns(vec![(def, values)])
    }

    /// Returns a new table without the listed columns. Slugs that do not
    /// exist are ignored.
    #[must_use]
    pub fn without_columns(&self, slugs: &[&str]) -> Self {
        let columns: IndexMap<String, Column> = self
            .columns
            .iter()
            .filter(|(slug, _)| !slugs.contains(&slug.as_str()))
            .map(|(slug, col)| (slug.clone(), col.clone()))
            .collect();
        Self {
            columns,
            row_count: self.row_count,
        }
    }

    /// Returns a new table with the source column's values duplicated under
    /// the new definition's slug. O(1): the value array is shared.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] if the source is absent and
    /// [`Error::DuplicateSlug`] if the new slug already exists.
    pub fn duplicate_column(&self, source_slug: &str, def: ColumnDef) -> Result<Self> {
        let source = self.column(source_slug)?;
        if self.has_column(&def.slug) {
            return Err(Error::DuplicateSlug(def.slug));
        }
        let mut next = self.clone();
        let duplicated = source.with_def(def);
        next.columns
            .insert(duplicated.slug().to_string(), duplicated);
        Ok(next)
    }

    /// Returns a new table containing only the given rows, in the given
    /// order. Row numbers out of range are skipped.
    #[must_use]
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let rows: Vec<usize> = rows
            .iter()
            .copied()
            .filter(|&r| r < self.row_count)
            .collect();
        let columns: IndexMap<String, Column> = self
            .columns
            .iter()
            .map(|(slug, col)| {
                let values = rows.iter().map(|&r| col.values()[r].clone()).collect();
                (slug.clone(), Column::new(col.def().clone(), values))
            })
            .collect();
        Self {
            columns,
            row_count: rows.len(),
        }
    }

    /// Row-oriented view: one slug → value map per row, in column order.
    #[must_use]
    pub fn records(&self) -> Vec<IndexMap<String, Value>> {
        (0..self.row_count)
            .map(|row| {
                self.columns
                    .iter()
                    .map(|(slug, col)| (slug.clone(), col.values()[row].clone()))
                    .collect()
            })
            .collect()
    }

    /// Assembles a table from already-validated columns. Caller guarantees
    /// equal lengths and distinct slugs.
    pub(crate) fn from_parts(columns: Vec<Column>, row_count: usize) -> Self {
        debug_assert!(columns.iter().all(|c| c.values().len() == row_count));
        let columns: IndexMap<String, Column> = columns
            .into_iter()
            .map(|c| (c.slug().to_string(), c))
            .collect();
        Self { columns, row_count }
    }

    fn insert_columns(&mut self, columns: Vec<(ColumnDef, Vec<Value>)>) -> Result<()> {
        for (def, values) in columns {
            if self.columns.contains_key(&def.slug) {
                return Err(Error::DuplicateSlug(def.slug));
            }
            if self.columns.is_empty() {
                self.row_count = values.len();
            } else if values.len() != self.row_count {
                return Err(Error::ShapeMismatch {
                    slug: def.slug,
                    expected: self.row_count,
                    actual: values.len(),
                });
            }
            self.columns
                .insert(def.slug.clone(), Column::new(def, values));
        }
        Ok(())
    }
}
