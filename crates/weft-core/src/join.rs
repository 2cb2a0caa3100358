//! The multi-table full join engine.
//!
//! Merges N variable tables into one denormalized table with exactly one row
//! per distinct primary-key value observed across all inputs. Tables with
//! partial key coverage (a year-indexed table under a day+entity primary
//! key) resolve through a prioritized list of fallback keys; cells no key
//! can resolve are filled with the
//! [`NoMatchingValueAfterJoin`](crate::value::ErrorValueKind::NoMatchingValueAfterJoin)
//! sentinel, never left absent.
//!
//! The engine is a pure transformation: inputs are only read, one output
//! array per column is materialized, and the per-table row indexes live only
//! for the duration of the call.

use indexmap::IndexSet;

use crate::index::{composite_key, RowIndex};
use crate::table::{Column, Table};
use crate::value::Value;

/// A correctness warning: several rows in one table's primary index matched
/// a single key. The first match was taken; the occurrence indicates
/// upstream duplication, since index columns are meant to be unique keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKeyWarning {
    /// Position of the offending table in the join's input list.
    pub table: usize,
    /// The stringified composite key that matched more than once.
    pub key: String,
    /// All row numbers sharing the key.
    pub rows: Vec<usize>,
}

/// Structured diagnostics collected during one join call.
///
/// Injected by the caller rather than written to a hidden global channel;
/// each recorded warning also emits a `tracing::warn!`.
#[derive(Debug, Default)]
pub struct JoinDiagnostics {
    duplicates: Vec<DuplicateKeyWarning>,
}

impl JoinDiagnostics {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings about keys matched by more than one row in a single table.
    #[must_use]
    pub fn duplicate_keys(&self) -> &[DuplicateKeyWarning] {
        &self.duplicates
    }

    /// Returns true if the join completed without warnings.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty()
    }

    fn record_duplicate(&mut self, table: usize, key: &str, rows: &[usize]) {
        tracing::warn!(
            table,
            key,
            matches = rows.len(),
            "multiple rows matched one primary key; taking the first"
        );
        self.duplicates.push(DuplicateKeyWarning {
            table,
            key: key.to_string(),
            rows: rows.to_vec(),
        });
    }
}

/// How a planned output column resolves its value for a given key.
enum ColumnSource {
    /// Shared or key column: written once, from the highest-priority table
    /// whose primary index holds the key and which carries the column.
    Shared,
    /// A table's own column: primary lookup into that table, then fallback
    /// keys, then the sentinel.
    Own(usize),
}

/// Fully outer-joins `tables` on `primary_key`, resolving partial coverage
/// through `fallback_keys` in declared order.
///
/// The first table is the key source of truth: it must carry every column
/// referenced by the primary key and by every fallback key. Other tables
/// may lack key columns; their primary index is then empty, every direct
/// lookup misses, and resolution falls through the fallback keys (the
/// fallback key value is computed by projecting the first table's matching
/// row onto the fallback columns).
///
/// Policy, fixed for behavioral parity with the data it was built for:
/// a primary lookup takes the *first* matching row (duplicates are recorded
/// in `diagnostics`); a fallback lookup takes the *last* matching row, since
/// later observations are typically more recent when falling back to a
/// coarser key. The output row order is the first-seen order of keys across
/// tables and is not part of the contract.
///
/// An empty input list yields the empty table; a singleton list yields its
/// table unchanged.
#[must_use]
pub fn full_join_tables(
    tables: &[Table],
    primary_key: &[&str],
    fallback_keys: &[&[&str]],
    diagnostics: &mut JoinDiagnostics,
) -> Table {
    if tables.is_empty() {
        return Table::empty();
    }
    if tables.len() == 1 {
        return tables[0].clone();
    }

    let primary_indexes: Vec<RowIndex> = tables
        .iter()
        .map(|t| RowIndex::build(t, primary_key))
        .collect();
    let fallback_indexes: Vec<Vec<RowIndex>> = tables
        .iter()
        .map(|t| fallback_keys.iter().map(|k| RowIndex::build(t, k)).collect())
        .collect();

    // Slugs present in every table; written once from a single
    // authoritative source instead of once per contributing table.
    let shared: IndexSet<&str> = tables[0]
        .slugs()
        .filter(|slug| tables[1..].iter().all(|t| t.has_column(slug)))
        .collect();
    // Key columns are written once too, even where not shared by every
    // table (a day column under a day+entity key, say).
    let key_slugs: IndexSet<&str> = primary_key
        .iter()
        .copied()
        .chain(fallback_keys.iter().flat_map(|k| k.iter().copied()))
        .collect();

    // Column plan: first occurrence of each slug in table order wins; later
    // duplicates of shared/key columns are skipped.
    let mut plan: Vec<(Column, ColumnSource)> = Vec::new();
    let mut emitted: IndexSet<&str> = IndexSet::new();
    for (table_pos, table) in tables.iter().enumerate() {
        for column in table.columns() {
            if !emitted.insert(column.slug()) {
                continue;
            }
            let source = if shared.contains(column.slug()) || key_slugs.contains(column.slug()) {
                ColumnSource::Shared
            } else {
                ColumnSource::Own(table_pos)
            };
            plan.push((column.clone(), source));
        }
    }
    // Per plan entry, the column resolved against each table (shared
    // columns read from whichever table anchors a key).
    let plan_columns: Vec<Vec<Option<&Column>>> = plan
        .iter()
        .map(|(column, _)| {
            tables
                .iter()
                .map(|t| t.get_column(column.slug()))
                .collect()
        })
        .collect();

    // The global key set: union of the per-table primary key sets, in
    // first-seen order.
    let mut all_keys: IndexSet<String> = IndexSet::new();
    for index in &primary_indexes {
        for key in index.keys() {
            all_keys.insert(key.to_string());
        }
    }

    let row_count = all_keys.len();
    let mut outputs: Vec<Vec<Value>> = plan
        .iter()
        .map(|_| Vec::with_capacity(row_count))
        .collect();

    for key in &all_keys {
        // First matching row per table under the primary key.
        let hits: Vec<Option<usize>> = primary_indexes
            .iter()
            .enumerate()
            .map(|(table_pos, index)| {
                let rows = index.rows(key)?;
                if rows.len() > 1 {
                    diagnostics.record_duplicate(table_pos, key, rows);
                }
                rows.first().copied()
            })
            .collect();

        // Fallback key values, projected from the first table's matching
        // row (the key source of truth).
        let projected: Vec<Option<String>> = fallback_keys
            .iter()
            .map(|fallback| hits[0].and_then(|row| composite_key(&tables[0], fallback, row)))
            .collect();

        for (plan_pos, (_, source)) in plan.iter().enumerate() {
            let by_table = &plan_columns[plan_pos];
            let value = match source {
                ColumnSource::Shared => hits
                    .iter()
                    .zip(by_table)
                    .find_map(|(hit, column)| {
                        let row = (*hit)?;
                        Some(column.as_ref()?.values()[row].clone())
                    })
                    .unwrap_or(Value::NO_MATCH),
                ColumnSource::Own(table_pos) => {
                    let column = by_table[*table_pos]
                        .as_ref()
                        .expect("plan column exists in its owning table");
                    match hits[*table_pos] {
                        Some(row) => column.values()[row].clone(),
                        None => resolve_fallback(
                            column,
                            &fallback_indexes[*table_pos],
                            &projected,
                        ),
                    }
                }
            };
            outputs[plan_pos].push(value);
        }
    }

    let columns: Vec<Column> = plan
        .into_iter()
        .zip(outputs)
        .map(|((column, _), values)| Column::new(column.def().clone(), values))
        .collect();
    Table::from_parts(columns, row_count)
}

/// Walks the fallback keys in declared order; the last matching row wins
/// within a key. Yields the sentinel when nothing resolves.
fn resolve_fallback(
    column: &Column,
    fallback_indexes: &[RowIndex],
    projected: &[Option<String>],
) -> Value {
    for (index, key) in fallback_indexes.iter().zip(projected) {
        let Some(key) = key else { continue };
        if let Some(row) = index.last(key) {
            return column.values()[row].clone();
        }
    }
    Value::NO_MATCH
}
