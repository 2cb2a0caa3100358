//! Derived row indexes over composite keys.
//!
//! A [`RowIndex`] maps the stringified tuple of a row's key-column values to
//! the row numbers sharing that tuple. Indexes are derived, never persisted:
//! they are built per join invocation and must be rebuilt whenever the
//! underlying table is rebuilt.

use indexmap::IndexMap;

use crate::table::Table;

/// Separator between key components. A non-printable unit separator so that
/// slugs or values containing commas/dashes cannot collide.
const KEY_SEPARATOR: char = '\u{1F}';

/// Stringifies the composite key of one row.
///
/// Returns `None` when the table structurally lacks one of the key columns —
/// the caller treats that as a miss, not an error.
#[must_use]
pub fn composite_key(table: &Table, key_slugs: &[&str], row: usize) -> Option<String> {
    let mut key = String::new();
    for (i, slug) in key_slugs.iter().enumerate() {
        let value = table.value_at(slug, row)?;
        if i > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(&value.key_repr());
    }
    Some(key)
}

/// Joins already-stringified key components the same way
/// [`composite_key`] does.
#[must_use]
pub fn join_key_parts(parts: &[String]) -> String {
    parts.join(&KEY_SEPARATOR.to_string())
}

/// A composite-key → row-numbers index over one table.
#[derive(Debug, Default)]
pub struct RowIndex {
    /// Keys in first-seen row order, each mapping to the rows sharing it.
    buckets: IndexMap<String, Vec<usize>>,
    /// Whether the table structurally contained every key column.
    complete: bool,
}

impl RowIndex {
    /// Builds the index for `table` keyed by `key_slugs`.
    ///
    /// A table missing any key column gets the empty index, so every lookup
    /// against it trivially misses (structural fallback candidate, as
    /// opposed to a value-level miss for a present column).
    #[must_use]
    pub fn build(table: &Table, key_slugs: &[&str]) -> Self {
        if !key_slugs.iter().all(|slug| table.has_column(slug)) {
            return Self {
                buckets: IndexMap::new(),
                complete: false,
            };
        }
        let mut buckets: IndexMap<String, Vec<usize>> = IndexMap::new();
        for row in 0..table.row_count() {
            // Key columns verified present above, so the key always forms.
            if let Some(key) = composite_key(table, key_slugs, row) {
                buckets.entry(key).or_default().push(row);
            }
        }
        Self {
            buckets,
            complete: true,
        }
    }

    /// Whether the table structurally contained every key column.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if no keys are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Distinct keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// All rows sharing `key`, `None` on a miss.
    #[must_use]
    pub fn rows(&self, key: &str) -> Option<&[usize]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    /// The first row matching `key`.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<usize> {
        self.buckets.get(key).and_then(|rows| rows.first().copied())
    }

    /// The last row matching `key`.
    ///
    /// Used by fallback resolution, where later observations are typically
    /// more recent and therefore preferred.
    #[must_use]
    pub fn last(&self, key: &str) -> Option<usize> {
        self.buckets.get(key).and_then(|rows| rows.last().copied())
    }
}
