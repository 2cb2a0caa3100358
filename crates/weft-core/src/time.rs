//! The day-vs-year time duality.
//!
//! Variables express time either as a calendar year or as a day offset from
//! an epoch date. This module normalizes epoch differences away (so every
//! day-based column counts from the same canonical epoch) and derives
//! calendar years from day offsets for cross-resolution joins and display.

use chrono::{Datelike, NaiveDate, TimeDelta};
use rustc_hash::FxHashMap;

use crate::column::{slugs, ColumnDef, ColumnType};
use crate::error::{Error, Result};
use crate::table::Table;
use crate::value::Value;

/// Parses a `YYYY-MM-DD` epoch string.
///
/// # Errors
///
/// Returns [`Error::DateParse`] on malformed input.
pub fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| Error::DateParse(date.to_string()))
}

/// Re-bases day offsets from one epoch to another.
///
/// Pure: a day offset `d` relative to `source_epoch` denotes the same date
/// as `d + (source_epoch - canonical_epoch)` relative to `canonical_epoch`.
/// No-op (a plain copy) when the epochs coincide.
///
/// # Errors
///
/// Returns [`Error::DateParse`] if either epoch string is malformed.
pub fn shift_day_offsets(
    days: &[i64],
    source_epoch: &str,
    canonical_epoch: &str,
) -> Result<Vec<i64>> {
    let source = parse_date(source_epoch)?;
    let canonical = parse_date(canonical_epoch)?;
    let delta = (source - canonical).num_days();
    Ok(days.iter().map(|d| d + delta).collect())
}

/// Resolves a day offset to its calendar date.
///
/// `None` if the offset walks outside chrono's representable range.
#[must_use]
pub fn day_to_date(day: i64, epoch: NaiveDate) -> Option<NaiveDate> {
    epoch.checked_add_signed(TimeDelta::days(day))
}

/// Per-invocation cache mapping day offsets to calendar years.
///
/// Scoped to one join or export call and dropped afterwards — an explicit
/// replacement for memoizing date parsing in hidden global state.
#[derive(Debug)]
pub struct YearLookup {
    epoch: NaiveDate,
    cache: FxHashMap<i64, i64>,
}

impl YearLookup {
    /// Creates a lookup rooted at the given epoch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DateParse`] if the epoch string is malformed.
    pub fn new(epoch: &str) -> Result<Self> {
        Ok(Self {
            epoch: parse_date(epoch)?,
            cache: FxHashMap::default(),
        })
    }

    /// The calendar year containing `epoch + day`.
    ///
    /// Offsets outside chrono's representable range saturate to the epoch's
    /// own year.
    pub fn year_of(&mut self, day: i64) -> i64 {
        let epoch = self.epoch;
        *self.cache.entry(day).or_insert_with(|| {
            i64::from(day_to_date(day, epoch).map_or_else(|| epoch.year(), |d| d.year()))
        })
    }
}

/// Appends a derived calendar-year column to a day-based table.
///
/// Used before joining day-based tables against year-based ones, so a
/// `year`-keyed fallback can project through the day table. No-op when the
/// table has no day column or already carries a year column.
///
/// # Errors
///
/// Returns [`Error::DateParse`] if the epoch string is malformed.
pub fn with_year_from_day(table: &Table, epoch: &str) -> Result<Table> {
    let Some(day_column) = table.get_column(slugs::DAY) else {
        return Ok(table.clone());
    };
    if table.has_column(slugs::YEAR) {
        return Ok(table.clone());
    }
    let mut lookup = YearLookup::new(epoch)?;
    let years: Vec<Value> = day_column
        .values()
        .iter()
        .map(|v| match v.as_number() {
            #[allow(clippy::cast_possible_truncation)]
            Some(day) => Value::from(lookup.year_of(day as i64)),
            None => v.clone(),
        })
        .collect();
    let def = ColumnDef::new(slugs::YEAR, ColumnType::Year).with_name("Year");
    table.with_column(def, years)
}
