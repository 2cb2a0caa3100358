//! Cell values and error sentinels.
//!
//! Every cell in a [`Table`](crate::table::Table) holds a [`Value`]: a number,
//! a string, or an [`ErrorValueKind`] sentinel standing in for an observation
//! that is conceptually present but unresolved. Sentinels are first-class
//! data, not failures — joins over sparse real-world coverage are expected to
//! have gaps, and downstream numeric/display code detects and skips them
//! instead of aborting.

use serde::ser::{Serialize, Serializer};
use std::fmt;

/// Sub-kind of an unresolved cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorValueKind {
    /// The full join found no row for this table under the primary key or
    /// any fallback key.
    NoMatchingValueAfterJoin,
    /// The source data had no observation here (JSON null, absent code,
    /// absent annotation).
    MissingValuePlaceholder,
    /// A NaN arrived where a number was declared. Captured at intake so the
    /// engine never stores a raw NaN.
    NaNButShouldBeNumber,
    /// A string was expected (e.g. an entity color) but none was assigned.
    UndefinedButShouldBeString,
}

impl ErrorValueKind {
    /// Short stable name, used in composite-key stringification and debug
    /// output.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NoMatchingValueAfterJoin => "NoMatchingValueAfterJoin",
            Self::MissingValuePlaceholder => "MissingValuePlaceholder",
            Self::NaNButShouldBeNumber => "NaNButShouldBeNumber",
            Self::UndefinedButShouldBeString => "UndefinedButShouldBeString",
        }
    }
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A numeric observation. Never NaN — NaN is captured as
    /// [`ErrorValueKind::NaNButShouldBeNumber`] at intake.
    Number(f64),
    /// A textual observation (entity name, code, annotation, color).
    String(String),
    /// A sentinel standing in for a missing or unresolved observation.
    Error(ErrorValueKind),
}

impl Value {
    /// Sentinel shorthand for a cell left empty by the join.
    pub const NO_MATCH: Self = Self::Error(ErrorValueKind::NoMatchingValueAfterJoin);
    /// Sentinel shorthand for an observation missing at the source.
    pub const MISSING: Self = Self::Error(ErrorValueKind::MissingValuePlaceholder);

    /// Converts an incoming JSON value to a cell value.
    ///
    /// Numbers map to [`Value::Number`] (NaN-guarded), strings to
    /// [`Value::String`]; null and any other JSON shape become the
    /// missing-value sentinel.
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(v) if v.is_nan() => Self::Error(ErrorValueKind::NaNButShouldBeNumber),
                Some(v) => Self::Number(v),
                None => Self::Error(ErrorValueKind::NaNButShouldBeNumber),
            },
            serde_json::Value::String(s) => Self::String(s.clone()),
            _ => Self::MISSING,
        }
    }

    /// Returns true if this cell holds a sentinel rather than data.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns the numeric payload, or `None` for strings and sentinels.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string payload, or `None` for numbers and sentinels.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Stable textual form used when stringifying composite keys.
    ///
    /// Integral numbers render without a fractional part so that `2020.0`
    /// and an integer year `2020` produce the same key component.
    #[must_use]
    pub fn key_repr(&self) -> String {
        match self {
            Self::Number(v) => format_number(*v),
            Self::String(s) => s.clone(),
            Self::Error(kind) => format!("error:{}", kind.name()),
        }
    }
}

impl fmt::Display for Value {
    /// Display form for CSV and debug rendering. Sentinels render as the
    /// empty string so exported files show gaps as empty fields.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => f.write_str(&format_number(*v)),
            Self::String(s) => f.write_str(s),
            Self::Error(_) => Ok(()),
        }
    }
}

impl Serialize for Value {
    /// Sentinels serialize as JSON null so record views stay consumable by
    /// chart/export layers that only understand plain JSON.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(v) => serializer.serialize_f64(*v),
            Self::String(s) => serializer.serialize_str(s),
            Self::Error(_) => serializer.serialize_none(),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            Self::Error(ErrorValueKind::NaNButShouldBeNumber)
        } else {
            Self::Number(v)
        }
    }
}

impl From<i64> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(v: i64) -> Self {
        Self::Number(v as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Formats a number the way spreadsheet-ish consumers expect: integral
/// values without a trailing `.0`, everything else via the shortest `f64`
/// round-trip form.
#[allow(clippy::cast_possible_truncation)]
fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}
