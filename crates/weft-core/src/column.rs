//! Column types, definitions and the standard slugs.

use serde::{Deserialize, Serialize};

/// Standard column slugs shared by convention across variable tables.
///
/// The join engine relies on these recurring in every table (entity
/// identifiers) or in at most one table each (time axes).
pub mod slugs {
    /// Entity display name.
    pub const ENTITY_NAME: &str = "entityName";
    /// Numeric entity id from the source database.
    pub const ENTITY_ID: &str = "entityId";
    /// Short entity code (e.g. ISO country code).
    pub const ENTITY_CODE: &str = "entityCode";
    /// Calendar-year time axis.
    pub const YEAR: &str = "year";
    /// Day-offset time axis (days since the canonical epoch).
    pub const DAY: &str = "day";
    /// The unified time column injected after a join.
    pub const TIME: &str = "time";
    /// The actual time an observation was taken from, kept by the
    /// target-time filter for display/debugging.
    pub const ORIGINAL_TIME: &str = "originalTime";
    /// Per-entity selection color appended in post-processing.
    pub const ENTITY_COLOR: &str = "entityColor";
}

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Whole-number observations.
    Integer,
    /// Real-number observations.
    Numeric,
    /// Free-form text.
    String,
    /// Text drawn from a fixed ordered set.
    Ordinal,
    /// Calendar year.
    Year,
    /// Day offset from the canonical epoch.
    Day,
    /// CSS-style color string.
    Color,
    /// The unified time axis (a copy of a year or day column).
    Time,
}

impl ColumnType {
    /// Returns true for the time-axis types.
    #[must_use]
    pub const fn is_time(&self) -> bool {
        matches!(self, Self::Year | Self::Day | Self::Time)
    }
}

/// Metadata attached to a column slug.
///
/// Definitions are immutable once attached to a table; transformations that
/// change semantics (unit conversion, integer promotion) produce a new
/// definition via the builder methods below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    /// Unique column slug.
    pub slug: String,
    /// Semantic type.
    pub column_type: ColumnType,
    /// Display name; falls back to the slug when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Display unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Abbreviated display unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_unit: Option<String>,
    /// Multiplier already applied to the stored values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_factor: Option<f64>,
    /// Display color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Maximum time distance allowed when resolving against a target time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<i64>,
    /// The single time this column's values were pinned to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_time: Option<i64>,
    /// Source variable id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_id: Option<u64>,
    /// Source dataset id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<u64>,
}

impl ColumnDef {
    /// Creates a definition with the given slug and type; everything else
    /// unset.
    #[must_use]
    pub fn new(slug: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            slug: slug.into(),
            column_type,
            name: None,
            unit: None,
            short_unit: None,
            conversion_factor: None,
            color: None,
            tolerance: None,
            target_time: None,
            variable_id: None,
            dataset_id: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the provenance ids.
    #[must_use]
    pub fn with_provenance(mut self, variable_id: u64, dataset_id: Option<u64>) -> Self {
        self.variable_id = Some(variable_id);
        self.dataset_id = dataset_id;
        self
    }

    /// Display name with slug fallback.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.slug)
    }

    /// Returns the definition after applying a conversion factor.
    ///
    /// Integer columns are promoted to Numeric when the factor is
    /// non-integral. Promotion is one-directional: a Numeric column is never
    /// demoted back even if the factor happens to be integral.
    #[must_use]
    pub fn converted_by(mut self, factor: f64) -> Self {
        if self.column_type == ColumnType::Integer && factor.fract() != 0.0 {
            self.column_type = ColumnType::Numeric;
        }
        self.conversion_factor = Some(factor);
        self
    }

    /// Returns a copy under a different slug, for column duplication.
    #[must_use]
    pub fn renamed(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }
}
