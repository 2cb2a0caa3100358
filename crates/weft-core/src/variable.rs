//! Raw variable payloads and the per-variable table builder.
//!
//! The data-serving layer hands each variable over as parallel arrays of
//! entity id, time value and observation value, plus metadata (entity
//! names/codes, display options). [`variable_table`] converts one such
//! payload into a standardized variable table: entity columns, one time
//! column (day or year), the value column, and an optional annotation
//! column. The table is constructed once and never mutated afterwards.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::column::{slugs, ColumnDef, ColumnType};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::table::Table;
use crate::time::shift_day_offsets;
use crate::value::Value;

/// One variable as served by the data layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariablePayload {
    /// Parallel observation arrays.
    pub data: VariableData,
    /// Variable metadata.
    pub metadata: VariableMetadata,
}

/// Parallel arrays of observations. `entities[i]`, `years[i]` and
/// `values[i]` together describe one observation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableData {
    /// Entity id per observation.
    #[serde(default)]
    pub entities: Vec<u64>,
    /// Observation value per observation (number or string).
    #[serde(default)]
    pub values: Vec<serde_json::Value>,
    /// Time value per observation: a calendar year, or a day offset when
    /// the variable's display declares `yearIsDay`.
    #[serde(default)]
    pub years: Vec<i64>,
}

/// Variable metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableMetadata {
    /// Variable id.
    pub id: u64,
    /// Variable name.
    #[serde(default)]
    pub name: Option<String>,
    /// Owning dataset id.
    #[serde(default)]
    pub dataset_id: Option<u64>,
    /// Display options.
    #[serde(default)]
    pub display: VariableDisplay,
    /// Dimension metadata (entity names/codes, observed years).
    #[serde(default)]
    pub dimensions: VariableDimensions,
    /// Source description, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<serde_json::Value>,
    /// Origin descriptions, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origins: Option<serde_json::Value>,
}

/// Display options for a variable, also usable as per-dimension overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDisplay {
    /// Display name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Abbreviated unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_unit: Option<String>,
    /// Multiplier to apply to every numeric value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_factor: Option<f64>,
    /// When true, the `years` array holds day offsets, not calendar years.
    #[serde(default)]
    pub year_is_day: bool,
    /// Epoch the day offsets count from, when it differs from the
    /// canonical one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_day: Option<String>,
    /// Time tolerance for target-time resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<i64>,
    /// Per-entity annotation text, keyed by entity name. Each entity maps
    /// to at most one annotation string per variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_annotations_map: Option<BTreeMap<String, String>>,
}

impl VariableDisplay {
    /// Merges dimension-level overrides over variable-level options.
    #[must_use]
    pub fn merged_with(&self, overrides: &Self) -> Self {
        Self {
            name: overrides.name.clone().or_else(|| self.name.clone()),
            unit: overrides.unit.clone().or_else(|| self.unit.clone()),
            short_unit: overrides
                .short_unit
                .clone()
                .or_else(|| self.short_unit.clone()),
            conversion_factor: overrides.conversion_factor.or(self.conversion_factor),
            year_is_day: overrides.year_is_day || self.year_is_day,
            zero_day: overrides.zero_day.clone().or_else(|| self.zero_day.clone()),
            tolerance: overrides.tolerance.or(self.tolerance),
            entity_annotations_map: overrides
                .entity_annotations_map
                .clone()
                .or_else(|| self.entity_annotations_map.clone()),
        }
    }
}

/// Dimension metadata blocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableDimensions {
    /// Entity records.
    #[serde(default)]
    pub entities: DimensionValues<EntityRecord>,
    /// Observed time values.
    #[serde(default)]
    pub years: DimensionValues<YearRecord>,
}

/// A `{ values: [...] }` wrapper, matching the served JSON shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionValues<T> {
    /// The wrapped records.
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
}

impl<T> Default for DimensionValues<T> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

/// Entity metadata record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Entity id.
    pub id: u64,
    /// Entity display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Short entity code.
    #[serde(default)]
    pub code: Option<String>,
}

/// Observed time record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearRecord {
    /// The time value.
    pub id: i64,
}

/// One chart dimension: a reference to a variable under a column slug,
/// optionally pinned to a target time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionConfig {
    /// The referenced variable.
    pub variable_id: u64,
    /// Which chart property the column feeds (e.g. `y`, `x`, `size`).
    pub property: String,
    /// Column slug assigned upstream. Required: the same variable
    /// referenced at two target times needs two distinguishable slugs.
    #[serde(default)]
    pub slug: Option<String>,
    /// Target time to pin this dimension to.
    #[serde(default)]
    pub target_year: Option<i64>,
    /// Display overrides taking precedence over the variable's own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<VariableDisplay>,
}

/// Converts one variable payload into a standardized variable table.
///
/// Entity names resolve through the payload's entity dimension; an unmapped
/// id degrades gracefully to its stringified form rather than failing, since
/// entity metadata may come from a different store than the observations.
///
/// # Errors
///
/// Returns [`Error::MissingColumnSlug`] when the dimension has no slug,
/// [`Error::ShapeMismatch`] when the parallel arrays disagree in length, and
/// [`Error::DateParse`] when a `zeroDay` epoch string is malformed.
pub fn variable_table(
    payload: &VariablePayload,
    dimension: &DimensionConfig,
    config: &EngineConfig,
) -> Result<Table> {
    let value_slug = dimension
        .slug
        .as_deref()
        .ok_or(Error::MissingColumnSlug {
            variable_id: dimension.variable_id,
        })?;
    let metadata = &payload.metadata;
    let display = match &dimension.display {
        Some(overrides) => metadata.display.merged_with(overrides),
        None => metadata.display.clone(),
    };

    let entity_meta: FxHashMap<u64, &EntityRecord> = metadata
        .dimensions
        .entities
        .values
        .iter()
        .map(|e| (e.id, e))
        .collect();

    let entity_names: Vec<Value> = payload
        .data
        .entities
        .iter()
        .map(|id| {
            entity_meta
                .get(id)
                .and_then(|e| e.name.clone())
                .map_or_else(|| Value::String(id.to_string()), Value::String)
        })
        .collect();
    #[allow(clippy::cast_precision_loss)]
    let entity_ids: Vec<Value> = payload
        .data
        .entities
        .iter()
        .map(|&id| Value::Number(id as f64))
        .collect();
    let entity_codes: Vec<Value> = payload
        .data
        .entities
        .iter()
        .map(|id| {
            entity_meta
                .get(id)
                .and_then(|e| e.code.clone())
                .map_or(Value::MISSING, Value::String)
        })
        .collect();

    let (time_def, time_values) = time_column(&payload.data.years, &display, config)?;
    let (value_def, values) = value_column(value_slug, payload, dimension, &display);

    let mut columns = vec![
        (
            ColumnDef::new(slugs::ENTITY_NAME, ColumnType::String).with_name("Entity"),
            entity_names.clone(),
        ),
        (
            ColumnDef::new(slugs::ENTITY_ID, ColumnType::Integer),
            entity_ids,
        ),
        (
            ColumnDef::new(slugs::ENTITY_CODE, ColumnType::String).with_name("Code"),
            entity_codes,
        ),
        (time_def, time_values),
        (value_def, values),
    ];

    if let Some(annotations) = display.entity_annotations_map.as_ref() {
        if !annotations.is_empty() {
            columns.push(annotation_column(
                value_slug,
                &display,
                metadata,
                annotations,
                &entity_names,
            ));
        }
    }

    Table::new(columns)
}

/// Builds the time column, re-basing day offsets onto the canonical epoch
/// when the variable counts from its own.
fn time_column(
    years: &[i64],
    display: &VariableDisplay,
    config: &EngineConfig,
) -> Result<(ColumnDef, Vec<Value>)> {
    if display.year_is_day {
        let offsets = match display.zero_day.as_deref() {
            Some(zero_day) if zero_day != config.zero_day => {
                shift_day_offsets(years, zero_day, &config.zero_day)?
            }
            _ => years.to_vec(),
        };
        let values = offsets.into_iter().map(Value::from).collect();
        Ok((
            ColumnDef::new(slugs::DAY, ColumnType::Day).with_name("Day"),
            values,
        ))
    } else {
        let values = years.iter().map(|&y| Value::from(y)).collect();
        Ok((
            ColumnDef::new(slugs::YEAR, ColumnType::Year).with_name("Year"),
            values,
        ))
    }
}

/// Builds the value column: JSON intake, type inference, conversion factor
/// with one-directional integer promotion, target-time/tolerance metadata.
fn value_column(
    slug: &str,
    payload: &VariablePayload,
    dimension: &DimensionConfig,
    display: &VariableDisplay,
) -> (ColumnDef, Vec<Value>) {
    let metadata = &payload.metadata;
    let mut values: Vec<Value> = payload.data.values.iter().map(Value::from_json).collect();

    let mut def = ColumnDef::new(slug, infer_value_type(&values));
    if let Some(name) = display.name.clone().or_else(|| metadata.name.clone()) {
        def = def.with_name(name);
    }
    def.unit = display.unit.clone();
    def.short_unit = display.short_unit.clone();
    def.tolerance = display.tolerance;
    def.target_time = dimension.target_year;
    def = def.with_provenance(metadata.id, metadata.dataset_id);

    if let Some(factor) = display.conversion_factor {
        for value in &mut values {
            if let Some(v) = value.as_number() {
                *value = Value::from(v * factor);
            }
        }
        def = def.converted_by(factor);
    }

    (def, values)
}

/// Infers the declared type from the converted values: Integer when every
/// numeric value is whole, Numeric when any is fractional, String when the
/// column carries no numbers at all.
fn infer_value_type(values: &[Value]) -> ColumnType {
    let mut saw_number = false;
    let mut saw_fraction = false;
    let mut saw_string = false;
    for value in values {
        match value {
            Value::Number(v) => {
                saw_number = true;
                if v.fract() != 0.0 {
                    saw_fraction = true;
                }
            }
            Value::String(_) => saw_string = true,
            Value::Error(_) => {}
        }
    }
    if saw_number {
        if saw_fraction {
            ColumnType::Numeric
        } else {
            ColumnType::Integer
        }
    } else if saw_string {
        ColumnType::String
    } else {
        ColumnType::Numeric
    }
}

/// Builds the parallel annotation column, keyed by resolved entity name.
fn annotation_column(
    value_slug: &str,
    display: &VariableDisplay,
    metadata: &VariableMetadata,
    annotations: &BTreeMap<String, String>,
    entity_names: &[Value],
) -> (ColumnDef, Vec<Value>) {
    let slug = format!("{value_slug}-annotations");
    let name = format!(
        "{} annotations",
        display
            .name
            .as_deref()
            .or(metadata.name.as_deref())
            .unwrap_or(value_slug)
    );
    let values = entity_names
        .iter()
        .map(|name| {
            name.as_str()
                .and_then(|n| annotations.get(n))
                .map_or(Value::MISSING, |text| Value::String(text.clone()))
        })
        .collect();
    let def = ColumnDef::new(slug, ColumnType::String)
        .with_name(name)
        .with_provenance(metadata.id, metadata.dataset_id);
    (def, values)
}
