//! Tests for `variable` module

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::column::ColumnType;
    use crate::config::EngineConfig;
    use crate::error::Error;
    use crate::value::Value;
    use crate::variable::*;

    fn payload(values: Vec<serde_json::Value>, years: Vec<i64>) -> VariablePayload {
        VariablePayload {
            data: VariableData {
                entities: vec![1; values.len()],
                values,
                years,
            },
            metadata: VariableMetadata {
                id: 42,
                name: Some("Indicator".to_string()),
                dataset_id: Some(7),
                display: VariableDisplay::default(),
                dimensions: VariableDimensions {
                    entities: DimensionValues {
                        values: vec![EntityRecord {
                            id: 1,
                            name: Some("France".to_string()),
                            code: Some("FRA".to_string()),
                        }],
                    },
                    years: DimensionValues::default(),
                },
                source: None,
                origins: None,
            },
        }
    }

    fn dimension(slug: &str) -> DimensionConfig {
        DimensionConfig {
            variable_id: 42,
            property: "y".to_string(),
            slug: Some(slug.to_string()),
            target_year: None,
            display: None,
        }
    }

    // =========================================================================
    // Standard columns
    // =========================================================================

    #[test]
    fn test_builds_standard_columns() {
        let payload = payload(vec![serde_json::json!(10)], vec![2000]);
        let table =
            variable_table(&payload, &dimension("indicator"), &EngineConfig::default())
                .expect("table");

        let slugs: Vec<&str> = table.slugs().collect();
        assert_eq!(
            slugs,
            ["entityName", "entityId", "entityCode", "year", "indicator"]
        );
        assert_eq!(table.value_at("entityName", 0), Some(&Value::from("France")));
        assert_eq!(table.value_at("entityCode", 0), Some(&Value::from("FRA")));
        assert_eq!(table.value_at("year", 0), Some(&Value::from(2000)));
        assert_eq!(table.value_at("indicator", 0), Some(&Value::from(10)));
    }

    #[test]
    fn test_unmapped_entity_degrades_to_stringified_id() {
        let mut payload = payload(vec![serde_json::json!(1)], vec![2000]);
        payload.data.entities = vec![999];

        let table =
            variable_table(&payload, &dimension("indicator"), &EngineConfig::default())
                .expect("table");
        assert_eq!(table.value_at("entityName", 0), Some(&Value::from("999")));
        assert_eq!(table.value_at("entityCode", 0), Some(&Value::MISSING));
    }

    #[test]
    fn test_value_column_carries_provenance_and_metadata() {
        let mut payload = payload(vec![serde_json::json!(1.0)], vec![2000]);
        payload.metadata.display.unit = Some("people".to_string());
        payload.metadata.display.tolerance = Some(5);

        let mut dim = dimension("indicator");
        dim.target_year = Some(2015);

        let table = variable_table(&payload, &dim, &EngineConfig::default()).expect("table");
        let def = table.column("indicator").expect("column").def().clone();
        assert_eq!(def.variable_id, Some(42));
        assert_eq!(def.dataset_id, Some(7));
        assert_eq!(def.unit.as_deref(), Some("people"));
        assert_eq!(def.tolerance, Some(5));
        assert_eq!(def.target_time, Some(2015));
        assert_eq!(def.display_name(), "Indicator");
    }

    // =========================================================================
    // Conversion factor
    // =========================================================================

    #[test]
    fn test_fractional_conversion_factor_promotes_integer_column() {
        // Arrange: whole-number values declare an Integer column.
        let mut payload = payload(vec![serde_json::json!(4)], vec![2000]);
        payload.metadata.display.conversion_factor = Some(2.5);

        // Act
        let table =
            variable_table(&payload, &dimension("indicator"), &EngineConfig::default())
                .expect("table");

        // Assert: re-typed Numeric, value scaled.
        let column = table.column("indicator").expect("column");
        assert_eq!(column.def().column_type, ColumnType::Numeric);
        assert_eq!(column.values()[0], Value::from(10.0));
    }

    #[test]
    fn test_integral_conversion_factor_keeps_integer_type() {
        let mut payload = payload(vec![serde_json::json!(4)], vec![2000]);
        payload.metadata.display.conversion_factor = Some(100.0);

        let table =
            variable_table(&payload, &dimension("indicator"), &EngineConfig::default())
                .expect("table");
        let column = table.column("indicator").expect("column");
        assert_eq!(column.def().column_type, ColumnType::Integer);
        assert_eq!(column.values()[0], Value::from(400));
    }

    #[test]
    fn test_conversion_factor_skips_string_values() {
        let mut payload = payload(
            vec![serde_json::json!(2), serde_json::json!("no data")],
            vec![2000, 2001],
        );
        payload.data.entities = vec![1, 1];
        payload.metadata.display.conversion_factor = Some(3.0);

        let table =
            variable_table(&payload, &dimension("indicator"), &EngineConfig::default())
                .expect("table");
        let column = table.column("indicator").expect("column");
        assert_eq!(column.values()[0], Value::from(6));
        assert_eq!(column.values()[1], Value::from("no data"));
    }

    // =========================================================================
    // Day-based time
    // =========================================================================

    #[test]
    fn test_year_is_day_builds_day_column_with_epoch_shift() {
        let mut payload = payload(vec![serde_json::json!(1)], vec![25]);
        payload.metadata.display.year_is_day = true;
        payload.metadata.display.zero_day = Some("2020-01-01".to_string());

        let table =
            variable_table(&payload, &dimension("cases"), &EngineConfig::default())
                .expect("table");
        assert!(table.has_column("day"));
        assert!(!table.has_column("year"));
        // 2020-01-01 + 25 days, re-based onto the canonical 2020-01-21.
        assert_eq!(table.value_at("day", 0), Some(&Value::from(5)));
    }

    #[test]
    fn test_year_is_day_without_zero_day_uses_offsets_as_is() {
        let mut payload = payload(vec![serde_json::json!(1)], vec![-5]);
        payload.metadata.display.year_is_day = true;

        let table =
            variable_table(&payload, &dimension("cases"), &EngineConfig::default())
                .expect("table");
        assert_eq!(table.value_at("day", 0), Some(&Value::from(-5)));
    }

    #[test]
    fn test_malformed_zero_day_fails() {
        let mut payload = payload(vec![serde_json::json!(1)], vec![0]);
        payload.metadata.display.year_is_day = true;
        payload.metadata.display.zero_day = Some("01/21/2020".to_string());

        let result =
            variable_table(&payload, &dimension("cases"), &EngineConfig::default());
        assert!(matches!(result, Err(Error::DateParse(_))));
    }

    // =========================================================================
    // Annotations
    // =========================================================================

    #[test]
    fn test_annotation_column_keyed_by_entity_name() {
        let mut payload = payload(
            vec![serde_json::json!(1), serde_json::json!(2)],
            vec![2000, 2000],
        );
        payload.data.entities = vec![1, 999];
        let mut annotations = BTreeMap::new();
        annotations.insert("France".to_string(), "data revised".to_string());
        payload.metadata.display.entity_annotations_map = Some(annotations);

        let table =
            variable_table(&payload, &dimension("indicator"), &EngineConfig::default())
                .expect("table");
        let column = table.column("indicator-annotations").expect("column");
        assert_eq!(column.values()[0], Value::from("data revised"));
        assert_eq!(column.values()[1], Value::MISSING);
    }

    // =========================================================================
    // Errors and payload parsing
    // =========================================================================

    #[test]
    fn test_missing_slug_fails() {
        let payload = payload(vec![serde_json::json!(1)], vec![2000]);
        let mut dim = dimension("indicator");
        dim.slug = None;

        let result = variable_table(&payload, &dim, &EngineConfig::default());
        assert!(
            matches!(result, Err(Error::MissingColumnSlug { variable_id }) if variable_id == 42)
        );
    }

    #[test]
    fn test_mismatched_parallel_arrays_fail() {
        let mut payload = payload(vec![serde_json::json!(1)], vec![2000, 2001]);
        payload.data.entities = vec![1];

        let result =
            variable_table(&payload, &dimension("indicator"), &EngineConfig::default());
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_payload_deserializes_from_served_json() {
        let json = serde_json::json!({
            "data": { "entities": [1, 1], "values": [4.2, "note"], "years": [1983, 1985] },
            "metadata": {
                "id": 42,
                "name": "Indicator",
                "display": { "conversionFactor": 100, "yearIsDay": false },
                "dimensions": {
                    "entities": { "values": [{ "id": 1, "name": "France", "code": "FRA" }] },
                    "years": { "values": [{ "id": 1983 }, { "id": 1985 }] }
                }
            }
        });
        let payload: VariablePayload = serde_json::from_value(json).expect("deserialize");
        assert_eq!(payload.metadata.display.conversion_factor, Some(100.0));
        assert_eq!(payload.data.years, vec![1983, 1985]);
    }

    #[test]
    fn test_dimension_display_overrides_variable_display() {
        let mut payload = payload(vec![serde_json::json!(4)], vec![2000]);
        payload.metadata.display.conversion_factor = Some(2.0);

        let mut dim = dimension("indicator");
        dim.display = Some(VariableDisplay {
            conversion_factor: Some(10.0),
            ..VariableDisplay::default()
        });

        let table = variable_table(&payload, &dim, &EngineConfig::default()).expect("table");
        assert_eq!(
            table.column("indicator").expect("column").values()[0],
            Value::from(40)
        );
    }
}
