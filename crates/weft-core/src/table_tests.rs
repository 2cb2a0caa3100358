//! Tests for `table` module

#[cfg(test)]
mod tests {
    use crate::column::{ColumnDef, ColumnType};
    use crate::error::Error;
    use crate::table::Table;
    use crate::value::Value;

    fn small_table() -> Table {
        Table::new(vec![
            (
                ColumnDef::new("entityName", ColumnType::String),
                vec![Value::from("France"), Value::from("Chad")],
            ),
            (
                ColumnDef::new("gdp", ColumnType::Numeric),
                vec![Value::from(1.5), Value::from(0.3)],
            ),
        ])
        .expect("valid table")
    }

    // =========================================================================
    // Construction
    // =========================================================================

    #[test]
    fn test_new_validates_equal_lengths() {
        let result = Table::new(vec![
            (
                ColumnDef::new("a", ColumnType::Numeric),
                vec![Value::from(1.0)],
            ),
            (
                ColumnDef::new("b", ColumnType::Numeric),
                vec![Value::from(1.0), Value::from(2.0)],
            ),
        ]);
        assert!(matches!(
            result,
            Err(Error::ShapeMismatch {
                expected: 1,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_new_rejects_duplicate_slug() {
        let result = Table::new(vec![
            (ColumnDef::new("a", ColumnType::Numeric), vec![]),
            (ColumnDef::new("a", ColumnType::Numeric), vec![]),
        ]);
        assert!(matches!(result, Err(Error::DuplicateSlug(slug)) if slug == "a"));
    }

    #[test]
    fn test_empty_table() {
        let table = Table::empty();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
        assert!(table.is_empty());
    }

    // =========================================================================
    // Access
    // =========================================================================

    #[test]
    fn test_column_lookup() {
        let table = small_table();
        assert_eq!(table.column("gdp").expect("present").slug(), "gdp");
        assert!(matches!(
            table.column("missing"),
            Err(Error::UnknownColumn(slug)) if slug == "missing"
        ));
    }

    #[test]
    fn test_value_at() {
        let table = small_table();
        assert_eq!(table.value_at("gdp", 1), Some(&Value::from(0.3)));
        assert_eq!(table.value_at("gdp", 2), None);
        assert_eq!(table.value_at("missing", 0), None);
    }

    #[test]
    fn test_records_preserve_column_order() {
        let table = small_table();
        let records = table.records();
        assert_eq!(records.len(), 2);
        let slugs: Vec<&String> = records[0].keys().collect();
        assert_eq!(slugs, ["entityName", "gdp"]);
        assert_eq!(records[1]["entityName"], Value::from("Chad"));
    }

    #[test]
    fn test_typed_accessors_clean_sentinels() {
        let table = Table::new(vec![(
            ColumnDef::new("v", ColumnType::Numeric),
            vec![Value::from(1.0), Value::NO_MATCH],
        )])
        .expect("valid table");
        let column = table.column("v").expect("present");

        let numeric: Vec<Option<f64>> = column.numeric_values().collect();
        assert_eq!(numeric, vec![Some(1.0), None]);

        let clean: Vec<Option<&Value>> = column.values_clean().collect();
        assert_eq!(clean[1], None);

        // The raw view keeps the sentinel.
        assert_eq!(column.values()[1], Value::NO_MATCH);
    }

    // =========================================================================
    // Transformation (never mutation)
    // =========================================================================

    #[test]
    fn test_with_column_appends_without_touching_source() {
        let table = small_table();
        let extended = table
            .with_column(
                ColumnDef::new("pop", ColumnType::Integer),
                vec![Value::from(67), Value::from(17)],
            )
            .expect("append");

        assert_eq!(extended.column_count(), 3);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_with_column_rejects_duplicate_and_shape_mismatch() {
        let table = small_table();
        assert!(matches!(
            table.with_column(ColumnDef::new("gdp", ColumnType::Numeric), vec![]),
            Err(Error::DuplicateSlug(_))
        ));
        assert!(matches!(
            table.with_column(
                ColumnDef::new("pop", ColumnType::Integer),
                vec![Value::from(67)],
            ),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_without_columns_ignores_unknown_slugs() {
        let table = small_table();
        let trimmed = table.without_columns(&["gdp", "not-there"]);
        assert_eq!(trimmed.column_count(), 1);
        assert_eq!(trimmed.row_count(), 2);
    }

    #[test]
    fn test_duplicate_column_shares_values_under_new_def() {
        let table = small_table();
        let duplicated = table
            .duplicate_column("gdp", ColumnDef::new("time", ColumnType::Time))
            .expect("duplicate");

        assert_eq!(
            duplicated.column("time").expect("present").values(),
            duplicated.column("gdp").expect("present").values()
        );
        assert!(matches!(
            table.duplicate_column("gdp", ColumnDef::new("gdp", ColumnType::Time)),
            Err(Error::DuplicateSlug(_))
        ));
        assert!(matches!(
            table.duplicate_column("nope", ColumnDef::new("time", ColumnType::Time)),
            Err(Error::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_select_rows_reorders_and_skips_out_of_range() {
        let table = small_table();
        let selected = table.select_rows(&[1, 0, 7]);
        assert_eq!(selected.row_count(), 2);
        assert_eq!(
            selected.value_at("entityName", 0),
            Some(&Value::from("Chad"))
        );
        assert_eq!(
            selected.value_at("entityName", 1),
            Some(&Value::from("France"))
        );
    }
}
