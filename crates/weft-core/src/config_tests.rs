//! Tests for `config` module

#[cfg(test)]
mod tests {
    use crate::config::*;

    #[test]
    fn test_config_default_values() {
        // Arrange & Act
        let config = WeftConfig::default();

        // Assert
        assert_eq!(config.engine.zero_day, DEFAULT_ZERO_DAY);
        assert_eq!(config.engine.time_slug, "time");
        assert_eq!(config.engine.default_tolerance, 0);
        assert_eq!(config.export.delimiter, ',');
    }

    #[test]
    fn test_from_toml_overrides_defaults() {
        let config = WeftConfig::from_toml(
            r#"
            [engine]
            zero_day = "2019-12-31"
            default_tolerance = 3
            "#,
        )
        .expect("parse");

        assert_eq!(config.engine.zero_day, "2019-12-31");
        assert_eq!(config.engine.default_tolerance, 3);
        // Untouched sections keep their defaults.
        assert_eq!(config.engine.time_slug, "time");
        assert_eq!(config.export.delimiter, ',');
    }

    #[test]
    fn test_from_toml_rejects_malformed_zero_day() {
        let result = WeftConfig::from_toml(
            r#"
            [engine]
            zero_day = "January 21, 2020"
            "#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key, .. }) if key == "engine.zero_day"
        ));
    }

    #[test]
    fn test_validate_rejects_empty_time_slug() {
        let mut config = WeftConfig::default();
        config.engine.time_slug = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_tolerance() {
        let mut config = WeftConfig::default();
        config.engine.default_tolerance = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_to_toml_round_trips() {
        let config = WeftConfig::default();
        let rendered = config.to_toml().expect("render");
        let parsed = WeftConfig::from_toml(&rendered).expect("parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_path_reads_file() {
        use std::io::Write;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("weft.toml");
        let mut file = std::fs::File::create(&path).expect("create");
        writeln!(file, "[export]\ndelimiter = \";\"").expect("write");

        let config = WeftConfig::load_from_path(&path).expect("load");
        assert_eq!(config.export.delimiter, ';');
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config =
            WeftConfig::load_from_path(dir.path().join("absent.toml")).expect("load");
        assert_eq!(config, WeftConfig::default());
    }
}
