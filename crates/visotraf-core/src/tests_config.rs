use std::io::Write;

use crate::config::{ConfigError, SchedulerConfig};

#[test]
fn defaults_match_reference_constants() {
    let cfg = SchedulerConfig::default();
    assert_eq!(cfg.sample_interval_us, 10_000_000);
    assert_eq!(cfg.bounds.min_green_s, 20.0);
    assert_eq!(cfg.bounds.max_green_s, 90.0);
    assert_eq!(cfg.bounds.min_turn_s, 15.0);
    assert_eq!(cfg.bounds.max_turn_s, 30.0);
    assert!(cfg.validate().is_ok());
}

#[test]
fn partial_toml_keeps_defaults() {
    let cfg = SchedulerConfig::from_toml_str(
        r#"
        [bounds]
        max_green_s = 75.0
        "#,
    )
    .unwrap();
    assert_eq!(cfg.bounds.max_green_s, 75.0);
    assert_eq!(cfg.bounds.min_green_s, 20.0);
    assert_eq!(cfg.sample_interval_us, 10_000_000);
}

#[test]
fn inverted_bounds_are_rejected() {
    let err = SchedulerConfig::from_toml_str(
        r#"
        [bounds]
        min_turn_s = 40.0
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = SchedulerConfig::from_toml_str("sample_interval_us = 0").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = SchedulerConfig::from_toml_str("sample_interval_us = [").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn load_from_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "sample_interval_us = 5000000").unwrap();
    writeln!(file, "[bounds]").unwrap();
    writeln!(file, "min_green_s = 25.0").unwrap();
    file.flush().unwrap();

    let cfg = SchedulerConfig::load(file.path()).unwrap();
    assert_eq!(cfg.sample_interval_us, 5_000_000);
    assert_eq!(cfg.bounds.min_green_s, 25.0);
    assert_eq!(cfg.bounds.max_turn_s, 30.0);
}

#[test]
fn load_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = SchedulerConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Load(_)));
}
