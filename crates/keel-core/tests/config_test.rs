use std::io::Write;

use keel_core::config::*;
use keel_core::constants::codes;
use keel_core::errors::ConfigError;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = KeelConfig::from_toml("").unwrap();

    // Connection defaults
    assert_eq!(config.connection.address, "mem://local");
    assert_eq!(config.connection.database, "dal");
    assert_eq!(config.connection.collection, "example");
    assert!(config.connection.username.is_none());

    // Ledger defaults
    assert_eq!(config.ledger.opid_cap, 100);

    // Consistency defaults
    assert_eq!(config.consistency.linearizable_read_timeout_ms, 10_000);
    assert!(config.consistency.majority_read_timeout().is_none());

    // Classifier defaults
    assert!(config.classifier.transient_codes.contains(&codes::NETWORK_TIMEOUT));
    assert!(config.classifier.transient_codes.contains(&codes::MAX_TIME_MS_EXPIRED));
    assert_eq!(
        config.classifier.duplicate_key_codes,
        vec![codes::DUPLICATE_KEY, codes::DUPLICATE_KEY_ON_UPDATE]
    );
    assert!(config.classifier.terminal_codes.contains(&codes::DOCUMENT_VALIDATION_FAILURE));

    // Observability defaults
    assert_eq!(config.observability.log_level, "info");
    assert!(!config.observability.json);
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[connection]
address = "mem://replica-a"
username = "app"
password = "secret"

[ledger]
opid_cap = 10

[consistency]
majority_read_timeout_ms = 2500
"#;
    let config = KeelConfig::from_toml(toml).unwrap();
    assert_eq!(config.connection.address, "mem://replica-a");
    assert_eq!(config.connection.username.as_deref(), Some("app"));
    assert_eq!(config.ledger.opid_cap, 10);
    assert_eq!(
        config.consistency.majority_read_timeout().unwrap().as_millis(),
        2500
    );
    // Non-overridden fields keep defaults
    assert_eq!(config.connection.database, "dal");
    assert_eq!(config.consistency.linearizable_read_timeout_ms, 10_000);
}

#[test]
fn config_serde_roundtrip() {
    let config = KeelConfig::default();
    let toml_str = toml::to_string(&config).unwrap();
    let roundtripped = KeelConfig::from_toml(&toml_str).unwrap();
    assert_eq!(roundtripped.ledger.opid_cap, config.ledger.opid_cap);
    assert_eq!(
        roundtripped.classifier.transient_codes,
        config.classifier.transient_codes
    );
}

#[test]
fn config_rejects_zero_opid_cap() {
    let err = KeelConfig::from_toml("[ledger]\nopid_cap = 0\n").unwrap_err();
    match err {
        ConfigError::InvalidValue { field, .. } => assert_eq!(field, "ledger.opid_cap"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn config_rejects_unbounded_read_timeouts() {
    let mut config = KeelConfig::default();
    config.consistency.linearizable_read_timeout_ms = u64::MAX;
    match config.validate().unwrap_err() {
        ConfigError::InvalidValue { field, .. } => {
            assert_eq!(field, "consistency.linearizable_read_timeout_ms")
        }
        other => panic!("unexpected error: {other}"),
    }

    let mut config = KeelConfig::default();
    config.consistency.majority_read_timeout_ms = Some(defaults::MAX_READ_TIMEOUT_MS + 1);
    assert!(config.validate().is_err());

    let mut config = KeelConfig::default();
    config.consistency.linearizable_read_timeout_ms = defaults::MAX_READ_TIMEOUT_MS;
    config.consistency.majority_read_timeout_ms = Some(defaults::MAX_READ_TIMEOUT_MS);
    assert!(config.validate().is_ok());
}

#[test]
fn config_rejects_code_in_two_classes() {
    let toml = r#"
[classifier]
transient_codes = [89]
terminal_codes = [89]
"#;
    let err = KeelConfig::from_toml(toml).unwrap_err();
    assert!(err.to_string().contains("89"));
}

#[test]
fn config_rejects_username_without_password() {
    let err = KeelConfig::from_toml("[connection]\nusername = \"app\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn config_reports_malformed_toml() {
    let err = KeelConfig::from_toml("[ledger\nopid_cap = ").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn config_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[ledger]\nopid_cap = 42").unwrap();
    let config = KeelConfig::from_file(file.path()).unwrap();
    assert_eq!(config.ledger.opid_cap, 42);
}

#[test]
fn config_missing_file_is_reported_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = KeelConfig::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("absent.toml"));
}
