use std::path::PathBuf;

use survey_collect::{ClientConfig, ConfigError};
use survey_spec::ValidationScope;
use tempfile::tempdir;

#[test]
fn defaults_match_the_stock_backend() {
    let config = ClientConfig::default();
    assert_eq!(config.base_url, "http://localhost:3000");
    assert_eq!(config.timeout_secs, 5);
    assert_eq!(config.trigger_question_id, 2);
    assert_eq!(config.validation_scope, ValidationScope::Visible);
}

#[test]
fn partial_files_keep_remaining_defaults() {
    let config = ClientConfig::from_toml_str(
        r#"
base_url = "https://surveys.example.com/api"
validation_scope = "full_schema"
device_id_path = "/var/lib/survey/device-id"
"#,
    )
    .expect("valid toml");
    assert_eq!(config.base_url, "https://surveys.example.com/api");
    assert_eq!(config.validation_scope, ValidationScope::FullSchema);
    assert_eq!(config.timeout_secs, 5);
    assert_eq!(
        config.device_id_path(),
        Some(PathBuf::from("/var/lib/survey/device-id"))
    );
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().expect("temp dir");
    let config = ClientConfig::load(&dir.path().join("config.toml")).expect("defaults");
    assert_eq!(config, ClientConfig::default());
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "timeout_secs = \"soon\"").expect("write config");
    assert!(matches!(ClientConfig::load(&path), Err(ConfigError::Parse(_))));
}
