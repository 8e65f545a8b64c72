/*!
 * Tests for application configuration functionality
 */

use mtqa::app_config::{Config, LogLevel, MAX_RETRY_COUNT};

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.translation.endpoint, "http://localhost:11434");
    assert_eq!(config.translation.model, "translategemma:4b");
    assert_eq!(config.artifacts.batch_input, "batch.json");
    assert_eq!(config.artifacts.batch_output, "batch_output.json");
    assert_eq!(config.artifacts.human_scores, "human_scores_agg.csv");
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();

    config.translation.model = "  ".to_string();
    assert!(config.validate().is_err());
    config.translation.model = "translategemma:4b".to_string();

    config.translation.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());

    config.translation.endpoint = "ftp://localhost:11434".to_string();
    assert!(config.validate().is_err());
    config.translation.endpoint = "http://127.0.0.1:11434".to_string();

    config.translation.temperature = 2.5;
    assert!(config.validate().is_err());
    config.translation.temperature = 0.0;
    assert!(config.validate().is_ok());
}

/// Test transport retries are bounded
#[test]
fn test_config_validation_withExcessiveRetries_shouldFail() {
    let mut config = Config::default();

    config.translation.retry_count = MAX_RETRY_COUNT;
    assert!(config.validate().is_ok());

    config.translation.retry_count = 64;
    assert!(config.validate().is_err());

    config.translation.retry_count = u32::MAX;
    assert!(config.validate().is_err());
}

/// Test partial config files fall back to defaults
#[test]
fn test_config_deserialize_withPartialJson_shouldFillDefaults() {
    let config: Config = serde_json::from_str(r#"{"translation": {"model": "gemma3:12b"}, "log_level": "debug"}"#).unwrap();
    assert_eq!(config.translation.model, "gemma3:12b");
    assert_eq!(config.translation.endpoint, "http://localhost:11434");
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.artifacts.auto_scores, "auto_scores.csv");
}

/// Test a missing config file is created with defaults
#[test]
fn test_loadOrCreate_missingFile_shouldWriteDefault() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("mtqa.json");

    let config = Config::load_or_create(&path).unwrap();
    assert_eq!(config, Config::default());
    assert!(path.exists());

    let reloaded = Config::load_or_create(&path).unwrap();
    assert_eq!(reloaded, config);
}

/// Test artifact paths resolve inside the working directory
#[test]
fn test_config_artifactPath_shouldJoinWorkDir() {
    let dir = common::create_temp_dir().unwrap();
    let config = common::test_config(dir.path());
    assert_eq!(config.artifact_path("x.csv"), dir.path().join("x.csv"));
    assert_eq!(config.refs_path(), dir.path().join("refs"));
}
