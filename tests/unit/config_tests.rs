use catalogue_match::config::{
    Config, ConfigError, ConfigManager, EnvProvider, OutputFormatConfig,
};
use std::collections::HashMap;
use std::path::PathBuf;
use tempfile::TempDir;

struct FixedEnv(HashMap<&'static str, &'static str>);

impl EnvProvider for FixedEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).map(|value| value.to_string())
    }
}

#[tokio::test]
async fn test_file_then_environment_precedence() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("catalogue-match.toml");
    std::fs::write(
        &config_path,
        r#"
[processing]
max_workers = 12
limit = 40

[output]
format = "summary"
"#,
    )
    .unwrap();

    let from_file = ConfigManager::load_from_file(&config_path).await.unwrap();
    let merged = ConfigManager::merge_configs(Config::default(), from_file);
    let env = FixedEnv(HashMap::from([("CATALOGUE_MATCH_WORKERS", "6")]));
    let config = ConfigManager::apply_environment_overrides_with(&env, merged).unwrap();

    assert_eq!(config.processing.max_workers, Some(6));
    assert_eq!(config.processing.limit, Some(40));
    assert_eq!(config.output.format, OutputFormatConfig::Summary);
    assert_eq!(config.files.extensions, vec!["xml"]);
    assert_eq!(
        config.logging.file,
        Some(PathBuf::from("catalogue_process.log"))
    );
}

#[tokio::test]
async fn test_invalid_toml_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("broken.toml");
    std::fs::write(&config_path, "[processing\nmax_workers = ").unwrap();

    let result = ConfigManager::load_from_file(&config_path).await;

    assert!(matches!(result, Err(ConfigError::TomlParsing(_))));
}

#[test]
fn test_boolean_environment_values() {
    let env = FixedEnv(HashMap::from([
        ("CATALOGUE_MATCH_VERBOSE", "true"),
        ("CATALOGUE_MATCH_PROGRESS", "true"),
        ("CATALOGUE_MATCH_LOG_FILE", "logs/run.log"),
    ]));

    let config = ConfigManager::apply_environment_overrides_with(&env, Config::default()).unwrap();

    assert!(config.output.verbose);
    assert!(config.processing.show_progress);
    assert_eq!(config.logging.file, Some(PathBuf::from("logs/run.log")));
}

#[test]
fn test_verbose_and_quiet_together_rejected() {
    let mut config = Config::default();
    config.output.verbose = true;
    config.output.quiet = true;

    match ConfigManager::validate_config(&config) {
        Err(ConfigError::Validation(message)) => assert!(message.contains("verbose")),
        other => panic!("Expected validation error, got {:?}", other),
    }
}

#[test]
fn test_worker_upper_bound() {
    let mut config = Config::default();
    config.processing.max_workers = Some(1000);
    assert!(ConfigManager::validate_config(&config).is_ok());

    config.processing.max_workers = Some(1001);
    assert!(ConfigManager::validate_config(&config).is_err());
}
