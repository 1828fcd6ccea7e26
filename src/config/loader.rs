//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml / config.yaml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File, Map};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config/config", "config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `DOCINFER_`，层级分隔符 `__`）
/// 2. 配置文件（config/config.yaml、config.toml 或 config.local.toml 等）
/// 3. 默认值
///
/// # 环境变量示例
/// - `DOCINFER_INPUT__FOLDER_PATH=/data/pdfs`
/// - `DOCINFER_BATCH__CONC_TASKS=10`
/// - `DOCINFER_MODEL__PROJECT_ID=my-project`
/// - `DOCINFER_MODEL__ACCESS_TOKEN=$(gcloud auth print-access-token)`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_with_env(config_path, None)
}

/// `env` 为 None 时读取进程环境变量，否则只读取给定的变量表
fn load_with_env(
    config_path: Option<&Path>,
    env: Option<Map<String, String>>,
) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("input.folder_path", "data/input")?
        .set_default("batch.conc_tasks", 5)?
        .set_default("batch.max_retries", 3)?
        .set_default("batch.max_failed", 10)?
        .set_default("batch.backoff_multiplier_ms", 1000)?
        .set_default("batch.backoff_max_secs", 60)?
        .set_default("model.model", "gemini-2.5-flash")?
        .set_default("model.location", "us-central1")?
        .set_default("model.request_timeout_secs", 300)?
        .set_default("prompt.prompt_path", "misc/prompts/prompt.yaml")?
        .set_default("prompt.schema_path", "misc/schemas/schema.json")?
        .set_default("output.results_path", "misc/output/results.json")?
        .set_default("output.failed_path", "misc/output/failed_requests.json")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: DOCINFER_BATCH__MAX_FAILED=20
    builder = builder.add_source(
        Environment::with_prefix("DOCINFER")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(env),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.input.folder_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Input folder path cannot be empty".to_string(),
        ));
    }

    if config.input.sample == Some(0) {
        return Err(ConfigError::ValidationError(
            "Sample size must be at least 1".to_string(),
        ));
    }

    if config.batch.conc_tasks == 0 {
        return Err(ConfigError::ValidationError(
            "conc_tasks must be at least 1".to_string(),
        ));
    }

    if config.batch.max_retries == 0 {
        return Err(ConfigError::ValidationError(
            "max_retries must be at least 1".to_string(),
        ));
    }

    if config.batch.max_failed == 0 {
        return Err(ConfigError::ValidationError(
            "max_failed must be at least 1".to_string(),
        ));
    }

    if config.model.model.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Model cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Run Configuration ===");
    tracing::info!("Input Folder: {:?}", config.input.folder_path);
    if let Some(sample) = config.input.sample {
        tracing::info!("Sample: {}", sample);
    }
    tracing::info!("Concurrent Tasks: {}", config.batch.conc_tasks);
    tracing::info!("Max Retries: {}", config.batch.max_retries);
    tracing::info!("Max Failed: {}", config.batch.max_failed);
    tracing::info!("Model: {}", config.model.model);
    tracing::info!("Project: {} ({})", config.model.project_id, config.model.location);
    if let Some(endpoint) = &config.model.endpoint {
        tracing::info!("Endpoint Override: {}", endpoint);
    }
    tracing::info!(
        "Access Token: {}",
        if config.model.access_token.is_some() { "<set>" } else { "<none>" }
    );
    tracing::info!("Results: {:?}", config.output.results_path);
    tracing::info!("Failed Requests: {:?}", config.output.failed_path);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=========================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_conc_tasks() {
        let mut config = AppConfig::default();
        config.batch.conc_tasks = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_retries_and_threshold() {
        let mut config = AppConfig::default();
        config.batch.max_retries = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.batch.max_failed = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_sample() {
        let mut config = AppConfig::default();
        config.input.sample = Some(0);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_model() {
        let mut config = AppConfig::default();
        config.model.model = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("run.toml");
        std::fs::write(
            &path,
            r#"
[input]
folder_path = "/data/pdfs"
sample = 20

[batch]
conc_tasks = 8
max_failed = 4

[model]
model = "gemini-2.5-pro"
project_id = "acme"
temperature = 0.5
labels = { team = "finance" }
"#,
        )
        .unwrap();

        let config = load_config_from_path(Some(&path)).unwrap();
        assert_eq!(config.input.folder_path, PathBuf::from("/data/pdfs"));
        assert_eq!(config.input.sample, Some(20));
        assert_eq!(config.batch.conc_tasks, 8);
        assert_eq!(config.batch.max_failed, 4);
        assert_eq!(config.batch.max_retries, 3);
        assert_eq!(config.model.model, "gemini-2.5-pro");
        assert_eq!(config.model.project_id, "acme");
        assert_eq!(config.model.temperature, Some(0.5));
        assert_eq!(config.model.labels.get("team").map(String::as_str), Some("finance"));
        assert_eq!(config.model.location, "us-central1");
    }

    #[test]
    fn test_env_overrides_file_and_defaults() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("run.toml");
        std::fs::write(&path, "[batch]\nmax_failed = 4\nconc_tasks = 8\n").unwrap();

        let env = Map::from([
            ("DOCINFER_BATCH__MAX_FAILED".to_string(), "7".to_string()),
            ("DOCINFER_MODEL__LOCATION".to_string(), "europe-west4".to_string()),
        ]);
        let config = load_with_env(Some(&path), Some(env)).unwrap();

        assert_eq!(config.batch.max_failed, 7);
        assert_eq!(config.model.location, "europe-west4");
        assert_eq!(config.batch.conc_tasks, 8);
        assert_eq!(config.batch.max_retries, 3);
    }

    #[test]
    fn test_env_override_is_validated() {
        let env = Map::from([("DOCINFER_BATCH__CONC_TASKS".to_string(), "0".to_string())]);
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("empty.toml");
        std::fs::write(&path, "").unwrap();

        let result = load_with_env(Some(&path), Some(env));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp_dir = tempdir().unwrap();
        let result = load_config_from_path(Some(&temp_dir.path().join("absent.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_file_values_rejected() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("bad.toml");
        std::fs::write(&path, "[batch]\nconc_tasks = 0\n").unwrap();

        let result = load_config_from_path(Some(&path));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
