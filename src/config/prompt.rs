//! Prompt & Schema Loader
//!
//! 加载 system / user prompt 对与响应 JSON schema

use config::{Config, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use super::loader::ConfigError;

/// Prompt 对
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PromptPair {
    /// system instruction
    #[serde(alias = "SYSTEM")]
    pub system: String,

    /// 附加在每个文档后面的用户指令
    #[serde(alias = "USER")]
    pub user: String,
}

/// 从 YAML（或 config crate 支持的其他格式）文件加载 prompt 对
pub fn load_prompt(path: &Path) -> Result<PromptPair, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .build()
        .map_err(|e| {
            ConfigError::LoadError(format!("Failed to read prompt file {}: {}", path.display(), e))
        })?;

    let prompt: PromptPair = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Invalid prompt file {}: {}", path.display(), e))
    })?;

    if prompt.user.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "USER prompt in {} cannot be empty",
            path.display()
        )));
    }

    Ok(prompt)
}

/// 加载响应 JSON schema
pub fn load_schema(path: &Path) -> Result<Value, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::LoadError(format!("Schema file not found at {}: {}", path.display(), e))
    })?;

    let schema: Value = serde_json::from_str(&text).map_err(|e| {
        ConfigError::ParseError(format!("Invalid JSON in schema file {}: {}", path.display(), e))
    })?;

    if !schema.is_object() {
        return Err(ConfigError::ValidationError(format!(
            "Schema in {} must be a JSON object",
            path.display()
        )));
    }

    Ok(schema)
}
