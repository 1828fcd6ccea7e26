//! Configuration Module
//!
//! 提供运行配置管理功能，支持多层级配置来源：
//! - 环境变量（最高优先级）
//! - 配置文件（TOML / YAML 格式）
//! - 默认值（最低优先级）
//!
//! 以及 prompt 对与响应 schema 的加载

mod loader;
mod prompt;
mod types;

pub use loader::{load_config, load_config_from_path, print_config, validate_config, ConfigError};
pub use prompt::{load_prompt, load_schema, PromptPair};
pub use types::{
    AppConfig, BatchConfig, InputConfig, LogConfig, ModelConfig, OutputConfig, PromptConfig,
};
