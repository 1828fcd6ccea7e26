//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use super::prompt::PromptPair;
use crate::application::{GenerationConfig, RetryPolicy};
use crate::infrastructure::adapters::VertexClientConfig;

/// 应用主配置
///
/// 运行开始前加载一次，运行期间只读
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 输入配置
    #[serde(default)]
    pub input: InputConfig,

    /// 批次执行配置
    #[serde(default)]
    pub batch: BatchConfig,

    /// 模型与生成参数配置
    #[serde(default)]
    pub model: ModelConfig,

    /// Prompt 与 schema 文件配置
    #[serde(default)]
    pub prompt: PromptConfig,

    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// 由批次配置构建重试策略
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.batch.max_retries).with_backoff(
            Duration::from_millis(self.batch.backoff_multiplier_ms),
            Duration::from_secs(self.batch.backoff_max_secs),
        )
    }

    /// 组合生成参数、system prompt 与响应 schema
    pub fn generation_config(&self, prompt: &PromptPair, schema: Option<Value>) -> GenerationConfig {
        let model = &self.model;
        GenerationConfig {
            system_instruction: Some(prompt.system.clone()).filter(|s| !s.is_empty()),
            temperature: model.temperature,
            top_p: model.top_p,
            top_k: model.top_k,
            candidate_count: model.candidate_count,
            max_output_tokens: model.max_output_tokens,
            presence_penalty: model.presence_penalty,
            frequency_penalty: model.frequency_penalty,
            seed: model.seed,
            labels: model.labels.clone(),
            thinking_budget: model.thinking_budget,
            response_schema: schema,
        }
    }

    /// Vertex 客户端配置
    pub fn vertex_client_config(&self) -> VertexClientConfig {
        let mut config = VertexClientConfig::new(&self.model.project_id, &self.model.location)
            .with_timeout(self.model.request_timeout_secs);
        if let Some(endpoint) = &self.model.endpoint {
            config = config.with_endpoint(endpoint);
        }
        if let Some(token) = &self.model.access_token {
            config = config.with_access_token(token);
        }
        config
    }
}

/// 输入配置
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// 待处理文档目录
    #[serde(default = "default_folder_path", alias = "pdf_folder_path")]
    pub folder_path: PathBuf,

    /// 随机抽样数量，未设置则处理全部文件
    #[serde(default)]
    pub sample: Option<usize>,
}

fn default_folder_path() -> PathBuf {
    PathBuf::from("data/input")
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            folder_path: default_folder_path(),
            sample: None,
        }
    }
}

/// 批次执行配置
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// 最大并发任务数
    #[serde(default = "default_conc_tasks")]
    pub conc_tasks: usize,

    /// 单文件最大尝试次数（含首次调用）
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// 失败数达到该值即提前终止
    #[serde(default = "default_max_failed")]
    pub max_failed: usize,

    /// 指数退避基数（毫秒）
    #[serde(default = "default_backoff_multiplier_ms")]
    pub backoff_multiplier_ms: u64,

    /// 单次退避上限（秒）
    #[serde(default = "default_backoff_max_secs")]
    pub backoff_max_secs: u64,
}

fn default_conc_tasks() -> usize {
    5
}

fn default_max_retries() -> u32 {
    3
}

fn default_max_failed() -> usize {
    10
}

fn default_backoff_multiplier_ms() -> u64 {
    1000
}

fn default_backoff_max_secs() -> u64 {
    60
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            conc_tasks: default_conc_tasks(),
            max_retries: default_max_retries(),
            max_failed: default_max_failed(),
            backoff_multiplier_ms: default_backoff_multiplier_ms(),
            backoff_max_secs: default_backoff_max_secs(),
        }
    }
}

/// 模型与生成参数配置
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// 模型 ID
    #[serde(default = "default_model")]
    pub model: String,

    /// GCP 项目 ID
    #[serde(default)]
    pub project_id: String,

    /// GCP 区域
    #[serde(default = "default_location")]
    pub location: String,

    /// 覆盖 API Base URL
    #[serde(default)]
    pub endpoint: Option<String>,

    /// OAuth2 access token
    #[serde(default)]
    pub access_token: Option<String>,

    /// 单次请求超时时间（秒）
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub top_k: Option<u32>,
    #[serde(default)]
    pub candidate_count: Option<u32>,
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
    #[serde(default)]
    pub presence_penalty: Option<f32>,
    #[serde(default)]
    pub frequency_penalty: Option<f32>,
    #[serde(default)]
    pub seed: Option<i64>,

    /// 计费标签
    #[serde(default)]
    pub labels: HashMap<String, String>,

    /// thinking token 预算，0 表示关闭
    #[serde(default)]
    pub thinking_budget: Option<i32>,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_location() -> String {
    "us-central1".to_string()
}

fn default_request_timeout() -> u64 {
    300
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            project_id: String::new(),
            location: default_location(),
            endpoint: None,
            access_token: None,
            request_timeout_secs: default_request_timeout(),
            temperature: None,
            top_p: None,
            top_k: None,
            candidate_count: None,
            max_output_tokens: None,
            presence_penalty: None,
            frequency_penalty: None,
            seed: None,
            labels: HashMap::new(),
            thinking_budget: None,
        }
    }
}

/// Prompt 与 schema 文件配置
#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    /// Prompt YAML 文件（SYSTEM / USER）
    #[serde(default = "default_prompt_path")]
    pub prompt_path: PathBuf,

    /// 响应 JSON schema 文件
    #[serde(default = "default_schema_path")]
    pub schema_path: PathBuf,
}

fn default_prompt_path() -> PathBuf {
    PathBuf::from("misc/prompts/prompt.yaml")
}

fn default_schema_path() -> PathBuf {
    PathBuf::from("misc/schemas/schema.json")
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            prompt_path: default_prompt_path(),
            schema_path: default_schema_path(),
        }
    }
}

/// 输出配置
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// 成功结果文件
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,

    /// 失败请求文件
    #[serde(default = "default_failed_path")]
    pub failed_path: PathBuf,
}

fn default_results_path() -> PathBuf {
    PathBuf::from("misc/output/results.json")
}

fn default_failed_path() -> PathBuf {
    PathBuf::from("misc/output/failed_requests.json")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: default_results_path(),
            failed_path: default_failed_path(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.batch.conc_tasks, 5);
        assert_eq!(config.batch.max_retries, 3);
        assert_eq!(config.batch.max_failed, 10);
        assert_eq!(config.model.location, "us-central1");
        assert_eq!(config.output.results_path, PathBuf::from("misc/output/results.json"));
    }

    #[test]
    fn test_retry_policy_from_config() {
        let mut config = AppConfig::default();
        config.batch.max_retries = 5;
        config.batch.backoff_max_secs = 10;

        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.backoff_ceiling(1), Duration::from_secs(1));
        assert_eq!(policy.backoff_ceiling(6), Duration::from_secs(10));
    }

    #[test]
    fn test_generation_config_combines_prompt_and_schema() {
        let mut config = AppConfig::default();
        config.model.temperature = Some(0.0);
        config.model.thinking_budget = Some(128);

        let prompt = PromptPair {
            system: "Be exact.".to_string(),
            user: "Extract.".to_string(),
        };
        let generation = config.generation_config(&prompt, Some(json!({"type": "OBJECT"})));

        assert_eq!(generation.system_instruction.as_deref(), Some("Be exact."));
        assert_eq!(generation.temperature, Some(0.0));
        assert_eq!(generation.thinking_budget, Some(128));
        assert_eq!(generation.response_schema, Some(json!({"type": "OBJECT"})));
        assert!(generation.top_k.is_none());
    }
}
