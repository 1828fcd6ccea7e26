//! Inference Engine Port - 生成式推理引擎抽象
//!
//! 定义单次 generate 调用的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::MimeType;

/// 推理错误
///
/// generate 返回的任何错误都会交给 RetryPolicy 重试
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: HTTP {status}: {body}")]
    ServiceError { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 请求内容片段
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// 二进制文档（PDF / 图片）
    InlineData { mime_type: MimeType, data: Vec<u8> },
    /// 文本指令
    Text(String),
}

/// 生成参数
///
/// 对应一次运行中所有请求共享的 generation config，运行期间只读
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationConfig {
    pub system_instruction: Option<String>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub candidate_count: Option<u32>,
    pub max_output_tokens: Option<u32>,
    pub presence_penalty: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub seed: Option<i64>,
    pub labels: HashMap<String, String>,
    pub thinking_budget: Option<i32>,
    /// 响应 JSON schema（响应 MIME 固定为 application/json）
    pub response_schema: Option<Value>,
}

/// 推理请求
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// 模型 ID
    pub model: String,
    /// 内容片段：[文档, 用户指令]
    pub contents: Vec<Part>,
    pub config: Arc<GenerationConfig>,
}

/// 推理响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateResponse {
    /// 模型返回的文本（预期为 JSON 编码字符串）
    pub text: String,
}

impl GenerateResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Inference Engine Port
///
/// 外部推理服务的抽象接口
#[async_trait]
pub trait InferenceEnginePort: Send + Sync {
    /// 执行一次推理调用
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, InferenceError>;

    /// 引擎名称（用于日志）
    fn name(&self) -> &str;
}
