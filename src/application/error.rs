//! 应用层错误定义
//!
//! 只有启动阶段的错误会以 Err 形式向上传播；单文件错误在 FileTask 内部转为失败记录

use thiserror::Error;

use crate::application::ports::InferenceError;
use crate::domain::DocumentError;

/// 应用层错误（启动阶段，致命）
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 输入目录错误
    #[error("Input directory error: {0}")]
    InputError(String),

    /// 推理客户端构建失败
    #[error("Inference client error: {0}")]
    ClientError(String),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建输入目录错误
    pub fn input(message: impl Into<String>) -> Self {
        Self::InputError(message.into())
    }

    /// 创建推理客户端错误
    pub fn client(message: impl Into<String>) -> Self {
        Self::ClientError(message.into())
    }
}

/// 单文件任务错误
///
/// 由 FileTask 转换为 Failure 记录，不会越过任务边界
#[derive(Debug, Error)]
pub enum FileTaskError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("Response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
