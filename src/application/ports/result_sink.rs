//! Result Sink Port - 出站端口
//!
//! 定义结果集持久化的抽象接口

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::ResultSet;

/// 结果持久化错误
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error writing {path}: {message}")]
    IoError { path: String, message: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result Sink Port - 出站端口
///
/// 成功集合与失败集合分别写入，两次写入之间不具备原子性
#[async_trait]
pub trait ResultSinkPort: Send + Sync {
    /// 持久化结果集（覆盖已有内容）
    async fn persist(&self, results: &ResultSet) -> Result<(), SinkError>;
}
