//! JSON File Result Sink - 结果集文件持久化
//!
//! 实现 ResultSinkPort trait：成功集合与失败集合各写一个 JSON 数组文件

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{ResultSinkPort, SinkError};
use crate::domain::ResultSet;

/// JSON 文件结果输出
pub struct JsonFileResultSink {
    /// 成功结果文件
    results_path: PathBuf,
    /// 失败请求文件
    failed_path: PathBuf,
}

impl JsonFileResultSink {
    pub fn new(results_path: impl AsRef<Path>, failed_path: impl AsRef<Path>) -> Self {
        Self {
            results_path: results_path.as_ref().to_path_buf(),
            failed_path: failed_path.as_ref().to_path_buf(),
        }
    }

    pub fn results_path(&self) -> &Path {
        &self.results_path
    }

    pub fn failed_path(&self) -> &Path {
        &self.failed_path
    }
}

fn io_error(path: &Path, e: std::io::Error) -> SinkError {
    SinkError::IoError {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// 写入缩进格式的 JSON（覆盖已有文件）
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), SinkError> {
    let bytes =
        serde_json::to_vec_pretty(value).map_err(|e| SinkError::SerializationError(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error(parent, e))?;
    }

    fs::write(path, bytes).await.map_err(|e| io_error(path, e))
}

#[async_trait]
impl ResultSinkPort for JsonFileResultSink {
    async fn persist(&self, results: &ResultSet) -> Result<(), SinkError> {
        write_json(&self.results_path, &results.successes).await?;
        write_json(&self.failed_path, &results.failures).await?;

        tracing::info!(
            results_path = %self.results_path.display(),
            failed_path = %self.failed_path.display(),
            succeeded = results.successes.len(),
            failed = results.failures.len(),
            "Results persisted"
        );
        Ok(())
    }
}
