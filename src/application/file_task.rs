//! File Task - 单文件推理任务
//!
//! 一个输入文件恰好产生一个 InferenceResult；任何错误都不会越过任务边界

use serde_json::Value;
use std::sync::Arc;

use crate::application::context::BatchContext;
use crate::application::error::FileTaskError;
use crate::application::ports::{GenerateRequest, Part};
use crate::domain::{InferenceResult, InputFile};

/// 单文件推理任务
#[derive(Clone)]
pub struct FileTask {
    ctx: Arc<BatchContext>,
}

impl FileTask {
    pub fn new(ctx: Arc<BatchContext>) -> Self {
        Self { ctx }
    }

    /// 执行任务
    ///
    /// 在整个任务生命周期内持有一个信号量许可，任何退出路径都会释放
    pub async fn run(&self, file: InputFile) -> InferenceResult {
        let _permit = match self.ctx.semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                tracing::error!(file = %file, error = %e, "Failed to acquire semaphore permit");
                return InferenceResult::failure(file.filename(), e);
            }
        };

        match self.process(&file).await {
            Ok(response) => {
                tracing::debug!(file = %file, "Inference succeeded");
                InferenceResult::success(file.filename(), response)
            }
            Err(e) => {
                tracing::warn!(file = %file, error = %e, "Inference failed");
                InferenceResult::failure(file.filename(), e)
            }
        }
    }

    async fn process(&self, file: &InputFile) -> Result<Value, FileTaskError> {
        let mime_type = file.mime_type()?;
        let data = tokio::fs::read(file.path())
            .await
            .map_err(|source| FileTaskError::Io {
                path: file.path().display().to_string(),
                source,
            })?;

        tracing::debug!(
            file = %file,
            mime_type = %mime_type,
            size = data.len(),
            "Sending document for inference"
        );

        let request = GenerateRequest {
            model: self.ctx.model.clone(),
            contents: vec![
                Part::InlineData { mime_type, data },
                Part::Text(self.ctx.user_prompt.clone()),
            ],
            config: self.ctx.generation.clone(),
        };

        let engine = self.ctx.engine.as_ref();
        let request = &request;
        let response = self
            .ctx
            .retry
            .run(move || engine.generate(request))
            .await?;

        Ok(serde_json::from_str(&response.text)?)
    }
}
