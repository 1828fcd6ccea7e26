//! Batch Coordinator - 批次并发协调器
//!
//! 一次性为所有输入文件创建 FileTask，并发上限由任务内部持有的信号量决定。
//! 按完成顺序收集结果；失败数达到阈值时停止收集并取消剩余任务。

use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;

use crate::application::context::BatchContext;
use crate::application::file_task::FileTask;
use crate::application::ports::{ProgressPort, ResultSinkPort, SinkError};
use crate::domain::{InferenceResult, InputFile, ResultSet};

/// 批次协调器
pub struct BatchCoordinator {
    ctx: Arc<BatchContext>,
    /// 失败数阈值，达到即提前终止
    max_failed: usize,
    progress: Arc<dyn ProgressPort>,
}

impl BatchCoordinator {
    pub fn new(ctx: Arc<BatchContext>, max_failed: usize, progress: Arc<dyn ProgressPort>) -> Self {
        Self {
            ctx,
            max_failed,
            progress,
        }
    }

    /// 处理所有文件，返回按完成顺序累积的结果集
    pub async fn run(&self, files: Vec<InputFile>) -> ResultSet {
        let total = files.len();
        tracing::info!(
            total,
            conc_tasks = self.ctx.conc_tasks(),
            max_failed = self.max_failed,
            engine = self.ctx.engine.name(),
            "Batch started"
        );
        self.progress.start(total as u64);

        let task = FileTask::new(self.ctx.clone());
        let mut pending: FuturesUnordered<_> =
            files.into_iter().map(|file| task.run(file)).collect();

        let mut results = ResultSet::new();
        while let Some(result) = pending.next().await {
            self.progress.advance();

            if let InferenceResult::Failure(record) = &result {
                tracing::debug!(file = %record.filepath, "Recorded failure");
            }
            results.record(result);

            if results.failed_count() >= self.max_failed {
                tracing::error!(
                    failed = results.failed_count(),
                    cancelled = pending.len(),
                    "Too many failed requests. Aborting..."
                );
                results.aborted = true;
                self.progress.aborted(results.failed_count());
                break;
            }
        }

        // 丢弃未完成的 future 即取消仍在进行的任务，许可随之释放
        drop(pending);
        self.progress.finish();

        tracing::info!(
            succeeded = results.successes.len(),
            failed = results.failed_count(),
            aborted = results.aborted,
            "Batch finished"
        );
        results
    }

    /// 处理所有文件并持久化结果集
    pub async fn run_and_persist(
        &self,
        files: Vec<InputFile>,
        sink: &dyn ResultSinkPort,
    ) -> Result<ResultSet, SinkError> {
        let results = self.run(files).await;
        sink.persist(&results).await?;
        Ok(results)
    }
}
