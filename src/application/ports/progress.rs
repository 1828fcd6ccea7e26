//! Progress Port - 进度上报
//!
//! 纯副作用，不影响批次结果

/// Progress Port
pub trait ProgressPort: Send + Sync {
    /// 开始一个批次
    fn start(&self, total: u64);

    /// 完成一个任务
    fn advance(&self);

    /// 失败数达到阈值，批次即将终止（先于结果持久化）
    fn aborted(&self, failed: usize);

    /// 批次结束
    fn finish(&self);
}

/// 不输出任何进度
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressPort for NoopProgress {
    fn start(&self, _total: u64) {}

    fn advance(&self) {}

    fn aborted(&self, _failed: usize) {}

    fn finish(&self) {}
}
