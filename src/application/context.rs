//! Batch Context - 批次共享上下文
//!
//! 显式注入到每个 FileTask 的只读依赖集合，唯一可变的共享资源是信号量

use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::application::ports::{GenerationConfig, InferenceEnginePort};
use crate::application::retry::RetryPolicy;

/// 批次共享上下文
pub struct BatchContext {
    /// 推理引擎
    pub engine: Arc<dyn InferenceEnginePort>,
    /// 模型 ID
    pub model: String,
    /// 附加在每个文档后面的用户指令
    pub user_prompt: String,
    /// 生成参数（含 system instruction 与 response schema）
    pub generation: Arc<GenerationConfig>,
    /// 重试策略
    pub retry: RetryPolicy,
    /// 并发限制器
    pub semaphore: Arc<Semaphore>,
    conc_tasks: usize,
}

impl BatchContext {
    pub fn new(
        engine: Arc<dyn InferenceEnginePort>,
        model: impl Into<String>,
        user_prompt: impl Into<String>,
        generation: Arc<GenerationConfig>,
        retry: RetryPolicy,
        conc_tasks: usize,
    ) -> Self {
        let conc_tasks = conc_tasks.max(1);
        Self {
            engine,
            model: model.into(),
            user_prompt: user_prompt.into(),
            generation,
            retry,
            semaphore: Arc::new(Semaphore::new(conc_tasks)),
            conc_tasks,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 并发上限
    pub fn conc_tasks(&self) -> usize {
        self.conc_tasks
    }
}
