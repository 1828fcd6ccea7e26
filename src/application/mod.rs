//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（InferenceEngine、ResultSink、Progress）
//! - retry: 推理调用重试策略
//! - file_task: 单文件推理任务
//! - coordinator: 批次并发协调
//! - error: 应用层错误定义

pub mod context;
pub mod coordinator;
pub mod error;
pub mod file_task;
pub mod ports;
pub mod retry;

pub use context::BatchContext;
pub use coordinator::BatchCoordinator;
pub use error::{ApplicationError, FileTaskError};
pub use file_task::FileTask;
pub use retry::RetryPolicy;

pub use ports::{
    // Inference engine
    GenerateRequest,
    GenerateResponse,
    GenerationConfig,
    InferenceEnginePort,
    InferenceError,
    Part,
    // Progress
    NoopProgress,
    ProgressPort,
    // Result sink
    ResultSinkPort,
    SinkError,
};
