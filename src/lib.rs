//! docinfer - 批量文档推理
//!
//! 将目录中的文档（PDF / 图片）逐个发送给 Gemini（Vertex AI），
//! 收集结构化 JSON 响应与失败报告。
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Document Context: 输入文件与 MIME 类型
//! - Outcome Context: 推理结果与结果集
//!
//! 应用层 (application/):
//! - Ports: 端口定义（InferenceEngine, ResultSink, Progress）
//! - RetryPolicy / FileTask / BatchCoordinator
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: Vertex Gemini Client, Fake Client, 输入目录, JSON 结果文件
//! - Progress: 终端进度条

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
