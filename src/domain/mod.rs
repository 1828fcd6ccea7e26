//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Document Context: 输入文档与 MIME 类型
//! - Outcome Context: 推理结果与结果集

pub mod document;
pub mod outcome;

pub use document::{DocumentError, InputFile, MimeType};
pub use outcome::{FailureRecord, InferenceResult, ResultSet, RunSummary, SuccessRecord};
