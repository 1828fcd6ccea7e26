//! Outcome Context - 推理结果上下文
//!
//! 职责:
//! - 单文件推理结果（成功 / 失败）
//! - 批次结果集与汇总

mod records;
mod result_set;

pub use records::{FailureRecord, InferenceResult, SuccessRecord};
pub use result_set::{ResultSet, RunSummary};
