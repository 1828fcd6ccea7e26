//! Outcome Context - Records

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 成功记录（结果文件中的一项）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessRecord {
    pub filepath: String,
    /// 模型返回文本解析后的 JSON
    pub response: Value,
}

/// 失败记录（失败文件中的一项）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub filepath: String,
    pub error: String,
}

/// 单文件推理结果
///
/// 不变量:
/// - 每个输入文件最多产生一个结果
/// - 创建后不再修改
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceResult {
    Success(SuccessRecord),
    Failure(FailureRecord),
}

impl InferenceResult {
    pub fn success(filepath: impl Into<String>, response: Value) -> Self {
        Self::Success(SuccessRecord {
            filepath: filepath.into(),
            response,
        })
    }

    pub fn failure(filepath: impl Into<String>, error: impl ToString) -> Self {
        Self::Failure(FailureRecord {
            filepath: filepath.into(),
            error: error.to_string(),
        })
    }

    pub fn filepath(&self) -> &str {
        match self {
            Self::Success(record) => &record.filepath,
            Self::Failure(record) => &record.filepath,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_record_shape() {
        let record = SuccessRecord {
            filepath: "a.pdf".to_string(),
            response: json!({"total": 12.5}),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({"filepath": "a.pdf", "response": {"total": 12.5}}));
    }

    #[test]
    fn test_failure_record_shape() {
        let result = InferenceResult::failure("b.png", "HTTP 503");
        assert!(!result.is_success());
        assert_eq!(result.filepath(), "b.png");

        let InferenceResult::Failure(record) = result else {
            panic!("expected failure");
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({"filepath": "b.png", "error": "HTTP 503"}));
    }
}
