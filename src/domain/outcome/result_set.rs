//! Outcome Context - Result Set

use serde::Serialize;

use super::{FailureRecord, InferenceResult, SuccessRecord};

/// 批次结果集
///
/// 插入顺序即完成顺序（不是输入顺序）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub successes: Vec<SuccessRecord>,
    pub failures: Vec<FailureRecord>,
    /// 是否因失败数达到阈值而提前终止
    #[serde(skip)]
    pub aborted: bool,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按结果类型归入成功或失败集合
    pub fn record(&mut self, result: InferenceResult) {
        match result {
            InferenceResult::Success(record) => self.successes.push(record),
            InferenceResult::Failure(record) => self.failures.push(record),
        }
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    pub fn completed(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            succeeded: self.successes.len(),
            failed: self.failures.len(),
            aborted: self.aborted,
        }
    }
}

/// 运行汇总（一行可读文本）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub aborted: bool,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Done: {} succeeded, {} failed.",
            self.succeeded, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_partitions_results() {
        let mut set = ResultSet::new();
        set.record(InferenceResult::success("a.pdf", json!({})));
        set.record(InferenceResult::failure("b.pdf", "boom"));
        set.record(InferenceResult::success("c.pdf", json!([1])));

        assert_eq!(set.successes.len(), 2);
        assert_eq!(set.failed_count(), 1);
        assert_eq!(set.completed(), 3);
        assert_eq!(set.successes[1].filepath, "c.pdf");
    }

    #[test]
    fn test_summary_display() {
        let summary = RunSummary {
            succeeded: 2,
            failed: 1,
            aborted: false,
        };
        assert_eq!(summary.to_string(), "Done: 2 succeeded, 1 failed.");
    }
}
