//! Fake Inference Client - 用于测试和 dry-run 的推理客户端
//!
//! 不调用外部服务，按文档内容匹配预设行为

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::application::ports::{
    GenerateRequest, GenerateResponse, InferenceEnginePort, InferenceError, Part,
};

/// 预设行为
#[derive(Debug, Clone)]
pub enum FakeBehavior {
    /// 始终返回给定文本
    Respond(String),
    /// 始终失败
    Fail(String),
    /// 前 `times` 次失败，之后返回 `then`
    FailTimes { times: u32, then: String },
}

/// Fake Inference Client 配置
#[derive(Debug, Clone)]
pub struct FakeInferenceClientConfig {
    /// 未匹配任何规则时返回的文本
    pub default_response: String,
    /// 模拟推理延迟
    pub latency: Duration,
}

impl Default for FakeInferenceClientConfig {
    fn default() -> Self {
        Self {
            default_response: "{}".to_string(),
            latency: Duration::ZERO,
        }
    }
}

/// Fake Inference Client
///
/// 以请求中的文档字节为 key 匹配行为，并记录调用统计
pub struct FakeInferenceClient {
    config: FakeInferenceClientConfig,
    rules: HashMap<Vec<u8>, FakeBehavior>,
    /// 文档内容 -> 已尝试次数
    attempts: Mutex<HashMap<Vec<u8>, u32>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeInferenceClient {
    pub fn new(config: FakeInferenceClientConfig) -> Self {
        tracing::info!(
            latency_ms = config.latency.as_millis() as u64,
            "FakeInferenceClient initialized"
        );
        Self {
            config,
            rules: HashMap::new(),
            attempts: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// 使用默认配置创建
    pub fn with_defaults() -> Self {
        Self::new(FakeInferenceClientConfig::default())
    }

    /// 为指定文档内容注册行为
    pub fn with_rule(mut self, content: impl Into<Vec<u8>>, behavior: FakeBehavior) -> Self {
        self.rules.insert(content.into(), behavior);
        self
    }

    /// generate 总调用次数
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 指定文档内容的调用次数
    pub fn attempts_for(&self, content: &[u8]) -> u32 {
        self.attempts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(content)
            .copied()
            .unwrap_or(0)
    }

    /// 观察到的最大并发调用数
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record_attempt(&self, key: &[u8]) -> u32 {
        let mut attempts = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        let count = attempts.entry(key.to_vec()).or_insert(0);
        *count += 1;
        *count
    }
}

/// 调用结束（包括被取消）时递减并发计数
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl InferenceEnginePort for FakeInferenceClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, InferenceError> {
        let key: &[u8] = request
            .contents
            .iter()
            .find_map(|part| match part {
                Part::InlineData { data, .. } => Some(data.as_slice()),
                Part::Text(_) => None,
            })
            .unwrap_or_default();

        self.calls.fetch_add(1, Ordering::SeqCst);
        let attempt = self.record_attempt(key);

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlightGuard(&self.in_flight);
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        tracing::debug!(
            model = %request.model,
            attempt,
            in_flight = current,
            "FakeInferenceClient: generating"
        );

        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }

        match self.rules.get(key) {
            None => Ok(GenerateResponse::new(self.config.default_response.clone())),
            Some(FakeBehavior::Respond(text)) => Ok(GenerateResponse::new(text.clone())),
            Some(FakeBehavior::Fail(message)) => Err(InferenceError::ServiceError {
                status: 500,
                body: message.clone(),
            }),
            Some(FakeBehavior::FailTimes { times, then }) => {
                if attempt <= *times {
                    Err(InferenceError::ServiceError {
                        status: 503,
                        body: format!("transient failure {}", attempt),
                    })
                } else {
                    Ok(GenerateResponse::new(then.clone()))
                }
            }
        }
    }

    fn name(&self) -> &str {
        "fake"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MimeType;
    use std::sync::Arc;

    fn request(data: &[u8]) -> GenerateRequest {
        GenerateRequest {
            model: "test-model".to_string(),
            contents: vec![
                Part::InlineData {
                    mime_type: MimeType::Pdf,
                    data: data.to_vec(),
                },
                Part::Text("extract".to_string()),
            ],
            config: Arc::default(),
        }
    }

    #[tokio::test]
    async fn test_default_response() {
        let client = FakeInferenceClient::with_defaults();
        let response = client.generate(&request(b"anything")).await.unwrap();
        assert_eq!(response.text, "{}");
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fail_times_then_respond() {
        let client = FakeInferenceClient::with_defaults().with_rule(
            b"doc".to_vec(),
            FakeBehavior::FailTimes {
                times: 2,
                then: r#"{"ok":true}"#.to_string(),
            },
        );

        assert!(client.generate(&request(b"doc")).await.is_err());
        assert!(client.generate(&request(b"doc")).await.is_err());
        let response = client.generate(&request(b"doc")).await.unwrap();
        assert_eq!(response.text, r#"{"ok":true}"#);
        assert_eq!(client.attempts_for(b"doc"), 3);
        assert_eq!(client.max_in_flight(), 1);
    }
}
