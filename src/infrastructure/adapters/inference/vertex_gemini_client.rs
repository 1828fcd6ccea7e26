//! Vertex Gemini Client - 通过 Vertex AI REST API 调用 Gemini
//!
//! 实现 InferenceEnginePort trait
//!
//! Vertex AI generateContent API:
//! POST https://{location}-aiplatform.googleapis.com/v1/projects/{project}/locations/{location}/publishers/google/models/{model}:generateContent
//! Request: contents + systemInstruction + generationConfig + labels (JSON)
//! Response: candidates[0].content.parts[].text

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    GenerateRequest, GenerateResponse, GenerationConfig, InferenceEnginePort, InferenceError, Part,
};

/// 结构化输出固定使用 JSON
const RESPONSE_MIME_TYPE: &str = "application/json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VertexRequest<'a> {
    contents: Vec<VertexContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<VertexContent>,
    generation_config: VertexGenerationConfig<'a>,
    #[serde(skip_serializing_if = "no_labels")]
    labels: &'a HashMap<String, String>,
}

fn no_labels(labels: &&HashMap<String, String>) -> bool {
    labels.is_empty()
}

#[derive(Debug, Serialize)]
struct VertexContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<VertexPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VertexPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    /// base64 编码的文件内容
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VertexGenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidate_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
    response_mime_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VertexResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    /// thinking 摘要，不属于回答内容
    #[serde(default)]
    thought: bool,
}

/// Vertex Gemini 客户端配置
#[derive(Debug, Clone)]
pub struct VertexClientConfig {
    /// GCP 项目 ID
    pub project_id: String,
    /// GCP 区域，例如 us-central1
    pub location: String,
    /// 覆盖默认的 API Base URL（代理或本地测试）
    pub endpoint: Option<String>,
    /// OAuth2 access token（Bearer）
    pub access_token: Option<String>,
    /// 单次请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for VertexClientConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            location: "us-central1".to_string(),
            endpoint: None,
            access_token: None,
            timeout_secs: 300,
        }
    }
}

impl VertexClientConfig {
    pub fn new(project_id: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            location: location.into(),
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    fn base_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://{}-aiplatform.googleapis.com", self.location),
        }
    }
}

/// Vertex Gemini 客户端
pub struct VertexGeminiClient {
    client: Client,
    config: VertexClientConfig,
}

impl VertexGeminiClient {
    /// 创建新的 Vertex Gemini 客户端
    pub fn new(config: VertexClientConfig) -> Result<Self, ApplicationError> {
        if config.project_id.trim().is_empty() {
            return Err(ApplicationError::client("project_id cannot be empty"));
        }
        if config.location.trim().is_empty() {
            return Err(ApplicationError::client("location cannot be empty"));
        }
        if config.access_token.is_none() {
            tracing::warn!("No access token configured, requests are sent without authorization");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApplicationError::client(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// 获取 generateContent URL
    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            self.config.base_url(),
            self.config.project_id,
            self.config.location,
            model
        )
    }
}

fn build_request(request: &GenerateRequest) -> VertexRequest<'_> {
    let parts = request
        .contents
        .iter()
        .map(|part| match part {
            Part::InlineData { mime_type, data } => VertexPart {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: mime_type.as_str(),
                    data: BASE64.encode(data),
                }),
            },
            Part::Text(text) => VertexPart {
                text: Some(text.clone()),
                inline_data: None,
            },
        })
        .collect();

    let config: &GenerationConfig = &request.config;
    VertexRequest {
        contents: vec![VertexContent {
            role: Some("user"),
            parts,
        }],
        system_instruction: config.system_instruction.as_ref().map(|text| VertexContent {
            role: None,
            parts: vec![VertexPart {
                text: Some(text.clone()),
                inline_data: None,
            }],
        }),
        generation_config: VertexGenerationConfig {
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            candidate_count: config.candidate_count,
            max_output_tokens: config.max_output_tokens,
            presence_penalty: config.presence_penalty,
            frequency_penalty: config.frequency_penalty,
            seed: config.seed,
            response_mime_type: RESPONSE_MIME_TYPE,
            response_schema: config.response_schema.as_ref(),
            thinking_config: config
                .thinking_budget
                .map(|thinking_budget| ThinkingConfig { thinking_budget }),
        },
        labels: &config.labels,
    }
}

/// 拼接首个候选中的回答文本
fn extract_text(response: VertexResponse) -> Result<String, InferenceError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| InferenceError::InvalidResponse("No candidates in response".to_string()))?;

    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|part| !part.thought)
        .filter_map(|part| part.text)
        .collect();

    if text.is_empty() {
        return Err(InferenceError::InvalidResponse(format!(
            "No text in response (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }
    Ok(text)
}

#[async_trait]
impl InferenceEnginePort for VertexGeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, InferenceError> {
        let url = self.generate_url(&request.model);
        let body = build_request(request);

        tracing::debug!(url = %url, parts = body.contents[0].parts.len(), "Sending generateContent request");

        let mut builder = self.client.post(&url).json(&body);
        if let Some(token) = &self.config.access_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout
            } else if e.is_connect() {
                InferenceError::NetworkError(format!("Cannot connect to Vertex AI: {}", e))
            } else {
                InferenceError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
            return Err(InferenceError::ServiceError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: VertexResponse = response.json().await.map_err(|e| {
            InferenceError::InvalidResponse(format!("Failed to parse Vertex response: {}", e))
        })?;

        let text = extract_text(parsed)?;
        tracing::debug!(model = %request.model, text_len = text.len(), "generateContent completed");

        Ok(GenerateResponse::new(text))
    }

    fn name(&self) -> &str {
        "vertex-gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MimeType;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_config_builder() {
        let config = VertexClientConfig::new("my-project", "europe-west4")
            .with_timeout(60)
            .with_access_token("token");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.base_url(), "https://europe-west4-aiplatform.googleapis.com");

        let config = config.with_endpoint("http://localhost:9000/");
        assert_eq!(config.base_url(), "http://localhost:9000");
    }

    #[test]
    fn test_generate_url() {
        let client = VertexGeminiClient::new(VertexClientConfig::new("proj", "us-central1")).unwrap();
        assert_eq!(
            client.generate_url("gemini-2.5-flash"),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/proj/locations/us-central1/publishers/google/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_empty_project_rejected() {
        let result = VertexGeminiClient::new(VertexClientConfig::new("", "us-central1"));
        assert!(matches!(result, Err(ApplicationError::ClientError(_))));

        let result = VertexGeminiClient::new(VertexClientConfig::new("proj", " "));
        assert!(matches!(result, Err(ApplicationError::ClientError(_))));
    }

    #[test]
    fn test_request_body() {
        let mut labels = HashMap::new();
        labels.insert("team".to_string(), "docs".to_string());
        let request = GenerateRequest {
            model: "gemini-2.5-flash".to_string(),
            contents: vec![
                Part::InlineData {
                    mime_type: MimeType::Png,
                    data: b"hi".to_vec(),
                },
                Part::Text("Extract.".to_string()),
            ],
            config: Arc::new(GenerationConfig {
                system_instruction: Some("You are precise.".to_string()),
                temperature: Some(0.5),
                max_output_tokens: Some(1024),
                seed: Some(7),
                labels,
                thinking_budget: Some(0),
                response_schema: Some(json!({"type": "OBJECT"})),
                ..Default::default()
            }),
        };

        let body = serde_json::to_value(build_request(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"inlineData": {"mimeType": "image/png", "data": "aGk="}},
                        {"text": "Extract."}
                    ]
                }],
                "systemInstruction": {"parts": [{"text": "You are precise."}]},
                "generationConfig": {
                    "temperature": 0.5,
                    "maxOutputTokens": 1024,
                    "seed": 7,
                    "responseMimeType": "application/json",
                    "responseSchema": {"type": "OBJECT"},
                    "thinkingConfig": {"thinkingBudget": 0}
                },
                "labels": {"team": "docs"}
            })
        );
    }

    #[test]
    fn test_extract_text_skips_thoughts() {
        let response: VertexResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "thinking...", "thought": true},
                    {"text": "{\"a\":"},
                    {"text": "1}"}
                ]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn test_extract_text_without_content() {
        let response: VertexResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }))
        .unwrap();
        let err = extract_text(response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));

        let empty: VertexResponse = serde_json::from_value(json!({})).unwrap();
        assert!(extract_text(empty).is_err());
    }

    /// 启动只响应一次的本地 HTTP 服务，返回其地址
    async fn serve_once(response: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            // 读完请求头与请求体后再响应
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf);
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn text_request() -> GenerateRequest {
        GenerateRequest {
            model: "gemini-2.5-flash".to_string(),
            contents: vec![Part::Text("hello".to_string())],
            config: Arc::new(GenerationConfig::default()),
        }
    }

    #[tokio::test]
    async fn test_generate_parses_success_response() {
        let endpoint = serve_once(concat!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 65\r\n\r\n",
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"ok\":true}"}]}}]}"#
        ))
        .await;
        let client = VertexGeminiClient::new(
            VertexClientConfig::new("proj", "us-central1").with_endpoint(endpoint),
        )
        .unwrap();

        let response = client.generate(&text_request()).await.unwrap();
        assert_eq!(response.text, r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn test_generate_maps_http_error_with_body() {
        let endpoint = serve_once(
            "HTTP/1.1 429 Too Many Requests\r\nContent-Length: 14\r\n\r\nquota exceeded",
        )
        .await;
        let client = VertexGeminiClient::new(
            VertexClientConfig::new("proj", "us-central1").with_endpoint(endpoint),
        )
        .unwrap();

        let err = client.generate(&text_request()).await.unwrap_err();
        assert!(matches!(
            err,
            InferenceError::ServiceError { status: 429, ref body } if body == "quota exceeded"
        ));
    }

    #[tokio::test]
    async fn test_generate_reports_unreadable_error_body() {
        // 声明的长度大于实际发送的字节数，读取响应体会失败
        let endpoint = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\npartial",
        )
        .await;
        let client = VertexGeminiClient::new(
            VertexClientConfig::new("proj", "us-central1").with_endpoint(endpoint),
        )
        .unwrap();

        let err = client.generate(&text_request()).await.unwrap_err();
        match err {
            InferenceError::ServiceError { status, body } => {
                assert_eq!(status, 500);
                assert!(body.starts_with("<unreadable body:"), "body was {body}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
