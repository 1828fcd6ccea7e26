//! Inference Adapter - 推理引擎实现

mod fake_inference_client;
mod vertex_gemini_client;

pub use fake_inference_client::{FakeBehavior, FakeInferenceClient, FakeInferenceClientConfig};
pub use vertex_gemini_client::{VertexClientConfig, VertexGeminiClient};
