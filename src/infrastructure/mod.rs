//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod progress;

pub use adapters::{
    FakeInferenceClient, InputDirectory, JsonFileResultSink, VertexClientConfig,
    VertexGeminiClient,
};
pub use progress::ConsoleProgress;
