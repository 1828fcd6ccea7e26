//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod inference_engine;
mod progress;
mod result_sink;

pub use inference_engine::{
    GenerateRequest, GenerateResponse, GenerationConfig, InferenceEnginePort, InferenceError, Part,
};
pub use progress::{NoopProgress, ProgressPort};
pub use result_sink::{ResultSinkPort, SinkError};
