//! Storage Adapter - 文件系统输入与结果输出

mod input_dir;
mod json_sink;

pub use input_dir::{sample_files, InputDirectory};
pub use json_sink::JsonFileResultSink;
