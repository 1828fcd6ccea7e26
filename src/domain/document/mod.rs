//! Document Context - 输入文档上下文
//!
//! 职责:
//! - 输入文件标识
//! - 扩展名到 MIME 类型的映射

mod errors;
mod value_objects;

pub use errors::DocumentError;
pub use value_objects::{InputFile, MimeType};
