//! Progress Layer - 批次进度显示

mod console_progress;

pub use console_progress::ConsoleProgress;
