//! Console Progress - 终端进度条
//!
//! 基于 indicatif 实现 ProgressPort；非终端输出时 indicatif 自动隐藏

use indicatif::{ProgressBar, ProgressStyle};

use crate::application::ports::ProgressPort;

const TEMPLATE: &str = "{msg} {bar:40.green} {pos}/{len} [{elapsed_precise}<{eta_precise}]";

/// 终端进度条
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        let bar = ProgressBar::new(0).with_style(style);
        bar.set_message("Processing files");
        Self { bar }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressPort for ConsoleProgress {
    fn start(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    fn advance(&self) {
        self.bar.inc(1);
    }

    fn aborted(&self, failed: usize) {
        // 进度条隐藏时 println 不输出，suspend 总会执行
        self.bar.suspend(|| {
            println!("\nToo many failed requests ({}). Aborting...", failed);
        });
    }

    fn finish(&self) {
        self.bar.finish();
    }
}
