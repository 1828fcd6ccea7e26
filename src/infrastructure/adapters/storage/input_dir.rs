//! Input Directory - 输入文件枚举
//!
//! 启动时列出一次输入目录中的普通文件，可选随机抽样

use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ApplicationError;
use crate::domain::InputFile;

/// 输入目录
pub struct InputDirectory {
    dir: PathBuf,
}

impl InputDirectory {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// 列出目录中的文件（按文件名排序），`sample` 指定时随机抽取该数量
    pub async fn list(&self, sample: Option<usize>) -> Result<Vec<InputFile>, ApplicationError> {
        let io_error = |e: std::io::Error| {
            ApplicationError::input(format!("Cannot read {}: {}", self.dir.display(), e))
        };

        let mut entries = fs::read_dir(&self.dir).await.map_err(io_error)?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let path = entry.path();
            let is_file = fs::metadata(&path)
                .await
                .map(|metadata| metadata.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }

            match entry.file_name().into_string() {
                Ok(name) => files.push(InputFile::new(name, path)),
                Err(name) => {
                    tracing::warn!(file = ?name, "Skipping file with non UTF-8 name");
                }
            }
        }

        files.sort_by(|a, b| a.filename().cmp(b.filename()));
        let found = files.len();

        if let Some(count) = sample {
            files = sample_files(files, count)?;
        }

        tracing::info!(
            dir = %self.dir.display(),
            found,
            selected = files.len(),
            "Input files enumerated"
        );
        Ok(files)
    }
}

/// 随机抽取 `count` 个文件，超过可用数量视为配置错误
pub fn sample_files(files: Vec<InputFile>, count: usize) -> Result<Vec<InputFile>, ApplicationError> {
    if count > files.len() {
        return Err(ApplicationError::validation(format!(
            "Sample size {} exceeds the {} files available",
            count,
            files.len()
        )));
    }

    let mut rng = rand::thread_rng();
    Ok(files.choose_multiple(&mut rng, count).cloned().collect())
}
