//! Document Context - Value Objects

use std::path::{Path, PathBuf};

use super::DocumentError;

/// 输入文件
///
/// 启动时从输入目录枚举一次，之后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// 文件名（结果记录中的 filepath 字段）
    filename: String,
    /// 磁盘路径
    path: PathBuf,
}

impl InputFile {
    pub fn new(filename: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            path: path.into(),
        }
    }

    /// 由目录和文件名组合
    pub fn in_dir(dir: impl AsRef<Path>, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let path = dir.as_ref().join(&filename);
        Self { filename, path }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 小写扩展名（不含点）
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// 按扩展名推断 MIME 类型
    pub fn mime_type(&self) -> Result<MimeType, DocumentError> {
        let ext = self.extension().unwrap_or_default();
        MimeType::from_extension(&ext).ok_or(DocumentError::UnsupportedMimeType(ext))
    }
}

impl std::fmt::Display for InputFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.filename)
    }
}

/// 支持的文档 MIME 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeType {
    Pdf,
    Png,
    Jpeg,
}

impl MimeType {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

impl std::fmt::Display for MimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
