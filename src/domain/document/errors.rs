//! Document Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported mime type: no mapping for extension '{0}'")]
    UnsupportedMimeType(String),
}
