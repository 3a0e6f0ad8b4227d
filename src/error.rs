use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, GrfError>;

type AnyError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum GrfError {
    #[error("Upstream IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Unsupported GRF version: 0x{0:X}")]
    UnsupportedVersion(u32),
    #[error("Malformed directory: {0}")]
    MalformedDirectory(AnyError),
}
