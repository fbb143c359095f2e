use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed config {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Empty output_path declared in {}", dir.display())]
    EmptyOutputPath { dir: PathBuf },
}

impl BatchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, BatchError>;
