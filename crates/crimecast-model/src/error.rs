use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("invalid artifact: {0}")]
    Artifact(String),

    #[error("no category for class index {0}")]
    UnknownClass(usize),
}
