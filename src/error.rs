use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FileFolderError>;

#[derive(Debug, Error)]
pub enum FileFolderError {
    #[error("File {} does not exist.", path.display())]
    NotFound { path: PathBuf },

    #[error("{}: {}", path.display(), source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON rendering failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl FileFolderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FileFolderError::Io {
            path: path.into(),
            source,
        }
    }
}
