use thiserror::Error;

/// Failures reported by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    #[error("storage i/o error: {0}")]
    Io(String),
}

/// Errors surfaced by the scan engine
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("a scan is already running for target {0}")]
    AlreadyRunning(u64),

    #[error("invalid probe url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ScanError {
    pub fn target_not_found(id: u64) -> Self {
        ScanError::NotFound(format!("target {}", id))
    }
}
