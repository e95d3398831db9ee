use mrkit_store::StoreError;
use thiserror::Error;

/// Result type local to mrkit-history.
pub type Result<T> = std::result::Result<T, HistoryError>;

#[derive(Debug, Error)]
pub enum HistoryError {
    /// Engine unreachable or history table missing.
    #[error("job history unavailable: {0}")]
    StorageUnavailable(String),

    #[error("no job history record for job id '{0}'")]
    RecordNotFound(String),

    #[error("corrupt job history record '{job_id}': {reason}")]
    Corrupt { job_id: String, reason: String },

    #[error("cannot encode job history cell: {0}")]
    Encode(#[from] mrkit_core::Error),

    #[error("job history storage error: {0}")]
    Storage(StoreError),
}

impl HistoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, HistoryError::RecordNotFound(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, HistoryError::StorageUnavailable(_))
    }
}

impl From<StoreError> for HistoryError {
    fn from(e: StoreError) -> Self {
        if e.is_unavailable() {
            HistoryError::StorageUnavailable(e.to_string())
        } else {
            HistoryError::Storage(e)
        }
    }
}
