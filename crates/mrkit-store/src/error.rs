use thiserror::Error;

/// Result type local to mrkit-store.
pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage instance unavailable: {0}")]
    Unavailable(String),

    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("table already exists: {0}")]
    TableExists(String),

    #[error("table '{table}' has no column family '{family}'")]
    UnknownFamily { table: String, family: String },

    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("corrupt stored data: {0}")]
    Corrupt(String),

    #[error("unsupported storage scheme '{0}'")]
    UnsupportedScheme(String),
}

impl StoreError {
    /// True when the engine cannot be reached or the table is missing; callers
    /// treat both as "storage unavailable".
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::TableNotFound(_))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Corrupt(e.to_string())
    }
}
