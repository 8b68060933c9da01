use thiserror::Error;

/// healthlog error types
#[derive(Error, Debug)]
pub enum HealthLogError {
    /// Stored partition could not be read or parsed
    #[error("storage read error: {0}")]
    StorageRead(String),

    /// Partition could not be serialized or written; the previous value is kept
    #[error("storage write error: {0}")]
    StorageWrite(String),

    /// Malformed user input, rejected before any mutation
    #[error("invalid input: {0}")]
    Validation(String),

    /// Edit or delete target does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl HealthLogError {
    /// Benign outcomes the caller reports as information, not failure.
    pub fn is_benign(&self) -> bool {
        matches!(self, HealthLogError::NotFound(_))
    }
}

/// Result type alias for healthlog
pub type Result<T> = std::result::Result<T, HealthLogError>;
