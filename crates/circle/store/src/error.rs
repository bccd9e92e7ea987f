use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-layer errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// A conditional update saw different state than the caller expected.
    #[error("stale {field}: expected {expected}, found {actual}")]
    Stale {
        field: &'static str,
        expected: u32,
        actual: u32,
    },

    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("ledger error: {0}")]
    Ledger(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn is_stale(&self) -> bool {
        matches!(self, StorageError::Stale { .. })
    }
}
