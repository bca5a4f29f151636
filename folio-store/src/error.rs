//! Storage errors.

/// Errors raised by a [`BlockStore`](crate::BlockStore).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store could not be opened or created
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Reading records failed
    #[error("Storage read error: {0}")]
    Read(String),

    /// Writing records failed (single or bulk)
    #[error("Storage write error: {0}")]
    Write(String),

    /// A persisted record could not be decoded
    #[error("Corrupt record '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

impl StoreError {
    /// Whether the error came from a read path (including undecodable records).
    pub fn is_read(&self) -> bool {
        matches!(self, StoreError::Read(_) | StoreError::Corrupt { .. })
    }

    pub(crate) fn read(e: impl std::fmt::Display) -> Self {
        StoreError::Read(e.to_string())
    }

    pub(crate) fn write(e: impl std::fmt::Display) -> Self {
        StoreError::Write(e.to_string())
    }

    pub(crate) fn unavailable(e: impl std::fmt::Display) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}
