//! Error taxonomy for the content store.

use std::path::PathBuf;

use thiserror::Error;

/// Underlying cause of an [`StoreError::Unavailable`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by store operations and startup seeding
#[derive(Debug, Error)]
pub enum StoreError {
    /// Appended text was empty after trimming
    #[error("No text provided")]
    InvalidInput,

    /// Storage could not be read or written
    #[error("Storage unavailable: {0}")]
    Unavailable(#[source] BoxError),

    /// Seed document missing or malformed (non-fatal at startup)
    #[error("Seed unreadable: {}: {reason}", path.display())]
    SeedUnreadable { path: PathBuf, reason: String },
}

impl StoreError {
    /// Storage failure described by a message rather than a lower-level error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into().into())
    }

    /// Whether the caller supplied bad input, as opposed to a storage fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Unavailable(Box::new(err))
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Unavailable(Box::new(err))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Unavailable(Box::new(err))
    }
}
