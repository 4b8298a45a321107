//! Error types for the snapshot store and its callers

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Caller input violates a precondition
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Prompt name or hash reference did not resolve
    #[error("Not found: {0}")]
    NotFound(String),

    /// Hash prefix matches more than one commit of the prompt
    #[error(
        "Short hash '{reference}' is ambiguous ({count} matches: {}). Use more characters.",
        .candidates.join(", ")
    )]
    AmbiguousReference {
        reference: String,
        count: usize,
        candidates: Vec<String>,
    },

    /// The SQLite backing store failed
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The database file or its directory could not be accessed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored row could not be decoded
    #[error("Corrupt commit record: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Process exit status the CLI reports for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::NotFound(_) => 3,
            Self::AmbiguousReference { .. } => 4,
            Self::Storage(_) | Self::Io(_) | Self::Corrupt(_) => 5,
        }
    }
}
