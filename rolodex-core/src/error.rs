//! Error types for the rolodex core library.

use thiserror::Error;

/// Top-level error type for all directory operations.
///
/// Read and clear failures on the persistence side never surface here:
/// loads degrade to an empty collection and clears are best-effort.
#[derive(Error, Debug)]
pub enum RolodexError {
    /// Another record already holds this email (compared case-insensitively).
    #[error("A contact with email {email} already exists")]
    DuplicateEmail {
        /// The rejected email, as supplied by the caller.
        email: String,
    },

    /// No record with the given ID exists.
    #[error("Contact not found: {0}")]
    NotFound(crate::ContactId),

    /// The store rejected a save. The in-memory change has been rolled back.
    #[error("Failed to persist contacts: {0}")]
    PersistenceWrite(String),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RolodexError {
    /// Wrap any store-side failure as a write failure.
    pub(crate) fn write(err: impl std::fmt::Display) -> Self {
        Self::PersistenceWrite(err.to_string())
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, RolodexError>;
