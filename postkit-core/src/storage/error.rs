//! Error types for the key-value storage backends.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by key-value storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading a value from the backend failed.
    #[error("storage read error for '{key}': {message}")]
    Read {
        /// Key being read.
        key: String,
        /// Backend-specific description.
        message: String,
    },

    /// Writing or removing a value failed.
    #[error("storage write error for '{key}': {message}")]
    Write {
        /// Key being written.
        key: String,
        /// Backend-specific description.
        message: String,
    },

    /// Serialization/deserialization failures.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Errors coming from the device keystore.
    #[error("keystore error: {0}")]
    Keystore(String),

    /// The key contains characters the backend cannot address.
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),

    /// The backend lock was poisoned by a panicking writer.
    #[error("storage lock error: {0}")]
    Lock(String),
}

impl StorageError {
    /// Creates a read error for `key`.
    #[must_use]
    pub fn read<K: Into<String>, M: ToString>(key: K, message: M) -> Self {
        Self::Read {
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Creates a write error for `key`.
    #[must_use]
    pub fn write<K: Into<String>, M: ToString>(key: K, message: M) -> Self {
        Self::Write {
            key: key.into(),
            message: message.to_string(),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
