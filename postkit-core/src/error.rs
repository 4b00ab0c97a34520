use thiserror::Error;

use crate::storage::StorageError;

/// Error outputs from `PostKit`
#[derive(Debug, Error)]
pub enum PostKitError {
    /// The presented input is not valid for the requested operation
    #[error("invalid_input: {parameter}: {reason}")]
    InvalidInput {
        /// Name of the offending field.
        parameter: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// A storage backend failed; nothing was persisted by the failing call
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The feed loader has been cancelled or torn down
    #[error("feed_closed")]
    FeedClosed,
}

impl PostKitError {
    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input<P: Into<String>, R: Into<String>>(parameter: P, reason: R) -> Self {
        Self::InvalidInput {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for `PostKit` operations.
pub type PostKitResult<T, E = PostKitError> = std::result::Result<T, E>;
