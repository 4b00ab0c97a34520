use serde::{Deserialize, Serialize};

use crate::error::{PostKitError, PostKitResult};

/// Seed posts shown immediately on activation.
pub const DEFAULT_INITIAL_COUNT: usize = 60;
/// Seed posts revealed per scheduler idle slot.
pub const DEFAULT_BATCH_SIZE: usize = 200;

/// Tuning for incremental seed reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Number of seed posts exposed synchronously on activation.
    pub initial_count: usize,
    /// Number of seed posts appended per batch.
    pub batch_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            initial_count: DEFAULT_INITIAL_COUNT,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl FeedConfig {
    /// Checks that the configuration can make progress.
    ///
    /// # Errors
    ///
    /// Returns [`PostKitError::InvalidInput`] if `batch_size` is zero.
    pub fn validate(&self) -> PostKitResult<()> {
        if self.batch_size == 0 {
            return Err(PostKitError::invalid_input(
                "batch_size",
                "batch size must be at least 1",
            ));
        }
        Ok(())
    }
}
