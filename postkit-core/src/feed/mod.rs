//! Merged feed of user posts and a bundled seed dataset.
//!
//! A large seed dataset is not exposed all at once. [`FeedLoader::activate`]
//! shows the first [`FeedConfig::initial_count`] seed posts immediately, waits
//! for the host's interactions to settle, then appends
//! [`FeedConfig::batch_size`] posts per idle slot until the whole dataset is
//! visible. User posts always come first, newest first.

mod config;
mod loader;
mod scheduler;
mod seed;
mod view;

pub use config::{FeedConfig, DEFAULT_BATCH_SIZE, DEFAULT_INITIAL_COUNT};
pub use loader::{FeedHandle, FeedLoader};
pub use scheduler::{Scheduler, TokioScheduler};
pub use seed::SeedDataset;
pub use view::FeedView;
