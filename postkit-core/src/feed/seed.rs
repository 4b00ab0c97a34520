use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::post::Post;
use crate::storage::{StorageError, StorageResult};

/// Bundled, read-only set of posts shipped with the app.
///
/// Cloning is cheap; clones share the same posts.
#[derive(Debug, Clone, Default)]
pub struct SeedDataset {
    posts: Arc<[Post]>,
}

#[derive(Deserialize)]
struct SeedFile {
    #[serde(default)]
    posts: Option<Vec<Post>>,
}

impl SeedDataset {
    /// Wraps an in-memory list of posts.
    #[must_use]
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            posts: posts.into(),
        }
    }

    /// Parses a `{ "posts": [...] }` document. A missing or null `posts`
    /// field yields an empty dataset.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if the document is malformed.
    pub fn from_json(json: &str) -> StorageResult<Self> {
        let file: SeedFile = serde_json::from_str(json)?;
        Ok(Self::new(file.posts.unwrap_or_default()))
    }

    /// Reads and parses a seed document from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn from_path<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StorageError::read(path.display().to_string(), e))?;
        let seed = Self::from_json(&json)?;
        log::debug!("loaded {} seed posts from {}", seed.len(), path.display());
        Ok(seed)
    }

    /// Total number of seed posts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// Whether the dataset has no posts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// All seed posts in dataset order.
    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }
}
