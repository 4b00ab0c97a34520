//! Persistence for user-authored posts.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::PostKitResult;
use crate::post::{Post, PostDraft};
use crate::storage::{KeyValueStore, StorageResult, USER_POSTS_KEY};

/// Stores user-authored posts newest-first under [`USER_POSTS_KEY`].
///
/// Kept separate from the bundled seed dataset. Writes are serialized so
/// concurrent saves never drop a post.
pub struct PostStore {
    storage: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for PostStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostStore").finish_non_exhaustive()
    }
}

impl PostStore {
    /// Creates a post store over `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Returns user posts, newest first.
    ///
    /// Missing data yields an empty list. Read or parse failures are logged
    /// and also yield an empty list.
    pub async fn get_user_posts(&self) -> Vec<Post> {
        self.load_user_posts().await.unwrap_or_else(|e| {
            log::error!("Error loading user posts: {e}");
            Vec::new()
        })
    }

    async fn load_user_posts(&self) -> StorageResult<Vec<Post>> {
        match self.storage.get(USER_POSTS_KEY).await? {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Ok(Vec::new()),
        }
    }

    /// Prepends `post` to the stored list.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored list cannot be read or the updated
    /// list cannot be persisted. The stored list is unchanged in that case.
    pub async fn save_user_post(&self, post: Post) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let existing = self
            .load_user_posts()
            .await
            .inspect_err(|e| log::error!("Error loading user posts before save: {e}"))?;
        let mut updated = Vec::with_capacity(existing.len() + 1);
        updated.push(post);
        updated.extend(existing);

        let data = serde_json::to_string(&updated)?;
        self.storage
            .set(USER_POSTS_KEY, &data)
            .await
            .inspect_err(|e| log::error!("Error saving user post: {e}"))?;
        log::debug!("saved user post, {} stored", updated.len());
        Ok(())
    }

    /// Validates `draft` and saves the resulting post.
    ///
    /// Returns the saved post. On error nothing is persisted and the caller
    /// should keep the form contents.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PostKitError::InvalidInput`] for an invalid draft or
    /// [`crate::PostKitError::Storage`] if saving fails.
    pub async fn publish(&self, draft: &PostDraft) -> PostKitResult<Post> {
        let post = draft.to_post()?;
        self.save_user_post(post.clone()).await?;
        Ok(post)
    }

    /// Removes every stored user post. Failures are logged and ignored.
    pub async fn clear_user_posts(&self) {
        let _guard = self.write_lock.lock().await;
        if let Err(e) = self.storage.remove(USER_POSTS_KEY).await {
            log::error!("Error clearing user posts: {e}");
        }
    }
}
