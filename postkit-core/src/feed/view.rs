use std::sync::Arc;

use crate::post::Post;

use super::seed::SeedDataset;

/// Snapshot of the merged feed: user posts (newest first) followed by the
/// revealed prefix of the seed dataset.
///
/// Snapshots are cheap to clone; posts are shared, not copied.
#[derive(Debug, Clone)]
pub struct FeedView {
    user_posts: Arc<[Post]>,
    seed: SeedDataset,
    revealed: usize,
    batches: usize,
    loading: bool,
}

impl FeedView {
    pub(super) fn initial(seed: SeedDataset, initial_count: usize) -> Self {
        let revealed = initial_count.min(seed.len());
        Self {
            user_posts: Arc::from(Vec::new()),
            seed,
            revealed,
            batches: 0,
            loading: true,
        }
    }

    /// Number of posts in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.user_posts.len() + self.revealed
    }

    /// Whether the view has no posts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Post at display position `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Post> {
        self.user_posts
            .get(index)
            .or_else(|| self.revealed_seed().get(index - self.user_posts.len()))
    }

    /// Posts in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Post> {
        self.user_posts.iter().chain(self.revealed_seed())
    }

    /// Copies the posts in display order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Post> {
        self.iter().cloned().collect()
    }

    /// User-authored posts, newest first.
    #[must_use]
    pub fn user_posts(&self) -> &[Post] {
        &self.user_posts
    }

    /// Number of seed posts revealed so far.
    #[must_use]
    pub const fn seed_revealed(&self) -> usize {
        self.revealed
    }

    /// Total number of seed posts.
    #[must_use]
    pub fn seed_total(&self) -> usize {
        self.seed.len()
    }

    /// Number of reveal batches applied after the initial slice.
    #[must_use]
    pub const fn batches_revealed(&self) -> usize {
        self.batches
    }

    /// Whether the feed is still loading: seed posts remain to be revealed or
    /// the first user post load has not resolved.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    fn revealed_seed(&self) -> &[Post] {
        &self.seed.posts()[..self.revealed]
    }

    pub(super) fn set_user_posts(&mut self, posts: Vec<Post>) {
        self.user_posts = posts.into();
    }

    pub(super) fn reveal_through(&mut self, cursor: usize) {
        self.revealed = cursor.min(self.seed.len());
        self.batches += 1;
    }

    pub(super) fn finish_loading(&mut self) {
        self.loading = false;
    }
}
