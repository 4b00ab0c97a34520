//! `PostKit` for app hosts.
//!
//! Re-exports [`postkit_core`] and adds [`PostKit`], which wires the services
//! over an app data directory:
//!
//! * credentials live in `<data_dir>/secure`, sealed with the device keystore
//! * user posts live in `<data_dir>/posts`

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use postkit_core::*;

use postkit_core::auth::AuthService;
use postkit_core::feed::{FeedConfig, FeedLoader, SeedDataset};
use postkit_core::storage::{DeviceKeystore, FileStore, SealedStore};

const SECURE_DIR: &str = "secure";
const POSTS_DIR: &str = "posts";

/// Application services sharing one data directory.
#[derive(Debug)]
pub struct PostKit {
    data_dir: PathBuf,
    auth: AuthService,
    posts: Arc<PostStore>,
    seed: SeedDataset,
    feed_config: FeedConfig,
}

impl PostKit {
    /// Opens (or creates) the stores under `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store directories cannot be created.
    pub async fn open<P: AsRef<Path>>(
        data_dir: P,
        keystore: Arc<dyn DeviceKeystore>,
    ) -> PostKitResult<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let secure = FileStore::open(data_dir.join(SECURE_DIR)).await?;
        let posts = FileStore::open(data_dir.join(POSTS_DIR)).await?;
        log::debug!("opened PostKit stores in {}", data_dir.display());

        Ok(Self {
            data_dir,
            auth: AuthService::new(Arc::new(SealedStore::new(secure, keystore))),
            posts: Arc::new(PostStore::new(Arc::new(posts))),
            seed: SeedDataset::default(),
            feed_config: FeedConfig::default(),
        })
    }

    /// Uses `seed` as the bundled dataset for feeds.
    #[must_use]
    pub fn with_seed(mut self, seed: SeedDataset) -> Self {
        self.seed = seed;
        self
    }

    /// Uses `config` for feeds.
    #[must_use]
    pub const fn with_feed_config(mut self, config: FeedConfig) -> Self {
        self.feed_config = config;
        self
    }

    /// Directory holding all app data.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Authentication service backed by sealed storage.
    #[must_use]
    pub const fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Store for user-authored posts.
    #[must_use]
    pub const fn posts(&self) -> &Arc<PostStore> {
        &self.posts
    }

    /// Feed loader over the user posts and the bundled seed.
    #[must_use]
    pub fn feed(&self) -> FeedLoader {
        FeedLoader::new(Arc::clone(&self.posts), self.seed.clone()).with_config(self.feed_config)
    }
}
