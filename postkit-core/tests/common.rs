//! Common test utilities shared across integration tests.
#![allow(missing_docs, reason = "shared test helpers, also built as a standalone test target")]

use std::sync::Arc;

use async_trait::async_trait;
use postkit_core::feed::{Scheduler, SeedDataset};
use postkit_core::storage::{FileStore, MemoryStore};
use postkit_core::{Post, PostStore};
use tokio::sync::Semaphore;

/// Scheduler driven by the test: interactions settle and idle slots open
/// only when granted.
pub struct StepScheduler {
    settled: Semaphore,
    idle: Semaphore,
}

impl StepScheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            settled: Semaphore::new(0),
            idle: Semaphore::new(0),
        })
    }

    pub fn settle(&self) {
        self.settled.add_permits(1);
    }

    pub fn grant_idle(&self, slots: usize) {
        self.idle.add_permits(slots);
    }
}

#[async_trait]
impl Scheduler for StepScheduler {
    async fn interactions_settled(&self) {
        if let Ok(permit) = self.settled.acquire().await {
            permit.forget();
        }
    }

    async fn idle(&self) {
        if let Ok(permit) = self.idle.acquire().await {
            permit.forget();
        }
    }
}

pub fn post(title: &str) -> Post {
    Post {
        title: title.to_string(),
        author: "tester".to_string(),
        description: None,
        image: None,
    }
}

pub fn seed_of(count: usize) -> SeedDataset {
    SeedDataset::new((0..count).map(|i| post(&format!("seed-{i}"))).collect())
}

#[allow(dead_code, reason = "used in tests")]
pub fn memory_post_store() -> Arc<PostStore> {
    Arc::new(PostStore::new(Arc::new(MemoryStore::new())))
}

#[allow(dead_code, reason = "used in tests")]
pub async fn file_post_store(dir: &std::path::Path) -> Arc<PostStore> {
    let store = FileStore::open(dir).await.unwrap();
    Arc::new(PostStore::new(Arc::new(store)))
}
