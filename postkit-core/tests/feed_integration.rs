//! Feed loader behavior over real post stores and a test-driven scheduler.

mod common;

use std::time::Duration;

use common::{file_post_store, memory_post_store, post, seed_of, StepScheduler};
use postkit_core::feed::{FeedConfig, FeedLoader};
use postkit_core::{PostDraft, PostKitError};

#[tokio::test]
async fn test_thousand_seed_posts_reveal_in_five_batches() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_post_store(dir.path()).await;
    store.save_user_post(post("first")).await.unwrap();
    store.save_user_post(post("second")).await.unwrap();

    let scheduler = StepScheduler::new();
    let handle = FeedLoader::new(store, seed_of(1000))
        .with_scheduler(scheduler.clone())
        .activate()
        .unwrap();

    let initial = handle.snapshot();
    assert!(initial.len() >= 60);
    assert_eq!(initial.seed_revealed(), 60);
    assert!(initial.is_loading());

    scheduler.settle();
    scheduler.grant_idle(6);
    let view = handle.wait_until_loaded().await;
    assert_eq!(view.seed_revealed(), 1000);
    assert_eq!(view.batches_revealed(), 5);
    assert!(!view.is_loading());
    assert_eq!(view.len(), 1002);
    let head: Vec<_> = view.iter().take(3).map(|p| p.title.clone()).collect();
    assert_eq!(head, ["second", "first", "seed-0"]);
    assert_eq!(view.get(1001).unwrap().title, "seed-999");
}

#[tokio::test]
async fn test_no_batches_before_interactions_settle() {
    let scheduler = StepScheduler::new();
    let handle = FeedLoader::new(memory_post_store(), seed_of(500))
        .with_scheduler(scheduler.clone())
        .activate()
        .unwrap();

    scheduler.grant_idle(10);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(handle.snapshot().batches_revealed(), 0);
    assert!(handle.snapshot().is_loading());

    scheduler.settle();
    let view = handle.wait_until_loaded().await;
    assert_eq!(view.seed_revealed(), 500);
    assert_eq!(view.batches_revealed(), 3);
}

#[tokio::test]
async fn test_dropping_handle_stops_reveal() {
    let scheduler = StepScheduler::new();
    let handle = FeedLoader::new(memory_post_store(), seed_of(1000))
        .with_scheduler(scheduler.clone())
        .activate()
        .unwrap();
    let mut rx = handle.subscribe();

    scheduler.settle();
    scheduler.grant_idle(2);
    rx.wait_for(|v| v.batches_revealed() == 2).await.unwrap();

    drop(handle);
    scheduler.grant_idle(10);
    // The session publishes its final view before it goes away.
    let _ = rx.wait_for(|v| !v.is_loading()).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    let view = rx.borrow().clone();
    assert!(!view.is_loading());
    assert_eq!(view.batches_revealed(), 2);
    assert_eq!(view.seed_revealed(), 460);
}

#[tokio::test]
async fn test_custom_config() {
    let handle = FeedLoader::new(memory_post_store(), seed_of(100))
        .with_config(FeedConfig {
            initial_count: 10,
            batch_size: 25,
        })
        .activate()
        .unwrap();
    assert_eq!(handle.snapshot().len(), 10);

    let view = handle.wait_until_loaded().await;
    assert_eq!(view.seed_revealed(), 100);
    assert_eq!(view.batches_revealed(), 4);
}

#[tokio::test]
async fn test_published_posts_appear_after_refresh() {
    let store = memory_post_store();
    let handle = FeedLoader::new(store.clone(), seed_of(5))
        .activate()
        .unwrap();
    handle.wait_until_loaded().await;

    let draft = PostDraft {
        title: "  Sunset  ".to_string(),
        author: "ana".to_string(),
        description: "   ".to_string(),
        image: None,
    };
    store.publish(&draft).await.unwrap();
    handle.refresh().await.unwrap();

    let first = handle.snapshot().get(0).cloned().unwrap();
    assert_eq!(first.title, "Sunset");
    assert_eq!(first.description, None);

    handle.cancel();
    handle.wait_until_loaded().await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(matches!(
        handle.refresh().await,
        Err(PostKitError::FeedClosed)
    ));
}
