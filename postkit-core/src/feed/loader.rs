use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{self, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::error::{PostKitError, PostKitResult};
use crate::post::Post;
use crate::post_store::PostStore;

use super::config::FeedConfig;
use super::scheduler::{Scheduler, TokioScheduler};
use super::seed::SeedDataset;
use super::view::FeedView;

/// Builds feed sessions over a post store and a seed dataset.
///
/// ```
/// use std::collections::HashMap;
/// use std::sync::Arc;
///
/// use postkit_core::feed::{FeedLoader, SeedDataset};
/// use postkit_core::storage::MemoryStore;
/// use postkit_core::PostStore;
///
/// tokio_test::block_on(async {
///     let posts = Arc::new(PostStore::new(Arc::new(MemoryStore::new())));
///     let seed = SeedDataset::from_json(r#"{"posts":[{"title":"hi","author":"me"}]}"#).unwrap();
///     let handle = FeedLoader::new(posts, seed).activate().unwrap();
///     let view = handle.wait_until_loaded().await;
///     assert_eq!(view.len(), 1);
/// });
/// ```
#[derive(Clone)]
pub struct FeedLoader {
    posts: Arc<PostStore>,
    seed: SeedDataset,
    config: FeedConfig,
    scheduler: Arc<dyn Scheduler>,
}

impl FeedLoader {
    /// Creates a loader with the default [`FeedConfig`] and [`TokioScheduler`].
    #[must_use]
    pub fn new(posts: Arc<PostStore>, seed: SeedDataset) -> Self {
        Self {
            posts,
            seed,
            config: FeedConfig::default(),
            scheduler: Arc::new(TokioScheduler),
        }
    }

    /// Replaces the reveal configuration.
    #[must_use]
    pub const fn with_config(mut self, config: FeedConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the host scheduler.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Starts a feed session.
    ///
    /// The returned handle exposes the first `initial_count` seed posts right
    /// away. User posts are loaded in the background and the rest of the seed
    /// is revealed batch by batch once interactions have settled.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`PostKitError::InvalidInput`] if the configuration is invalid.
    pub fn activate(&self) -> PostKitResult<FeedHandle> {
        self.config.validate()?;

        let (view, view_rx) = watch::channel(FeedView::initial(
            self.seed.clone(),
            self.config.initial_count,
        ));
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let session = FeedSession {
            posts: Arc::clone(&self.posts),
            batch_size: self.config.batch_size,
            scheduler: Arc::clone(&self.scheduler),
            view,
            commands,
            cancel: cancel.clone(),
            loads: JoinSet::new(),
            load_generations: HashMap::new(),
            next_generation: 0,
            applied_generation: 0,
            resolved_generation: 0,
            refresh_waiters: Vec::new(),
        };
        tokio::spawn(session.run());

        Ok(FeedHandle {
            view: view_rx,
            commands: commands_tx,
            cancel,
        })
    }
}

/// Live feed session. Dropping the handle cancels it.
#[derive(Debug)]
pub struct FeedHandle {
    view: watch::Receiver<FeedView>,
    commands: mpsc::UnboundedSender<FeedCommand>,
    cancel: CancellationToken,
}

impl FeedHandle {
    /// Current view.
    #[must_use]
    pub fn snapshot(&self) -> FeedView {
        self.view.borrow().clone()
    }

    /// Receiver notified on every view change. Keeps the last view after the
    /// session ends.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FeedView> {
        self.view.clone()
    }

    /// Reloads user posts and resolves once a load at least as recent as this
    /// one has finished. A load that fails leaves the previous user posts in
    /// place. Seed reveal progress is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`PostKitError::FeedClosed`] if the session has been cancelled.
    pub async fn refresh(&self) -> PostKitResult<()> {
        let (done, applied) = oneshot::channel();
        self.commands
            .send(FeedCommand::Refresh { done })
            .map_err(|_| PostKitError::FeedClosed)?;
        applied.await.map_err(|_| PostKitError::FeedClosed)
    }

    /// Waits until the whole seed has been revealed and the first user post
    /// load has resolved, or the session has been cancelled, then returns
    /// the view at that point.
    pub async fn wait_until_loaded(&self) -> FeedView {
        let mut view = self.view.clone();
        if let Ok(loaded) = view.wait_for(|v| !v.is_loading()).await {
            return loaded.clone();
        }
        self.snapshot()
    }

    /// Stops the session. No batch is appended after this returns.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the session has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[derive(Debug)]
enum FeedCommand {
    Refresh { done: oneshot::Sender<()> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RevealPhase {
    AwaitingInteractions,
    Revealing,
    Done,
}

/// Owns the view. Every mutation happens on this task so user post loads and
/// seed batches never race.
struct FeedSession {
    posts: Arc<PostStore>,
    batch_size: usize,
    scheduler: Arc<dyn Scheduler>,
    view: watch::Sender<FeedView>,
    commands: mpsc::UnboundedReceiver<FeedCommand>,
    cancel: CancellationToken,
    loads: JoinSet<(u64, Vec<Post>)>,
    load_generations: HashMap<task::Id, u64>,
    next_generation: u64,
    /// Newest load whose posts are in the view.
    applied_generation: u64,
    /// Newest load that has finished, applied or not.
    resolved_generation: u64,
    refresh_waiters: Vec<(u64, oneshot::Sender<()>)>,
}

impl FeedSession {
    async fn run(mut self) {
        self.start_load(None);

        let scheduler = Arc::clone(&self.scheduler);
        let mut settled = Box::pin(async move { scheduler.interactions_settled().await });
        let mut phase = RevealPhase::AwaitingInteractions;

        loop {
            tokio::select! {
                biased;

                () = self.cancel.cancelled() => {
                    log::debug!("feed session cancelled");
                    break;
                }
                Some(joined) = self.loads.join_next_with_id(), if !self.loads.is_empty() => {
                    self.apply_load(joined);
                    self.finish_if_loaded(phase);
                }
                command = self.commands.recv() => match command {
                    Some(FeedCommand::Refresh { done }) => self.start_load(Some(done)),
                    None => break,
                },
                () = &mut settled, if phase == RevealPhase::AwaitingInteractions => {
                    log::debug!("interactions settled, revealing seed posts");
                    phase = RevealPhase::Revealing;
                }
                () = self.scheduler.idle(), if phase == RevealPhase::Revealing => {
                    if self.cancel.is_cancelled() {
                        continue;
                    }
                    if !self.reveal_next_batch() {
                        phase = RevealPhase::Done;
                        self.finish_if_loaded(phase);
                    }
                }
            }
        }

        self.view.send_if_modified(|view| {
            let was_loading = view.is_loading();
            view.finish_loading();
            was_loading
        });
    }

    fn start_load(&mut self, done: Option<oneshot::Sender<()>>) {
        self.next_generation += 1;
        let generation = self.next_generation;
        if let Some(done) = done {
            self.refresh_waiters.push((generation, done));
        }

        let posts = Arc::clone(&self.posts);
        let load = self
            .loads
            .spawn(async move { (generation, posts.get_user_posts().await) });
        self.load_generations.insert(load.id(), generation);
    }

    fn apply_load(&mut self, joined: Result<(task::Id, (u64, Vec<Post>)), JoinError>) {
        match joined {
            Ok((id, (generation, posts))) => {
                self.load_generations.remove(&id);
                if generation > self.applied_generation {
                    self.applied_generation = generation;
                    self.view.send_modify(|view| view.set_user_posts(posts));
                } else {
                    log::debug!("discarding stale user post load {generation}");
                }
                self.resolved_generation = self.resolved_generation.max(generation);
            }
            Err(e) => {
                let generation = self.load_generations.remove(&e.id()).unwrap_or_default();
                log::error!("user post load {generation} failed: {e}");
                self.resolved_generation = self.resolved_generation.max(generation);
            }
        }

        let resolved = self.resolved_generation;
        let (ready, pending) = std::mem::take(&mut self.refresh_waiters)
            .into_iter()
            .partition::<Vec<_>, _>(|(generation, _)| *generation <= resolved);
        self.refresh_waiters = pending;
        for (_, done) in ready {
            // The caller may have stopped waiting.
            let _ = done.send(());
        }
    }

    /// Clears the loading flag once the seed is exhausted and the first user
    /// post load has resolved.
    fn finish_if_loaded(&self, phase: RevealPhase) {
        if phase != RevealPhase::Done || self.resolved_generation == 0 {
            return;
        }
        let finished = self.view.send_if_modified(|view| {
            let was_loading = view.is_loading();
            view.finish_loading();
            was_loading
        });
        if finished {
            log::info!("feed loaded: {} posts", self.view.borrow().len());
        }
    }

    /// Appends the next batch. Returns `false` once the seed is exhausted.
    fn reveal_next_batch(&self) -> bool {
        let (cursor, total) = {
            let view = self.view.borrow();
            (view.seed_revealed(), view.seed_total())
        };
        if cursor >= total {
            return false;
        }
        let next = cursor.saturating_add(self.batch_size).min(total);
        self.view.send_modify(|view| view.reveal_through(next));
        log::trace!("revealed seed posts {cursor}..{next}");
        true
    }
}
