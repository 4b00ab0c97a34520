use async_trait::async_trait;

/// Host hooks that pace the incremental seed reveal.
///
/// The loader waits for [`Scheduler::interactions_settled`] once, then awaits
/// [`Scheduler::idle`] before every batch. Both futures may be dropped before
/// completion and must not lose state when that happens.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Resolves once pending UI transitions and interactions have finished.
    async fn interactions_settled(&self);

    /// Resolves at the next idle slot of the host's main loop.
    async fn idle(&self);
}

/// Scheduler for hosts without an interaction manager: interactions are
/// settled from the start and an idle slot is one trip through the tokio
/// scheduler.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn interactions_settled(&self) {}

    async fn idle(&self) {
        tokio::task::yield_now().await;
    }
}
