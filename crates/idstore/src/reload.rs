//! Periodic background reload

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::cache::IdentityCache;

/// Reloads an [`IdentityCache`] from its remembered source on a fixed
/// interval until cancelled.
///
/// The first reload happens one interval after spawning. A failed reload is
/// logged and the previous snapshot stays active.
pub struct ReloadTask {
    cache: Arc<IdentityCache>,
    interval: Duration,
}

impl std::fmt::Debug for ReloadTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadTask")
            .field("cache", &self.cache)
            .field("interval", &self.interval)
            .finish()
    }
}

impl ReloadTask {
    #[must_use]
    pub const fn new(cache: Arc<IdentityCache>, interval: Duration) -> Self {
        Self { cache, interval }
    }

    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let cache = Arc::clone(&self.cache);
                        match tokio::task::spawn_blocking(move || cache.reload()).await {
                            Ok(Ok(report)) => {
                                tracing::debug!(generation = report.generation, "Background reload complete");
                            }
                            Ok(Err(e)) => {
                                tracing::warn!(error = %e, "Background reload failed");
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "Background reload task panicked");
                            }
                        }
                    }
                    () = shutdown.cancelled() => {
                        tracing::debug!("Reload task shutting down");
                        break;
                    }
                }
            }
        })
    }
}
