use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::lifecycle::UploadLifecycle;

/// Background task that rejects expired PENDING uploads and purges old terminal records
#[derive(Clone)]
pub struct ExpirySweeper {
    lifecycle: Arc<UploadLifecycle>,
    period: Duration,
}

impl ExpirySweeper {
    pub fn new(lifecycle: Arc<UploadLifecycle>, period: Duration) -> Self {
        Self { lifecycle, period }
    }

    /// Start the sweep loop. Returns a JoinHandle for graceful shutdown.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_interval = interval(self.period);

            loop {
                sweep_interval.tick().await;
                self.run_once().await;
            }
        })
    }

    /// One sweep pass. Errors are logged, never propagated, so the loop keeps running.
    #[tracing::instrument(skip(self), fields(sweep.operation = "expire_and_purge"))]
    pub async fn run_once(&self) -> (u64, u64) {
        let now = self.lifecycle.now();

        let expired = match self.lifecycle.expire_stale_pending(now).await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(error = %e, "Failed to expire stale pending uploads");
                0
            }
        };

        let purged = match self.lifecycle.purge_retained(now).await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(error = %e, "Failed to purge retained upload records");
                0
            }
        };

        tracing::debug!(expired, purged, "Expiry sweep completed");
        (expired, purged)
    }
}
