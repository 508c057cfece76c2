//! Automatic retention of probe history.
//!
//! History rows older than the configured window (30 days by default) are
//! deleted; site rows are never touched. Cleanup runs once at start-up and then
//! periodically as a background task.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::database::SiteStore;

/// Retention policy for probe history
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    /// Days to keep history rows
    pub history_days: i64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self { history_days: 30 }
    }
}

impl RetentionPolicy {
    fn retention(&self) -> Option<Duration> {
        Duration::try_days(self.history_days)
    }
}

/// Cleanup manager for expired history
pub struct RetentionCleanup {
    store: Arc<dyn SiteStore>,
    policy: RetentionPolicy,
}

impl RetentionCleanup {
    pub fn new(store: Arc<dyn SiteStore>, policy: RetentionPolicy) -> Self {
        Self { store, policy }
    }

    /// Delete expired history once, returning the number of rows removed
    pub async fn cleanup_expired_history(&self) -> Result<u64> {
        let cutoff = self
            .policy
            .retention()
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .with_context(|| {
                format!("History retention of {} days is out of range", self.policy.history_days)
            })?;
        debug!(
            "Cleaning up history older than {} days (cutoff: {})",
            self.policy.history_days, cutoff
        );

        let deleted = self.store.purge_history_before(cutoff).await?;
        if deleted > 0 {
            info!("Retention cleanup deleted {} history rows", deleted);
        }
        Ok(deleted)
    }

    /// Start background cleanup (first pass immediately), stopping when `shutdown` turns true
    pub fn start_periodic_cleanup(
        self: Arc<Self>,
        every: std::time::Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let Err(e) = self.cleanup_expired_history().await {
                            warn!("Periodic history cleanup failed: {}", e);
                        }
                    }
                    _ = async { let _ = shutdown.wait_for(|stop| *stop).await; } => break,
                }
            }
        })
    }
}
