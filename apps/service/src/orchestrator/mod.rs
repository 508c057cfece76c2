/// Orchestrator module - wires the components together
///
/// The orchestrator owns the configuration and the database handle, builds the
/// monitoring scheduler from them and runs it alongside the retention job until
/// shutdown is requested.
pub mod retention;

pub use retention::{RetentionCleanup, RetentionPolicy};

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::Config;
use crate::database::{LibsqlStore, SiteStore, initialize_database};
use crate::monitoring::{HttpChecker, HttpConnectivityGate, MonitoringExecutor, MonitoringScheduler};
use crate::notify::Notifier;
use crate::pool::open_pool;

pub struct Orchestrator {
    config: Arc<Config>,
    store: Arc<dyn SiteStore>,
}

impl Orchestrator {
    /// Open the database and bring its schema up to date
    pub async fn new(config: Config) -> Result<Self> {
        let pool = open_pool(&config.database.path)
            .await
            .with_context(|| format!("Failed to open database at {}", config.database.path))?;
        {
            let conn = pool.get().await.context("Failed to get a database connection")?;
            initialize_database(&conn).await.context("Failed to run database migrations")?;
        }

        Ok(Self { config: Arc::new(config), store: Arc::new(LibsqlStore::new(pool)) })
    }

    pub fn store(&self) -> Arc<dyn SiteStore> {
        self.store.clone()
    }

    pub fn retention(&self) -> RetentionCleanup {
        RetentionCleanup::new(
            self.store.clone(),
            RetentionPolicy { history_days: self.config.retention.history_days },
        )
    }

    /// Build the production scheduler: HTTP gate, HTTP checker, configured channels
    pub fn scheduler(&self) -> Result<MonitoringScheduler> {
        let monitor = &self.config.monitor;

        let gate = HttpConnectivityGate::new(
            monitor.network_check_url.clone(),
            monitor.network_check_timeout(),
        )?;
        let checker = HttpChecker::new(monitor.site_timeout())?;
        let notifier = Notifier::from_config(&self.config)?;

        Ok(MonitoringScheduler::new(
            self.store.clone(),
            Arc::new(gate),
            Arc::new(MonitoringExecutor::new(Arc::new(checker))),
            Arc::new(notifier),
            monitor.interval(),
        ))
    }

    /// Run the monitor loop and the retention job until `shutdown` turns true
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let scheduler = self.scheduler()?;

        let cleanup = Arc::new(self.retention());
        let every = std::time::Duration::from_secs(self.config.retention.interval_secs);
        let cleanup_handle = cleanup.start_periodic_cleanup(every, shutdown.clone());

        scheduler.run(shutdown).await;

        if let Err(e) = cleanup_handle.await {
            warn!("Retention task ended abnormally: {}", e);
        }
        info!("Orchestrator shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &tempfile::TempDir) -> Config {
        let mut config = Config::default();
        config.database.path = dir.path().join("orchestrator.db").to_string_lossy().to_string();
        config
    }

    #[tokio::test]
    async fn test_new_migrates_database() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let orchestrator = Orchestrator::new(config_in(&dir)).await?;

        let store = orchestrator.store();
        assert!(store.list_sites().await?.is_empty());
        store.add_site(None, "https://example.com").await?;

        // Reopening keeps the data and does not re-run migrations destructively
        drop(orchestrator);
        let reopened = Orchestrator::new(config_in(&dir)).await?;
        assert_eq!(reopened.store().list_sites().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_run_returns_after_shutdown() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let orchestrator = Orchestrator::new(config_in(&dir)).await?;

        let (tx, rx) = watch::channel(true);
        tokio::time::timeout(std::time::Duration::from_secs(5), orchestrator.run(rx)).await??;
        drop(tx);
        Ok(())
    }
}
