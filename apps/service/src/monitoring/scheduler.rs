use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::connectivity::ConnectivityGate;
use super::executor::MonitoringExecutor;
use super::types::SiteFailure;
use crate::database::SiteStore;
use crate::notify::{AlertMessage, DeliveryOutcome, Notifier};

/// What one tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickReport {
    /// The monitor itself had no network; nothing was probed or written
    Offline,
    /// The active site list could not be loaded
    Aborted { reason: String },
    Completed(TickSummary),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    /// Sites probed this tick
    pub checked: usize,
    /// Sites whose state/history write failed
    pub store_errors: usize,
    /// Failures in the order they were observed
    pub failures: Vec<SiteFailure>,
    /// Empty when no alert was sent
    pub deliveries: Vec<DeliveryOutcome>,
}

/// Cycle scheduler: drives one tick per interval over every active site
pub struct MonitoringScheduler {
    store: Arc<dyn SiteStore>,
    gate: Arc<dyn ConnectivityGate>,
    executor: Arc<MonitoringExecutor>,
    notifier: Arc<Notifier>,
    interval: Duration,
}

impl MonitoringScheduler {
    pub fn new(
        store: Arc<dyn SiteStore>,
        gate: Arc<dyn ConnectivityGate>,
        executor: Arc<MonitoringExecutor>,
        notifier: Arc<Notifier>,
        interval: Duration,
    ) -> Self {
        Self { store, gate, executor, notifier, interval }
    }

    /// Run a single tick. Never fails: every error is handled at site granularity.
    pub async fn run_tick(&self) -> TickReport {
        info!("Starting check cycle at {}", Utc::now().format("%Y-%m-%d %H:%M:%S"));

        if !self.gate.is_network_reachable().await {
            warn!("No outbound connectivity, skipping this cycle");
            return TickReport::Offline;
        }

        let sites = match self.store.active_sites().await {
            Ok(sites) => sites,
            Err(e) => {
                error!("Failed to load active sites: {}", e);
                return TickReport::Aborted { reason: e.to_string() };
            }
        };

        if sites.is_empty() {
            info!("No active sites to check");
        }

        let mut summary = TickSummary::default();

        for site in &sites {
            let result = self.executor.check(site).await;
            let label = result.status_label();
            summary.checked += 1;

            if result.is_failure() {
                match &result.detail {
                    Some(detail) => warn!("{} -> {} ({})", site.url, label, detail),
                    None => warn!("{} -> {}", site.url, label),
                }
            } else {
                info!("{} -> {} in {:.3}s", site.url, label, result.elapsed_seconds);
            }

            if let Err(e) = self.store.record_check(site.id, &result, Utc::now()).await {
                error!("Failed to store result for {} (site {}): {}", site.url, site.id, e);
                summary.store_errors += 1;
            }

            if result.is_failure() {
                summary.failures.push(SiteFailure { url: site.url.clone(), reason: label });
            }
        }

        if let Some(alert) = AlertMessage::from_failures(&summary.failures) {
            info!("{} site(s) failing, sending alert", summary.failures.len());
            summary.deliveries = self.notifier.notify(&alert).await;
            if !summary.deliveries.iter().any(DeliveryOutcome::is_delivered) {
                warn!("Alert was not delivered through any channel");
            }
        }

        TickReport::Completed(summary)
    }

    /// Tick, then wait one interval, until `shutdown` turns true or its sender is dropped.
    /// A tick in flight is abandoned when shutdown arrives.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!("Monitor started, checking every {}s", self.interval.as_secs());

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                report = self.run_tick() => log_report(&report),
                _ = wait_for_shutdown(&mut shutdown) => break,
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = wait_for_shutdown(&mut shutdown) => break,
            }
        }

        info!("Monitor stopped");
    }
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    // A dropped sender counts as shutdown too
    let _ = shutdown.wait_for(|stop| *stop).await;
}

fn log_report(report: &TickReport) {
    match report {
        TickReport::Offline => {}
        TickReport::Aborted { reason } => warn!("Cycle aborted: {}", reason),
        TickReport::Completed(summary) => info!(
            "Cycle finished: {} checked, {} failing, {} storage errors",
            summary.checked,
            summary.failures.len(),
            summary.store_errors
        ),
    }
}
