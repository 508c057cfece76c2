use std::sync::Arc;

use super::checker::Checker;
use super::classifier::classify;
use super::types::CheckResult;
use crate::database::MonitoredSite;

/// Site checker: probes one site and classifies the outcome. Never touches storage.
pub struct MonitoringExecutor {
    checker: Arc<dyn Checker>,
}

impl MonitoringExecutor {
    pub fn new(checker: Arc<dyn Checker>) -> Self {
        Self { checker }
    }

    pub async fn check(&self, site: &MonitoredSite) -> CheckResult {
        let outcome = self.checker.probe(&site.url).await;
        classify(&outcome)
    }
}
