use anyhow::Result;
use std::time::{Duration, Instant};

use super::types::ProbeOutcome;

/// Performs one bounded-time probe of a target
#[async_trait::async_trait]
pub trait Checker: Send + Sync {
    /// Probe `target`. Transport failures are part of the outcome, never an error.
    async fn probe(&self, target: &str) -> ProbeOutcome;
}

/// HTTP/HTTPS checker
pub struct HttpChecker {
    client: reqwest::Client,
}

impl HttpChecker {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sitewatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Checker for HttpChecker {
    async fn probe(&self, target: &str) -> ProbeOutcome {
        let start = Instant::now();

        match self.client.get(target).send().await {
            Ok(response) => ProbeOutcome::Response {
                status: response.status().as_u16(),
                elapsed: start.elapsed(),
            },
            Err(e) if e.is_timeout() => ProbeOutcome::Timeout,
            Err(e) => ProbeOutcome::Transport(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubReply, spawn_stub_server, unused_local_url};

    #[tokio::test]
    async fn test_probe_reports_status_code() {
        let url = spawn_stub_server(StubReply::Status(503)).await;
        let checker = HttpChecker::new(Duration::from_secs(5)).unwrap();

        match checker.probe(&url).await {
            ProbeOutcome::Response { status, .. } => assert_eq!(status, 503),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_probe_times_out() {
        let url = spawn_stub_server(StubReply::Hang).await;
        let checker = HttpChecker::new(Duration::from_millis(200)).unwrap();

        assert_eq!(checker.probe(&url).await, ProbeOutcome::Timeout);
    }

    #[tokio::test]
    async fn test_probe_connection_refused() {
        let url = unused_local_url().await;
        let checker = HttpChecker::new(Duration::from_secs(2)).unwrap();

        assert!(matches!(checker.probe(&url).await, ProbeOutcome::Transport(_)));
    }

    #[tokio::test]
    async fn test_probe_invalid_url() {
        let checker = HttpChecker::new(Duration::from_secs(1)).unwrap();
        assert!(matches!(checker.probe("not a url").await, ProbeOutcome::Transport(_)));
    }
}
