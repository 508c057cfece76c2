use anyhow::Result;
use std::time::Duration;

/// Decides whether this monitor has outbound network access at all
#[async_trait::async_trait]
pub trait ConnectivityGate: Send + Sync {
    async fn is_network_reachable(&self) -> bool;
}

/// Gate backed by a single GET to a well-known, highly available endpoint.
/// Any HTTP response counts as reachable.
pub struct HttpConnectivityGate {
    client: reqwest::Client,
    target: String,
}

impl HttpConnectivityGate {
    pub fn new(target: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, target: target.into() })
    }
}

#[async_trait::async_trait]
impl ConnectivityGate for HttpConnectivityGate {
    async fn is_network_reachable(&self) -> bool {
        match self.client.get(&self.target).send().await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("Connectivity probe to {} failed: {}", self.target, e);
                false
            }
        }
    }
}
