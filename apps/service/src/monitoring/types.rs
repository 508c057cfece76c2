use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Raw outcome of one HTTP probe, before classification
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// A response arrived; `elapsed` runs from request start to headers received
    Response { status: u16, elapsed: Duration },
    /// The probe's deadline passed before any response
    Timeout,
    /// Refused, DNS failure, reset and every other transport error
    Transport(String),
}

/// Status taxonomy assigned to each probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteStatus {
    Ok(u16),
    HttpError(u16),
    ConnectionError,
}

impl SiteStatus {
    pub fn is_failure(&self) -> bool {
        !matches!(self, SiteStatus::Ok(_))
    }
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteStatus::Ok(code) => write!(f, "{code} OK"),
            SiteStatus::HttpError(code) => write!(f, "Error {code}"),
            SiteStatus::ConnectionError => write!(f, "Error Conexión"),
        }
    }
}

/// Classified result of checking one site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: SiteStatus,

    /// Response time in seconds, 0 when no response arrived
    pub elapsed_seconds: f64,

    /// Transport error text, kept for logs only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CheckResult {
    pub fn status_label(&self) -> String {
        self.status.to_string()
    }

    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }
}

/// One entry of a tick's aggregated alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteFailure {
    pub url: String,
    pub reason: String,
}
