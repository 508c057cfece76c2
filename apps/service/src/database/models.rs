use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name given to sites added without one
pub const DEFAULT_SITE_NAME: &str = "sitio";

/// A tracked endpoint together with the outcome of its latest probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoredSite {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub active: bool,
    pub status: String,
    /// Seconds; 0 until measured
    pub response_time: f64,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Frozen snapshot of one probe of one site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub site_id: i64,
    pub status: String,
    pub response_time: f64,
    pub checked_at: DateTime<Utc>,
}

/// Convert a stored Unix timestamp back to a UTC datetime
pub fn from_unix(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}
