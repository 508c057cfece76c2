/// Best-effort alert delivery
///
/// Every channel is attempted independently. A channel without credentials is
/// skipped, a failing channel is logged; neither affects the others.
pub mod email;
pub mod message;
pub mod telegram;

pub use email::EmailChannel;
pub use message::AlertMessage;
pub use telegram::TelegramChannel;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Missing credentials: {0}")]
    MissingCredentials(&'static str),

    #[error("Rejected with HTTP status {0}")]
    Rejected(u16),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build email: {0}")]
    Email(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// One way of getting an alert in front of an operator
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &str;

    async fn deliver(&self, alert: &AlertMessage) -> Result<(), NotifyError>;
}

/// What happened to one channel for one alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered { channel: String },
    Skipped { channel: String, reason: String },
    Failed { channel: String, error: String },
}

impl DeliveryOutcome {
    pub fn channel(&self) -> &str {
        match self {
            DeliveryOutcome::Delivered { channel }
            | DeliveryOutcome::Skipped { channel, .. }
            | DeliveryOutcome::Failed { channel, .. } => channel,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}

/// Fans an alert out to every configured channel
pub struct Notifier {
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl Notifier {
    pub fn new(channels: Vec<Box<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    /// Telegram and email, each skipped at send time if its credentials are absent
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(vec![
            Box::new(TelegramChannel::new(config.telegram.clone())?),
            Box::new(EmailChannel::new(config.email.clone())),
        ]))
    }

    pub async fn notify(&self, alert: &AlertMessage) -> Vec<DeliveryOutcome> {
        let mut outcomes = Vec::with_capacity(self.channels.len());

        for channel in &self.channels {
            let name = channel.name().to_string();
            let outcome = match channel.deliver(alert).await {
                Ok(()) => {
                    info!("Alert sent via {}", name);
                    DeliveryOutcome::Delivered { channel: name }
                }
                Err(NotifyError::MissingCredentials(what)) => {
                    warn!("Skipping {} notification: missing {}", name, what);
                    DeliveryOutcome::Skipped { channel: name, reason: format!("missing {what}") }
                }
                Err(e) => {
                    error!("Failed to send alert via {}: {}", name, e);
                    DeliveryOutcome::Failed { channel: name, error: e.to_string() }
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }
}
