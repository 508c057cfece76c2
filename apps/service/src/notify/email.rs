use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{AlertMessage, NotificationChannel, NotifyError};
use crate::config::EmailSettings;

/// Port that speaks TLS from the first byte; every other port upgrades with STARTTLS
const IMPLICIT_TLS_PORT: u16 = 465;
const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Mails the alert through an authenticated SMTP relay
pub struct EmailChannel {
    settings: EmailSettings,
}

impl EmailChannel {
    pub fn new(settings: EmailSettings) -> Self {
        Self { settings }
    }

    fn build_message(
        &self,
        from: &str,
        to: &str,
        alert: &AlertMessage,
    ) -> Result<Message, NotifyError> {
        Ok(Message::builder()
            .from(from.parse()?)
            .to(to.parse()?)
            .subject(&alert.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(alert.body.clone())?)
    }

    fn transport(
        &self,
        address: &str,
        password: &str,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotifyError> {
        let host = &self.settings.smtp_host;
        let builder = if self.settings.smtp_port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
        };

        Ok(builder
            .credentials(Credentials::new(address.to_string(), password.to_string()))
            .port(self.settings.smtp_port)
            .timeout(Some(SMTP_TIMEOUT))
            .build())
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn name(&self) -> &str {
        "email"
    }

    async fn deliver(&self, alert: &AlertMessage) -> Result<(), NotifyError> {
        let (Some(address), Some(password), Some(recipient)) =
            (&self.settings.address, &self.settings.password, &self.settings.recipient)
        else {
            return Err(NotifyError::MissingCredentials(
                "EMAIL_ADDRESS/EMAIL_PASSWORD/RECIPIENT_EMAIL",
            ));
        };

        let email = self.build_message(address, recipient, alert)?;

        self.transport(address, password)?.send(email).await?;
        Ok(())
    }
}
