use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{AlertMessage, NotificationChannel, NotifyError};
use crate::config::TelegramSettings;

/// Sends the alert body through the Telegram Bot API
pub struct TelegramChannel {
    client: Client,
    settings: TelegramSettings,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

impl TelegramChannel {
    pub fn new(settings: TelegramSettings) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self, bot_token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.settings.api_base.trim_end_matches('/'), bot_token)
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn deliver(&self, alert: &AlertMessage) -> Result<(), NotifyError> {
        let (Some(bot_token), Some(chat_id)) = (&self.settings.bot_token, &self.settings.chat_id)
        else {
            return Err(NotifyError::MissingCredentials("TELEGRAM_BOT_TOKEN/TELEGRAM_CHAT_ID"));
        };

        let payload = SendMessage { chat_id, text: &alert.body };
        let response = self.client.post(self.endpoint(bot_token)).json(&payload).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(NotifyError::Rejected(response.status().as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::types::SiteFailure;
    use crate::testing::{StubReply, spawn_recording_server};

    fn settings(api_base: &str) -> TelegramSettings {
        TelegramSettings {
            bot_token: Some("123:abc".into()),
            chat_id: Some("-42".into()),
            api_base: api_base.into(),
        }
    }

    fn alert() -> AlertMessage {
        AlertMessage::from_failures(&[SiteFailure {
            url: "https://down.example".into(),
            reason: "Error 500".into(),
        }])
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let channel = TelegramChannel::new(TelegramSettings::default()).unwrap();
        let err = channel.deliver(&alert()).await.unwrap_err();
        assert!(matches!(err, NotifyError::MissingCredentials(_)));
    }

    #[tokio::test]
    async fn test_posts_chat_id_and_text() {
        let (base, requests) = spawn_recording_server(StubReply::Status(200)).await;
        let channel = TelegramChannel::new(settings(&base)).unwrap();

        channel.deliver(&alert()).await.unwrap();

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert!(request.head.starts_with("POST /bot123:abc/sendMessage "));

        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["chat_id"], "-42");
        assert_eq!(body["text"], alert().body);
    }

    #[tokio::test]
    async fn test_non_success_is_rejected() {
        let (base, _requests) = spawn_recording_server(StubReply::Status(401)).await;
        let channel = TelegramChannel::new(settings(&base)).unwrap();

        let err = channel.deliver(&alert()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Rejected(401)));
    }
}
