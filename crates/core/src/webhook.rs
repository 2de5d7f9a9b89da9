use crate::channel::{Notification, NotificationChannel, PermissionState};
use reqwest::Client;

/// Delivers reminder notifications by POSTing them to a configured url.
/// The receiver verifies the sender through the key header.
pub struct WebhookChannel {
    client: Client,
    url: String,
    key: String,
}

impl WebhookChannel {
    pub fn new(url: String, key: String) -> Self {
        Self {
            client: Client::new(),
            url,
            key,
        }
    }
}

#[async_trait::async_trait]
impl NotificationChannel for WebhookChannel {
    async fn request_permission(&self) -> PermissionState {
        // A configured webhook needs no user consent
        PermissionState::Granted
    }

    async fn show(&self, notification: &Notification) -> anyhow::Result<()> {
        self.client
            .post(self.url.as_str())
            .header("agenda-notifier-webhook-key", self.key.as_str())
            .json(notification)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn play_sound(&self) -> anyhow::Result<()> {
        // The receiving end decides whether to play a cue
        Ok(())
    }
}
