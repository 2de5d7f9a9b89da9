use serde::Serialize;

/// Outcome of asking the host for permission to deliver notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    /// The user declined. Must never be prompted again.
    Denied,
    /// The host has no notification capability at all. Not an error,
    /// delivery degrades to log statements.
    Unsupported,
}

/// A rendered reminder notification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Capability interface for the device that reminder notifications are
/// delivered through. Abstracted away from the scheduler so that its
/// timing logic can be tested with a fake channel.
#[async_trait::async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Ask the host for permission to deliver notifications. May prompt
    /// the user, so the scheduler caches the answer and calls this at
    /// most once.
    async fn request_permission(&self) -> PermissionState;

    /// Render a notification on the device. Channels that have a
    /// clickable surface own the click-to-foreground and dismiss
    /// behavior.
    async fn show(&self, notification: &Notification) -> anyhow::Result<()>;

    /// Audible cue accompanying a notification, best-effort
    async fn play_sound(&self) -> anyhow::Result<()>;
}

/// Channel used when no delivery device is configured
pub struct UnsupportedChannel;

#[async_trait::async_trait]
impl NotificationChannel for UnsupportedChannel {
    async fn request_permission(&self) -> PermissionState {
        PermissionState::Unsupported
    }

    async fn show(&self, _notification: &Notification) -> anyhow::Result<()> {
        Err(anyhow::Error::msg(
            "This host does not support notifications",
        ))
    }

    async fn play_sound(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
