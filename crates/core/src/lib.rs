mod channel;
mod scheduler;
mod sweep;
mod webhook;

pub use channel::{Notification, NotificationChannel, PermissionState, UnsupportedChannel};
pub use scheduler::NotificationScheduler;
pub use sweep::{get_start_delay, start_reminder_sweep_job};
pub use webhook::WebhookChannel;
