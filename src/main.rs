mod telemetry;

use agenda_notifier_core::{
    start_reminder_sweep_job, NotificationChannel, NotificationScheduler, PermissionState,
    UnsupportedChannel, WebhookChannel,
};
use agenda_notifier_infra::setup_context;
use std::sync::Arc;
use telemetry::{get_subscriber, init_subscriber};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();

    let subscriber = get_subscriber("agenda_notifier".into(), "info".into());
    init_subscriber(subscriber);

    let context = setup_context();

    let channel: Arc<dyn NotificationChannel> = match &context.config.webhook_url {
        Some(url) => Arc::new(WebhookChannel::new(
            url.clone(),
            context.config.webhook_key.clone(),
        )),
        None => Arc::new(UnsupportedChannel),
    };
    let scheduler =
        NotificationScheduler::new(channel, context.sys.clone(), context.config.timezone);

    match scheduler.request_permission().await {
        PermissionState::Granted => info!("Notification channel is ready"),
        state => warn!(
            "Notification permission is {:?}, reminders will not be delivered",
            state
        ),
    }

    let events = context.event_source.list_events().await?;
    let armed = scheduler.reschedule_all(&events);
    info!("{} events checked, {} reminders armed", events.len(), armed);

    start_reminder_sweep_job(scheduler, context);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    Ok(())
}
