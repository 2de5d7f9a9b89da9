use crate::scheduler::NotificationScheduler;
use agenda_notifier_infra::AgendaContext;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::error;

/// Seconds until the next tick that lands `secs_before_min` seconds
/// before a minute boundary
pub fn get_start_delay(now_ts: usize, secs_before_min: usize) -> usize {
    let secs_to_next_minute = 60 - (now_ts / 1000) % 60;
    if secs_to_next_minute > secs_before_min {
        secs_to_next_minute - secs_before_min
    } else {
        secs_to_next_minute + (60 - secs_before_min)
    }
}

/// Starts the periodic reconciliation sweep: every sweep interval it
/// fetches the authoritative event list and delivers the reminders that
/// are due, catching timers lost to host throttling or suspension. The
/// first tick is aligned to a minute boundary.
pub fn start_reminder_sweep_job(
    scheduler: NotificationScheduler,
    ctx: AgendaContext,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let sweep_interval = Duration::from_secs(ctx.config.sweep_interval_secs);

        let now = ctx.sys.get_timestamp_millis();
        let secs_to_next_run = get_start_delay(now as usize, 0);
        tokio::time::sleep(Duration::from_secs(secs_to_next_run as u64)).await;

        let mut interval = tokio::time::interval(sweep_interval);
        loop {
            interval.tick().await;

            let events = match ctx.event_source.list_events().await {
                Ok(events) => events,
                Err(e) => {
                    error!("Unable to list events for the reminder sweep: {:?}", e);
                    continue;
                }
            };
            scheduler.reconcile_tick(&events, sweep_interval).await;
        }
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn start_delay_works() {
        assert_eq!(get_start_delay(50 * 1000, 5), 5);
        assert_eq!(get_start_delay(50 * 1000, 10), 60);
        assert_eq!(get_start_delay(50 * 1000, 15), 55);
        assert_eq!(get_start_delay(60 * 1000, 60), 60);
        assert_eq!(get_start_delay(60 * 1000, 10), 50);
        assert_eq!(get_start_delay(59 * 1000, 0), 1);
        assert_eq!(get_start_delay(59 * 1000, 1), 60);
    }
}
