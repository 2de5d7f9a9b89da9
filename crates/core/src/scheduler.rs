use crate::channel::{Notification, NotificationChannel, PermissionState};
use agenda_notifier_domain::{AgendaEvent, Reminder, ID};
use agenda_notifier_infra::ISys;
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Derives reminder times from `AgendaEvent`s, arms one-shot timers for
/// them and delivers notifications through a `NotificationChannel` when
/// they elapse.
///
/// Owns the only mapping from event id to pending reminder: at most one
/// pending reminder exists per event at any instant, and scheduling a
/// second one for the same event replaces the first. Reminders whose
/// fire time has already passed are silently dropped, never delivered
/// late.
#[derive(Clone)]
pub struct NotificationScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    pending: Mutex<HashMap<ID, PendingReminder>>,
    /// Cached permission answer. An async mutex so the lock can be
    /// held across the prompt itself, which is what guarantees the
    /// channel is prompted at most once even under concurrent callers.
    permission: tokio::sync::Mutex<Option<PermissionState>>,
    epochs: AtomicU64,
    channel: Arc<dyn NotificationChannel>,
    sys: Arc<dyn ISys>,
    timezone: Tz,
}

struct PendingReminder {
    reminder: Reminder,
    /// Scheduling epoch of the armed timer. A timer only delivers if
    /// the map still holds its event id at its own epoch, so a timer
    /// that was cancelled or replaced can never deliver.
    epoch: u64,
    handle: JoinHandle<()>,
}

impl NotificationScheduler {
    pub fn new(channel: Arc<dyn NotificationChannel>, sys: Arc<dyn ISys>, timezone: Tz) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                pending: Mutex::new(HashMap::new()),
                permission: tokio::sync::Mutex::new(None),
                epochs: AtomicU64::new(0),
                channel,
                sys,
                timezone,
            }),
        }
    }

    /// Ask the channel for permission to deliver notifications. The
    /// answer is cached so the user is prompted at most once.
    pub async fn request_permission(&self) -> PermissionState {
        self.inner.ensure_permission().await
    }

    /// Arms a reminder timer for the event. Replaces any pending
    /// reminder for the same event id. Returns `false` without arming
    /// anything when the computed fire time has already passed or the
    /// event shape is invalid.
    pub fn schedule_one(&self, event: &AgendaEvent) -> bool {
        let remind_at = match event.remind_at_millis(&self.inner.timezone) {
            Ok(remind_at) => remind_at,
            Err(e) => {
                warn!("Not scheduling reminder for event: {}: {}", event.id, e);
                return false;
            }
        };

        self.cancel_one(&event.id);

        let now = self.inner.sys.get_timestamp_millis();
        if remind_at <= now {
            debug!(
                "Reminder for event: {} was due at {} which has already passed, dropping it",
                event.id, remind_at
            );
            return false;
        }

        let epoch = self.inner.epochs.fetch_add(1, Ordering::Relaxed);
        let delay = Duration::from_millis((remind_at - now) as u64);
        let inner = self.inner.clone();
        let timer_event = event.clone();

        // Holding the lock across the spawn means the timer cannot
        // observe the map before its own entry is inserted
        let mut pending = self.inner.pending.lock().unwrap();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            SchedulerInner::fire(inner, timer_event, epoch).await;
        });
        pending.insert(
            event.id.clone(),
            PendingReminder {
                reminder: Reminder {
                    event_id: event.id.clone(),
                    remind_at,
                },
                epoch,
                handle,
            },
        );
        debug!("Reminder for event: {} armed to fire at {}", event.id, remind_at);
        true
    }

    /// Cancels the pending reminder for the event id. Once this
    /// returns, that reminder can no longer deliver. No-op when there
    /// is nothing pending for the id.
    pub fn cancel_one(&self, event_id: &ID) {
        let removed = self.inner.pending.lock().unwrap().remove(event_id);
        if let Some(pending) = removed {
            pending.handle.abort();
            debug!("Cancelled pending reminder for event: {}", event_id);
        }
    }

    /// Cancels every pending reminder and schedules one for each event
    /// whose event time is strictly in the future. Past events never
    /// notify, even when their reminder offset would still place the
    /// fire time after now. Malformed events are skipped without
    /// aborting the rest of the batch. Returns how many reminders were
    /// armed.
    pub fn reschedule_all(&self, events: &[AgendaEvent]) -> usize {
        self.cancel_all();

        let now = self.inner.sys.get_timestamp_millis();
        let mut armed = 0;
        for event in events {
            match event.event_timestamp_millis(&self.inner.timezone) {
                Ok(event_ts) if event_ts > now => {
                    if self.schedule_one(event) {
                        armed += 1;
                    }
                }
                Ok(_) => {
                    debug!("Skipping reminder for event: {} which is already over", event.id)
                }
                Err(e) => warn!("Skipping reminder for malformed event: {}: {}", event.id, e),
            }
        }
        debug!("{} events checked for reminders, {} armed", events.len(), armed);
        armed
    }

    /// Backstop against timers lost to host throttling or suspension.
    ///
    /// Delivers every event that still has a pending reminder whose
    /// fire time lies within `tolerance` of now, as long as the event
    /// itself is still in the future. Removing the map entry is what
    /// marks a reminder as delivered, so this can never double-deliver
    /// an event the timer path already handled, and vice versa.
    pub async fn reconcile_tick(&self, events: &[AgendaEvent], tolerance: Duration) {
        let now = self.inner.sys.get_timestamp_millis();
        let tolerance_millis = tolerance.as_millis() as i64;

        let mut due = Vec::new();
        {
            let mut pending = self.inner.pending.lock().unwrap();
            for event in events {
                let event_ts = match event.event_timestamp_millis(&self.inner.timezone) {
                    Ok(event_ts) => event_ts,
                    Err(_) => continue,
                };
                if event_ts <= now {
                    continue;
                }
                let due_now = pending
                    .get(&event.id)
                    .map(|p| (now - p.reminder.remind_at).abs() < tolerance_millis)
                    .unwrap_or(false);
                if !due_now {
                    continue;
                }
                if let Some(pending_reminder) = pending.remove(&event.id) {
                    pending_reminder.handle.abort();
                    due.push(event.clone());
                }
            }
        }

        for event in &due {
            debug!("Reconciliation sweep delivering reminder for event: {}", event.id);
            self.inner.deliver(event).await;
        }
    }

    /// The reminders currently armed, in no particular order
    pub fn pending_reminders(&self) -> Vec<Reminder> {
        let pending = self.inner.pending.lock().unwrap();
        pending.values().map(|p| p.reminder.clone()).collect()
    }

    fn cancel_all(&self) {
        let drained: Vec<_> = {
            let mut pending = self.inner.pending.lock().unwrap();
            pending.drain().collect()
        };
        for (_, pending_reminder) in drained {
            pending_reminder.handle.abort();
        }
    }
}

impl SchedulerInner {
    async fn fire(inner: Arc<SchedulerInner>, event: AgendaEvent, epoch: u64) {
        let due = {
            let mut pending = inner.pending.lock().unwrap();
            let armed_here = pending
                .get(&event.id)
                .map(|p| p.epoch == epoch)
                .unwrap_or(false);
            if armed_here {
                pending.remove(&event.id);
            }
            armed_here
        };
        if due {
            inner.deliver(&event).await;
        }
    }

    async fn deliver(&self, event: &AgendaEvent) {
        match self.ensure_permission().await {
            PermissionState::Granted => {}
            state => {
                debug!(
                    "Dropping reminder for event: {} because notification permission is {:?}",
                    event.id, state
                );
                return;
            }
        }

        let notification = Notification {
            title: format!("Reminder: {}", event.title),
            body: event
                .description
                .clone()
                .unwrap_or_else(|| "No description".to_string()),
        };
        if let Err(e) = self.channel.show(&notification).await {
            error!("Unable to deliver reminder for event: {}: {:?}", event.id, e);
        }
        if let Err(e) = self.channel.play_sound().await {
            debug!("Unable to play notification sound: {:?}", e);
        }
    }

    async fn ensure_permission(&self) -> PermissionState {
        let mut permission = self.permission.lock().await;
        if let Some(state) = *permission {
            return state;
        }
        let state = self.channel.request_permission().await;
        *permission = Some(state);
        state
    }
}
