use agenda_notifier_utils::create_random_secret;
use chrono_tz::Tz;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Base url of the agenda REST API, e.g. `http://localhost:3000/api`.
    /// When missing the application falls back to the in-memory event store.
    pub api_url: Option<String>,
    /// Bearer token used to authenticate against the agenda REST API
    pub api_token: Option<String>,
    /// Url that reminder notifications are delivered to. When missing
    /// the notification channel is reported as unsupported and reminders
    /// degrade to log statements.
    pub webhook_url: Option<String>,
    /// Key sent along with every webhook notification so that the
    /// receiver can verify the sender
    pub webhook_key: String,
    /// Timezone used to interpret the wall-clock date and time of events
    pub timezone: Tz,
    /// How often the reconciliation sweep checks for due reminders
    pub sweep_interval_secs: u64,
}

impl Config {
    pub fn new() -> Self {
        let api_url = std::env::var("AGENDA_API_URL").ok();
        let api_token = std::env::var("AGENDA_API_TOKEN").ok();
        let webhook_url = std::env::var("AGENDA_WEBHOOK_URL").ok();

        let webhook_key = match std::env::var("AGENDA_WEBHOOK_KEY") {
            Ok(key) => key,
            Err(_) => {
                info!("Did not find AGENDA_WEBHOOK_KEY environment variable. Going to create one.");
                let key = create_random_secret(16);
                info!("Webhook key was generated and set to: {}", key);
                key
            }
        };

        let default_timezone = chrono_tz::UTC;
        let timezone = match std::env::var("AGENDA_TIMEZONE") {
            Ok(tz) => match tz.parse::<Tz>() {
                Ok(tz) => tz,
                Err(_) => {
                    warn!(
                        "The given AGENDA_TIMEZONE: {} is not valid, falling back to: {}.",
                        tz, default_timezone
                    );
                    default_timezone
                }
            },
            Err(_) => default_timezone,
        };

        let default_sweep_interval = "60";
        let sweep_interval = std::env::var("AGENDA_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| default_sweep_interval.into());
        let sweep_interval_secs = match sweep_interval.parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => {
                warn!(
                    "The given AGENDA_SWEEP_INTERVAL_SECS: {} is not valid, falling back to the default interval: {}.",
                    sweep_interval, default_sweep_interval
                );
                default_sweep_interval.parse::<u64>().unwrap()
            }
        };

        Self {
            api_url,
            api_token,
            webhook_url,
            webhook_key,
            timezone,
            sweep_interval_secs,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
