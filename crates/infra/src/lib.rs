mod config;
mod event_source;
mod system;

pub use config::Config;
pub use event_source::{HttpEventSource, IEventSource, InMemoryEventSource};
use std::sync::Arc;
pub use system::ISys;
use system::RealSys;

#[derive(Clone)]
pub struct AgendaContext {
    pub event_source: Arc<dyn IEventSource>,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
}

impl AgendaContext {
    fn create(config: Config) -> Self {
        let event_source: Arc<dyn IEventSource> = match (&config.api_url, &config.api_token) {
            (Some(url), Some(token)) => {
                Arc::new(HttpEventSource::new(url.clone(), token.clone()))
            }
            _ => {
                tracing::info!(
                    "No agenda API configured, falling back to the in-memory event store"
                );
                Arc::new(InMemoryEventSource::new())
            }
        };
        Self {
            event_source,
            config,
            sys: Arc::new(RealSys),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub fn setup_context() -> AgendaContext {
    AgendaContext::create(Config::new())
}
