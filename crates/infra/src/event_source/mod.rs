mod http;
mod inmemory;

use agenda_notifier_domain::{AgendaEvent, ID};

pub use http::HttpEventSource;
pub use inmemory::InMemoryEventSource;

/// The authoritative list of `AgendaEvent`s that reminders are derived
/// from. Backed by the agenda REST API when one is configured and by an
/// in-memory store otherwise.
#[async_trait::async_trait]
pub trait IEventSource: Send + Sync {
    /// All events of the current user. Drives the full reschedule at
    /// startup and every tick of the reconciliation sweep.
    async fn list_events(&self) -> anyhow::Result<Vec<AgendaEvent>>;

    async fn insert(&self, event: &AgendaEvent) -> anyhow::Result<()>;

    async fn save(&self, event: &AgendaEvent) -> anyhow::Result<()>;

    async fn delete(&self, event_id: &ID) -> anyhow::Result<()>;

    async fn find(&self, event_id: &ID) -> Option<AgendaEvent>;
}
