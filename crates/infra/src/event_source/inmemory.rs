use super::IEventSource;
use agenda_notifier_domain::{AgendaEvent, ID};

/// Local fallback store used when no REST API is configured
pub struct InMemoryEventSource {
    events: std::sync::Mutex<Vec<AgendaEvent>>,
}

impl InMemoryEventSource {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryEventSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IEventSource for InMemoryEventSource {
    async fn list_events(&self) -> anyhow::Result<Vec<AgendaEvent>> {
        let events = self.events.lock().unwrap();
        Ok(events.clone())
    }

    async fn insert(&self, event: &AgendaEvent) -> anyhow::Result<()> {
        let mut events = self.events.lock().unwrap();
        events.push(event.clone());
        Ok(())
    }

    async fn save(&self, event: &AgendaEvent) -> anyhow::Result<()> {
        let mut events = self.events.lock().unwrap();
        if let Some(existing) = events.iter_mut().find(|e| e.id == event.id) {
            *existing = event.clone();
        }
        Ok(())
    }

    async fn delete(&self, event_id: &ID) -> anyhow::Result<()> {
        let mut events = self.events.lock().unwrap();
        events.retain(|e| e.id != *event_id);
        Ok(())
    }

    async fn find(&self, event_id: &ID) -> Option<AgendaEvent> {
        let events = self.events.lock().unwrap();
        events.iter().find(|e| e.id == *event_id).cloned()
    }
}
