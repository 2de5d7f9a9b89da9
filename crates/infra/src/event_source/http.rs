use super::IEventSource;
use agenda_notifier_domain::{AgendaEvent, EventReminder, ID};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use tracing::warn;

/// `IEventSource` backed by the agenda REST API
pub struct HttpEventSource {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpEventSource {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn events_url(&self) -> String {
        format!("{}/events", self.base_url)
    }

    fn event_url(&self, event_id: &ID) -> String {
        format!("{}/events/{}", self.base_url, event_id)
    }
}

/// Wire representation of an event as the REST API serves it. The API
/// uses `_id` and stores the reminder offset as a string of minutes in
/// the `notification` field, both of which are mapped leniently.
#[derive(Debug, Deserialize)]
struct EventDTO {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    title: String,
    date: String,
    time: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    notification: Option<String>,
}

impl TryFrom<EventDTO> for AgendaEvent {
    type Error = anyhow::Error;

    fn try_from(dto: EventDTO) -> Result<Self, Self::Error> {
        let id = dto
            .id
            .parse::<ID>()
            .map_err(|e| anyhow::Error::msg(e.to_string()))?;
        // Absent or unparseable reminder offsets mean notify at event time
        let minutes_before = dto
            .notification
            .as_deref()
            .and_then(|minutes| minutes.trim().parse::<i64>().ok())
            .unwrap_or(0);

        Ok(AgendaEvent {
            id,
            title: dto.title,
            date: dto.date,
            time: dto.time,
            description: dto.description,
            reminder: EventReminder { minutes_before },
        })
    }
}

#[derive(Debug, Serialize)]
struct EventAttributesDTO {
    title: String,
    date: String,
    time: String,
    description: Option<String>,
    notification: String,
}

impl From<&AgendaEvent> for EventAttributesDTO {
    fn from(event: &AgendaEvent) -> Self {
        Self {
            title: event.title.clone(),
            date: event.date.clone(),
            time: event.time.clone(),
            description: event.description.clone(),
            notification: event.reminder.minutes_before.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl IEventSource for HttpEventSource {
    async fn list_events(&self) -> anyhow::Result<Vec<AgendaEvent>> {
        let res = self
            .client
            .get(self.events_url())
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?;

        let dtos: Vec<EventDTO> = res.json().await?;
        let events = dtos
            .into_iter()
            .filter_map(|dto| match AgendaEvent::try_from(dto) {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!("Skipping malformed event from the agenda API: {:?}", e);
                    None
                }
            })
            .collect();
        Ok(events)
    }

    async fn insert(&self, event: &AgendaEvent) -> anyhow::Result<()> {
        self.client
            .post(self.events_url())
            .bearer_auth(&self.token)
            .json(&EventAttributesDTO::from(event))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn save(&self, event: &AgendaEvent) -> anyhow::Result<()> {
        self.client
            .put(self.event_url(&event.id))
            .bearer_auth(&self.token)
            .json(&EventAttributesDTO::from(event))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn delete(&self, event_id: &ID) -> anyhow::Result<()> {
        self.client
            .delete(self.event_url(event_id))
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn find(&self, event_id: &ID) -> Option<AgendaEvent> {
        let res = self
            .client
            .get(self.event_url(event_id))
            .bearer_auth(&self.token)
            .send()
            .await
            .ok()?
            .error_for_status()
            .ok()?;

        let dto: EventDTO = res.json().await.ok()?;
        AgendaEvent::try_from(dto).ok()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_maps_api_events_leniently() {
        let dto: EventDTO = serde_json::from_str(
            r#"{
                "_id": "60b3f7f0b9a0d8a9f2f0c3d1",
                "title": "Dentist",
                "date": "2025-03-01",
                "time": "10:00",
                "notification": "15"
            }"#,
        )
        .unwrap();
        let event = AgendaEvent::try_from(dto).unwrap();
        assert_eq!(event.id.as_string(), "60b3f7f0b9a0d8a9f2f0c3d1");
        assert_eq!(event.reminder.minutes_before, 15);
        assert_eq!(event.description, None);
    }

    #[test]
    fn unparseable_reminder_offset_defaults_to_zero() {
        for notification in &[r#""notification": "soon","#, ""] {
            let json = format!(
                r#"{{
                    "_id": "e1",
                    "title": "Dentist",
                    "date": "2025-03-01",
                    "time": "10:00",
                    {}
                    "description": "Yearly checkup"
                }}"#,
                notification
            );
            let dto: EventDTO = serde_json::from_str(&json).unwrap();
            let event = AgendaEvent::try_from(dto).unwrap();
            assert_eq!(event.reminder.minutes_before, 0);
        }
    }

    #[test]
    fn it_rejects_events_without_usable_id() {
        let dto: EventDTO = serde_json::from_str(
            r#"{ "_id": " ", "title": "Dentist", "date": "2025-03-01", "time": "10:00" }"#,
        )
        .unwrap();
        assert!(AgendaEvent::try_from(dto).is_err());
    }
}
