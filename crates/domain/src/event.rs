use crate::date::datetime_millis;
use crate::shared::entity::ID;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A dated and timed entry in a user's agenda.
///
/// Owned by the persistence layer and read-only to the notification
/// scheduler: the scheduler only derives reminder timestamps from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaEvent {
    pub id: ID,
    pub title: String,
    /// Calendar date on the form `YYYY-MM-DD`
    pub date: String,
    /// Wall-clock time on the form `HH:MM` (24h)
    pub time: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reminder: EventReminder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventReminder {
    /// How many minutes before the event time the notification
    /// should fire. `0` means notify exactly at event time.
    pub minutes_before: i64,
}

impl Default for EventReminder {
    fn default() -> Self {
        Self { minutes_before: 0 }
    }
}

impl EventReminder {
    // This isnt ideal at all, shouldnt be possible to construct
    // this type if it is not valid, but for now it is good enough.
    // Any non-negative offset is allowed, a reminder days ahead of
    // the event is fine.
    pub fn is_valid(&self) -> bool {
        self.minutes_before >= 0
    }
}

#[derive(Error, Debug)]
pub enum InvalidEventError {
    #[error("Event date: {0} is malformed")]
    Date(String),
    #[error("Event time: {0} is malformed")]
    Time(String),
    #[error("Event title cannot be empty")]
    EmptyTitle,
    #[error("Event date and time: {0} does not exist in timezone: {1}")]
    NonExistentLocalTime(String, Tz),
}

impl AgendaEvent {
    pub fn validate(&self) -> Result<(), InvalidEventError> {
        if self.title.trim().is_empty() {
            return Err(InvalidEventError::EmptyTitle);
        }
        crate::date::is_valid_date(&self.date)
            .map_err(|_| InvalidEventError::Date(self.date.clone()))?;
        crate::date::is_valid_time(&self.time)
            .map_err(|_| InvalidEventError::Time(self.time.clone()))?;
        Ok(())
    }

    /// The timestamp in millis at which this event occurs
    pub fn event_timestamp_millis(&self, tz: &Tz) -> Result<i64, InvalidEventError> {
        self.validate()?;
        datetime_millis(&self.date, &self.time, tz).map_err(|_| {
            InvalidEventError::NonExistentLocalTime(format!("{} {}", self.date, self.time), *tz)
        })
    }

    /// The timestamp in millis at which a reminder notification for this
    /// event should fire. Invalid reminder offsets fall back to notifying
    /// at event time.
    pub fn remind_at_millis(&self, tz: &Tz) -> Result<i64, InvalidEventError> {
        let event_ts = self.event_timestamp_millis(tz)?;
        let minutes_before = if self.reminder.is_valid() {
            self.reminder.minutes_before
        } else {
            0
        };
        Ok(event_ts - minutes_before * 60 * 1000)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::prelude::*;
    use chrono_tz::UTC;

    fn event(date: &str, time: &str, minutes_before: i64) -> AgendaEvent {
        AgendaEvent {
            id: Default::default(),
            title: "Dentist".into(),
            date: date.into(),
            time: time.into(),
            description: None,
            reminder: EventReminder { minutes_before },
        }
    }

    #[test]
    fn computes_remind_at_before_event_time() {
        let e = event("2025-03-01", "10:00", 10);
        let expected = UTC.ymd(2025, 3, 1).and_hms(9, 50, 0).timestamp_millis();
        assert_eq!(e.remind_at_millis(&UTC).unwrap(), expected);
    }

    #[test]
    fn zero_offset_reminds_at_event_time() {
        let e = event("2025-03-01", "10:00", 0);
        assert_eq!(
            e.remind_at_millis(&UTC).unwrap(),
            e.event_timestamp_millis(&UTC).unwrap()
        );
    }

    #[test]
    fn invalid_offset_falls_back_to_event_time() {
        let e = event("2025-03-01", "10:00", -5);
        assert_eq!(
            e.remind_at_millis(&UTC).unwrap(),
            e.event_timestamp_millis(&UTC).unwrap()
        );
    }

    #[test]
    fn offset_larger_than_a_day_is_honored() {
        let e = event("2025-03-03", "10:00", 2 * 24 * 60);
        let expected = UTC.ymd(2025, 3, 1).and_hms(10, 0, 0).timestamp_millis();
        assert_eq!(e.remind_at_millis(&UTC).unwrap(), expected);
    }

    #[test]
    fn rejects_malformed_events() {
        assert!(matches!(
            event("2025-13-01", "10:00", 0).validate(),
            Err(InvalidEventError::Date(_))
        ));
        assert!(matches!(
            event("2025-03-01", "25:00", 0).validate(),
            Err(InvalidEventError::Time(_))
        ));

        let mut e = event("2025-03-01", "10:00", 0);
        e.title = "   ".into();
        assert!(matches!(e.validate(), Err(InvalidEventError::EmptyTitle)));
    }

    #[test]
    fn deserializes_with_missing_optional_fields() {
        let e: AgendaEvent = serde_json::from_str(
            r#"{ "id": "e1", "title": "Dentist", "date": "2025-03-01", "time": "10:00" }"#,
        )
        .unwrap();
        assert_eq!(e.description, None);
        assert_eq!(e.reminder.minutes_before, 0);
    }
}
