use crate::shared::entity::ID;

/// A `Reminder` represents a specific time before the occurrence of an
/// `AgendaEvent` at which the user should be notified.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    /// The `AgendaEvent` this `Reminder` is associated with
    pub event_id: ID,
    /// The timestamp in millis at which the notification should fire.
    /// This is usually some minutes before the `AgendaEvent`
    pub remind_at: i64,
}
