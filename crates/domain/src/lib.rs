pub mod date;
mod event;
mod reminder;
mod shared;

pub use event::{AgendaEvent, EventReminder, InvalidEventError};
pub use reminder::Reminder;
pub use shared::entity::{InvalidIDError, ID};
