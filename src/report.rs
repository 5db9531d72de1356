//! Tabular report rows for the event export.
//!
//! The engine supplies one row per event; rendering (CSV or otherwise) is
//! the exporter's concern.

use serde::Serialize;

use crate::domain::Event;

/// Column headers, in row order.
pub const COLUMNS: [&str; 8] = [
    "ID",
    "Name",
    "Date",
    "Capacity",
    "Attendees",
    "Available Slots",
    "Location",
    "Organizer",
];

/// One export row. Optional fields render as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// Event id.
    pub id: u32,
    /// Event name.
    pub name: String,
    /// Event date string.
    pub date: String,
    /// Capacity.
    pub capacity: u32,
    /// Attendee count.
    pub attendees: usize,
    /// Remaining slots (negative after an external capacity violation).
    pub available_slots: i64,
    /// Venue, or empty.
    pub location: String,
    /// Organizer username, or empty.
    pub organizer: String,
}

impl From<&Event> for ReportRow {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            name: event.name.clone(),
            date: event.date.clone(),
            capacity: event.capacity(),
            attendees: event.attendee_count(),
            available_slots: event.available_slots(),
            location: event.location.clone().unwrap_or_default(),
            organizer: event.organizer.clone().unwrap_or_default(),
        }
    }
}

/// Builds one row per event, preserving store order.
#[must_use]
pub fn rows(events: &[Event]) -> Vec<ReportRow> {
    events.iter().map(ReportRow::from).collect()
}
