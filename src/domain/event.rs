//! Event entity: capacity, attendee membership, and scheduling validity.

use std::fmt;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Date format used by every persisted event date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A scheduled campus event with a capacity and a set of attendees.
///
/// The attendee list is semantically a set: order is irrelevant and
/// duplicates are rejected at insertion. `capacity` and `attendees` are
/// kept private so the invariant `attendees.len() <= capacity` can only be
/// challenged through [`Event::add_attendee`] and [`Event::set_capacity`],
/// which both refuse violations. Externally edited stores may still load
/// with the invariant broken; read operations tolerate that and report
/// negative availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier, assigned by the registry (immutable after creation).
    pub id: u32,
    /// Event name (non-empty).
    pub name: String,
    /// Calendar date as an ISO `YYYY-MM-DD` string.
    pub date: String,
    capacity: u32,
    /// Venue, if known.
    pub location: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Username of the organizing account.
    pub organizer: Option<String>,
    #[serde(default)]
    attendees: Vec<String>,
}

impl Event {
    /// Creates an event with no attendees and no optional detail fields.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, date: impl Into<String>, capacity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            date: date.into(),
            capacity,
            location: None,
            description: None,
            organizer: None,
            attendees: Vec::new(),
        }
    }

    /// Maximum number of attendees.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Attendee usernames in insertion order.
    #[must_use]
    pub fn attendees(&self) -> &[String] {
        &self.attendees
    }

    /// Number of registered attendees.
    #[must_use]
    pub fn attendee_count(&self) -> usize {
        self.attendees.len()
    }

    /// Returns `true` iff the event has reached (or exceeded) capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.attendees.len() >= self.capacity as usize
    }

    /// Remaining slots: `capacity - |attendees|`.
    ///
    /// Negative only if an external store edit violated the capacity
    /// invariant; callers must treat negative as zero availability.
    #[must_use]
    pub fn available_slots(&self) -> i64 {
        i64::from(self.capacity) - self.attendees.len() as i64
    }

    /// Adds a username to the attendee set.
    ///
    /// Mutates only the in-memory set; persistence is the registry's
    /// responsibility.
    ///
    /// # Errors
    ///
    /// [`RegistryError::EventFull`] if the event is at capacity,
    /// [`RegistryError::DuplicateRegistration`] if the username is already
    /// present. The failing call leaves the set unchanged.
    pub fn add_attendee(&mut self, username: &str) -> Result<(), RegistryError> {
        if self.is_full() {
            return Err(RegistryError::EventFull(self.id));
        }
        if self.attendees.iter().any(|a| a == username) {
            return Err(RegistryError::DuplicateRegistration {
                event_id: self.id,
                username: username.to_string(),
            });
        }
        self.attendees.push(username.to_string());
        Ok(())
    }

    /// Removes a username from the attendee set.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotRegistered`] if the username is absent.
    pub fn remove_attendee(&mut self, username: &str) -> Result<(), RegistryError> {
        let Some(pos) = self.attendees.iter().position(|a| a == username) else {
            return Err(RegistryError::NotRegistered {
                event_id: self.id,
                username: username.to_string(),
            });
        };
        self.attendees.remove(pos);
        Ok(())
    }

    /// Replaces the capacity.
    ///
    /// # Errors
    ///
    /// [`RegistryError::CapacityConflict`] if the new capacity is below the
    /// current attendee count; capacity is left unchanged.
    pub fn set_capacity(&mut self, requested: u32) -> Result<(), RegistryError> {
        if (requested as usize) < self.attendees.len() {
            return Err(RegistryError::CapacityConflict {
                requested,
                attendees: self.attendees.len(),
            });
        }
        self.capacity = requested;
        Ok(())
    }

    /// Returns `true` if the event date is today or later.
    ///
    /// An unparseable date is never upcoming.
    #[must_use]
    pub fn is_upcoming(&self) -> bool {
        self.is_upcoming_on(Utc::now().date_naive())
    }

    /// [`Event::is_upcoming`] against an explicit "today", for testability.
    #[must_use]
    pub fn is_upcoming_on(&self, today: NaiveDate) -> bool {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).is_ok_and(|date| date >= today)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {} ({}/{})",
            self.name,
            self.date,
            self.attendees.len(),
            self.capacity
        )
    }
}
