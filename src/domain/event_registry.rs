//! Authoritative collection of events: CRUD, search, and statistics.
//!
//! [`EventRegistry`] owns the working copy of the event store. It is the
//! source of truth for capacity and attendee membership; the account
//! registry only mirrors references. Every successful mutation rewrites the
//! backing store; a store write failure rolls the in-memory change back so
//! a failing operation leaves prior state intact.

use serde::Serialize;

use super::event::{DATE_FORMAT, Event};
use crate::error::RegistryError;
use crate::persistence::JsonStore;

/// Optional detail fields supplied at event creation.
#[derive(Debug, Clone, Default)]
pub struct EventDetails {
    /// Venue.
    pub location: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Username of the organizing account.
    pub organizer: Option<String>,
}

/// Field-wise event update. `None` means "leave unchanged".
#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    /// New name (must be non-empty when provided).
    pub name: Option<String>,
    /// New date (must be `YYYY-MM-DD` when provided).
    pub date: Option<String>,
    /// New capacity (must cover current attendance when provided).
    pub capacity: Option<u32>,
    /// New venue.
    pub location: Option<String>,
    /// New description.
    pub description: Option<String>,
}

/// One event referenced from the statistics result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceEntry {
    /// Event id.
    pub event_id: u32,
    /// Event name.
    pub name: String,
    /// Attendee count at the time the statistics were computed.
    pub attendees: usize,
}

impl From<&Event> for AttendanceEntry {
    fn from(event: &Event) -> Self {
        Self {
            event_id: event.id,
            name: event.name.clone(),
            attendees: event.attendee_count(),
        }
    }
}

/// Aggregate statistics over the whole registry.
///
/// An empty registry yields the all-zero/empty default.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventStatistics {
    /// Number of events.
    pub total_events: usize,
    /// Sum of attendee counts across all events.
    pub total_attendees: usize,
    /// `total_attendees / total_events`; `0.0` for an empty registry.
    pub average_attendance: f64,
    /// Event with the most attendees (first occurrence on ties). Present
    /// whenever the registry is non-empty, even at zero attendance.
    pub highest_attendance: Option<AttendanceEntry>,
    /// Event with the fewest attendees among events that have at least one
    /// attendee. Absent when no event has any attendee.
    pub lowest_attendance: Option<AttendanceEntry>,
    /// Number of events at capacity.
    pub full_events: usize,
}

/// Central store for all events.
///
/// Single-threaded by design: callers embedding the registry in a
/// concurrent host must wrap each read-modify-write cycle in their own
/// mutual exclusion.
#[derive(Debug)]
pub struct EventRegistry {
    store: JsonStore<Event>,
    events: Vec<Event>,
}

impl EventRegistry {
    /// Opens a registry over the given store, loading the working copy.
    ///
    /// A missing store file starts the registry empty; a malformed one is
    /// reported and likewise degrades to empty rather than failing.
    #[must_use]
    pub fn open(store: JsonStore<Event>) -> Self {
        let mut registry = Self {
            store,
            events: Vec::new(),
        };
        registry.refresh();
        registry
    }

    /// Replaces the working copy with the current store contents.
    ///
    /// Refreshing is explicit; reads never reload behind the caller's back.
    pub fn refresh(&mut self) {
        match self.store.load_all() {
            Ok(events) => self.events = events,
            Err(e) => {
                tracing::error!(error = %e, "event store load failed; starting empty");
                self.events = Vec::new();
            }
        }
    }

    fn persist(&self) -> Result<(), RegistryError> {
        self.store.save_all(&self.events)
    }

    /// All events in store order.
    #[must_use]
    pub fn all(&self) -> &[Event] {
        &self.events
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if the registry contains no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Looks up an event by id.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Creates a new event from raw input.
    ///
    /// Validation order: name and date must be non-empty, then `capacity`
    /// must parse to a positive integer, then `date` must be `YYYY-MM-DD`.
    /// The first failing check wins and no partial event is created. On
    /// success the event receives the next id (max existing + 1, or 1),
    /// the store is rewritten, and the new event is returned.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Validation`] on bad input, [`RegistryError::Store`]
    /// on write failure (the event is not retained).
    pub fn create(
        &mut self,
        name: &str,
        date: &str,
        capacity: &str,
        details: EventDetails,
    ) -> Result<Event, RegistryError> {
        if name.is_empty() || date.is_empty() {
            return Err(RegistryError::Validation(
                "name and date are required".to_string(),
            ));
        }
        let capacity: u32 = capacity.parse().map_err(|_| {
            RegistryError::Validation("capacity must be a whole number".to_string())
        })?;
        if capacity == 0 {
            return Err(RegistryError::Validation(
                "capacity must be positive".to_string(),
            ));
        }
        if chrono::NaiveDate::parse_from_str(date, DATE_FORMAT).is_err() {
            return Err(RegistryError::Validation(
                "date must be in YYYY-MM-DD format".to_string(),
            ));
        }

        let id = self.events.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let mut event = Event::new(id, name, date, capacity);
        event.location = details.location;
        event.description = details.description;
        event.organizer = details.organizer;

        self.events.push(event.clone());
        if let Err(e) = self.persist() {
            self.events.pop();
            return Err(e);
        }
        tracing::info!(event_id = id, name, "event created");
        Ok(event)
    }

    /// Applies a field-wise update to an event.
    ///
    /// Provided fields are validated independently; omitted fields are left
    /// unchanged. Returns the updated event.
    ///
    /// # Errors
    ///
    /// [`RegistryError::EventNotFound`] for an unknown id,
    /// [`RegistryError::Validation`] for a bad name or date,
    /// [`RegistryError::CapacityConflict`] if the new capacity is below the
    /// current attendee count. Any failure leaves the event unchanged.
    pub fn update(&mut self, id: u32, update: EventUpdate) -> Result<Event, RegistryError> {
        let Some(pos) = self.events.iter().position(|e| e.id == id) else {
            return Err(RegistryError::EventNotFound(id));
        };
        let Some(current) = self.events.get(pos) else {
            return Err(RegistryError::EventNotFound(id));
        };

        let mut updated = current.clone();
        if let Some(name) = update.name {
            if name.is_empty() {
                return Err(RegistryError::Validation(
                    "name must be non-empty".to_string(),
                ));
            }
            updated.name = name;
        }
        if let Some(date) = update.date {
            if chrono::NaiveDate::parse_from_str(&date, DATE_FORMAT).is_err() {
                return Err(RegistryError::Validation(
                    "date must be in YYYY-MM-DD format".to_string(),
                ));
            }
            updated.date = date;
        }
        if let Some(capacity) = update.capacity {
            updated.set_capacity(capacity)?;
        }
        if let Some(location) = update.location {
            updated.location = Some(location);
        }
        if let Some(description) = update.description {
            updated.description = Some(description);
        }

        let previous = current.clone();
        if let Some(slot) = self.events.get_mut(pos) {
            *slot = updated.clone();
        }
        if let Err(e) = self.persist() {
            if let Some(slot) = self.events.get_mut(pos) {
                *slot = previous;
            }
            return Err(e);
        }
        Ok(updated)
    }

    /// Deletes an event.
    ///
    /// Deletion does not cascade into the account registry; accounts may be
    /// left holding dangling references until the next reconcile pass.
    ///
    /// # Errors
    ///
    /// [`RegistryError::EventNotFound`] for an unknown id,
    /// [`RegistryError::Store`] on write failure (the event is retained).
    pub fn delete(&mut self, id: u32) -> Result<(), RegistryError> {
        let Some(pos) = self.events.iter().position(|e| e.id == id) else {
            return Err(RegistryError::EventNotFound(id));
        };
        let removed = self.events.remove(pos);
        if let Err(e) = self.persist() {
            self.events.insert(pos, removed);
            return Err(e);
        }
        tracing::info!(event_id = id, "event deleted");
        Ok(())
    }

    /// Adds a username to an event's attendee list and persists.
    ///
    /// # Errors
    ///
    /// [`RegistryError::EventNotFound`], [`RegistryError::EventFull`],
    /// [`RegistryError::DuplicateRegistration`], or
    /// [`RegistryError::Store`] (the attendee is rolled back).
    pub fn register_attendee(&mut self, id: u32, username: &str) -> Result<(), RegistryError> {
        let Some(event) = self.events.iter_mut().find(|e| e.id == id) else {
            return Err(RegistryError::EventNotFound(id));
        };
        event.add_attendee(username)?;
        if let Err(e) = self.persist() {
            if let Some(event) = self.events.iter_mut().find(|e| e.id == id) {
                let _ = event.remove_attendee(username);
            }
            return Err(e);
        }
        tracing::info!(event_id = id, username, "attendee registered");
        Ok(())
    }

    /// Removes a username from an event's attendee list and persists.
    ///
    /// # Errors
    ///
    /// [`RegistryError::EventNotFound`], [`RegistryError::NotRegistered`],
    /// or [`RegistryError::Store`] (the attendee is restored).
    pub fn unregister_attendee(&mut self, id: u32, username: &str) -> Result<(), RegistryError> {
        let Some(event) = self.events.iter_mut().find(|e| e.id == id) else {
            return Err(RegistryError::EventNotFound(id));
        };
        event.remove_attendee(username)?;
        if let Err(e) = self.persist() {
            if let Some(event) = self.events.iter_mut().find(|e| e.id == id) {
                let _ = event.add_attendee(username);
            }
            return Err(e);
        }
        tracing::info!(event_id = id, username, "attendee unregistered");
        Ok(())
    }

    /// Searches events by keyword and/or exact date.
    ///
    /// The keyword matches case-insensitively as a substring of name,
    /// description, or location; both filters are conjunctive when both are
    /// supplied. The returned iterator is lazy, preserves store order, and
    /// is `Clone` so a search can be restarted without re-running the query.
    pub fn search<'a>(
        &'a self,
        keyword: Option<&str>,
        date: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Event> + Clone + 'a {
        let needle = keyword.map(str::to_lowercase);
        self.events.iter().filter(move |event| {
            let keyword_hit = match &needle {
                Some(n) => {
                    event.name.to_lowercase().contains(n.as_str())
                        || event
                            .description
                            .as_deref()
                            .is_some_and(|d| d.to_lowercase().contains(n.as_str()))
                        || event
                            .location
                            .as_deref()
                            .is_some_and(|l| l.to_lowercase().contains(n.as_str()))
                }
                None => true,
            };
            keyword_hit && date.is_none_or(|d| event.date == d)
        })
    }

    /// Events organized by the given username, in store order.
    #[must_use]
    pub fn events_by_organizer(&self, username: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.organizer.as_deref() == Some(username))
            .collect()
    }

    /// Events whose attendee list contains the given username.
    #[must_use]
    pub fn events_registered_by(&self, username: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.attendees().iter().any(|a| a == username))
            .collect()
    }

    /// Computes aggregate statistics over the registry.
    #[must_use]
    pub fn statistics(&self) -> EventStatistics {
        if self.events.is_empty() {
            return EventStatistics::default();
        }
        let total_events = self.events.len();
        let total_attendees: usize = self.events.iter().map(Event::attendee_count).sum();

        // Strict comparison keeps the first occurrence on ties.
        let mut highest: Option<&Event> = None;
        for event in &self.events {
            if highest.is_none_or(|h| event.attendee_count() > h.attendee_count()) {
                highest = Some(event);
            }
        }
        let lowest = self
            .events
            .iter()
            .filter(|e| e.attendee_count() > 0)
            .min_by_key(|e| e.attendee_count());

        EventStatistics {
            total_events,
            total_attendees,
            average_attendance: total_attendees as f64 / total_events as f64,
            highest_attendance: highest.map(AttendanceEntry::from),
            lowest_attendance: lowest.map(AttendanceEntry::from),
            full_events: self.events.iter().filter(|e| e.is_full()).count(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::fs;

    fn open_registry() -> (tempfile::TempDir, EventRegistry) {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("temp dir");
        };
        let registry = EventRegistry::open(JsonStore::new(dir.path().join("events.json")));
        (dir, registry)
    }

    fn create(registry: &mut EventRegistry, name: &str, capacity: &str) -> Event {
        let Ok(event) = registry.create(name, "2026-09-01", capacity, EventDetails::default())
        else {
            panic!("create failed");
        };
        event
    }

    #[test]
    fn first_event_gets_id_one() {
        let (_dir, mut registry) = open_registry();
        let event = create(&mut registry, "Orientation", "10");
        assert_eq!(event.id, 1);
    }

    #[test]
    fn id_is_max_existing_plus_one() {
        let (dir, _) = open_registry();
        let store: JsonStore<Event> = JsonStore::new(dir.path().join("seeded.json"));
        let seeded = vec![
            Event::new(2, "Hack Night", "2026-10-05", 30),
            Event::new(5, "Career Fair", "2026-11-12", 200),
        ];
        assert!(store.save_all(&seeded).is_ok());

        let mut registry = EventRegistry::open(store);
        let event = create(&mut registry, "Orientation", "10");
        assert_eq!(event.id, 6);
    }

    #[test]
    fn create_validation_order() {
        let (_dir, mut registry) = open_registry();

        // Empty name wins even when capacity and date are also bad.
        let err = registry.create("", "bad-date", "zero", EventDetails::default());
        assert!(matches!(err, Err(RegistryError::Validation(msg)) if msg.contains("required")));

        // Capacity is checked before the date format.
        let err = registry.create("Orientation", "bad-date", "zero", EventDetails::default());
        assert!(matches!(err, Err(RegistryError::Validation(msg)) if msg.contains("number")));

        let err = registry.create("Orientation", "bad-date", "0", EventDetails::default());
        assert!(matches!(err, Err(RegistryError::Validation(msg)) if msg.contains("positive")));

        let err = registry.create("Orientation", "bad-date", "10", EventDetails::default());
        assert!(matches!(err, Err(RegistryError::Validation(msg)) if msg.contains("YYYY-MM-DD")));

        // No partial event survived any failing check.
        assert!(registry.is_empty());
    }

    #[test]
    fn create_persists_details() {
        let (dir, mut registry) = open_registry();
        let details = EventDetails {
            location: Some("Main Hall".to_string()),
            description: Some("Welcome week".to_string()),
            organizer: Some("org".to_string()),
        };
        let Ok(event) = registry.create("Orientation", "2026-09-01", "10", details) else {
            panic!("create failed");
        };

        // Reopen from the same store to confirm the write.
        let reopened = EventRegistry::open(JsonStore::new(dir.path().join("events.json")));
        let Some(loaded) = reopened.get(event.id) else {
            panic!("event missing after reopen");
        };
        assert_eq!(loaded.location.as_deref(), Some("Main Hall"));
        assert_eq!(loaded.organizer.as_deref(), Some("org"));
    }

    #[test]
    fn update_unknown_id_fails() {
        let (_dir, mut registry) = open_registry();
        let err = registry.update(9, EventUpdate::default());
        assert!(matches!(err, Err(RegistryError::EventNotFound(9))));
    }

    #[test]
    fn update_leaves_omitted_fields_unchanged() {
        let (_dir, mut registry) = open_registry();
        let event = create(&mut registry, "Orientation", "10");

        let update = EventUpdate {
            location: Some("Main Hall".to_string()),
            ..EventUpdate::default()
        };
        let Ok(updated) = registry.update(event.id, update) else {
            panic!("update failed");
        };
        assert_eq!(updated.name, "Orientation");
        assert_eq!(updated.date, "2026-09-01");
        assert_eq!(updated.capacity(), 10);
        assert_eq!(updated.location.as_deref(), Some("Main Hall"));
    }

    #[test]
    fn update_rejects_bad_date() {
        let (_dir, mut registry) = open_registry();
        let event = create(&mut registry, "Orientation", "10");
        let update = EventUpdate {
            date: Some("09/01/2026".to_string()),
            ..EventUpdate::default()
        };
        let err = registry.update(event.id, update);
        assert!(matches!(err, Err(RegistryError::Validation(_))));
        let Some(unchanged) = registry.get(event.id) else {
            panic!("event missing");
        };
        assert_eq!(unchanged.date, "2026-09-01");
    }

    #[test]
    fn update_capacity_below_attendance_conflicts() {
        let (_dir, mut registry) = open_registry();
        let event = create(&mut registry, "Orientation", "3");
        assert!(registry.register_attendee(event.id, "ada").is_ok());
        assert!(registry.register_attendee(event.id, "grace").is_ok());

        let update = EventUpdate {
            capacity: Some(1),
            ..EventUpdate::default()
        };
        let err = registry.update(event.id, update);
        assert!(matches!(err, Err(RegistryError::CapacityConflict { .. })));
        let Some(unchanged) = registry.get(event.id) else {
            panic!("event missing");
        };
        assert_eq!(unchanged.capacity(), 3);
    }

    #[test]
    fn delete_removes_and_persists() {
        let (dir, mut registry) = open_registry();
        let event = create(&mut registry, "Orientation", "10");
        assert!(registry.delete(event.id).is_ok());
        assert!(registry.get(event.id).is_none());

        let reopened = EventRegistry::open(JsonStore::new(dir.path().join("events.json")));
        assert!(reopened.is_empty());

        let err = registry.delete(event.id);
        assert!(matches!(err, Err(RegistryError::EventNotFound(_))));
    }

    #[test]
    fn capacity_invariant_holds_across_registrations() {
        let (_dir, mut registry) = open_registry();
        let event = create(&mut registry, "Orientation", "2");

        assert!(registry.register_attendee(event.id, "ada").is_ok());
        assert!(registry.register_attendee(event.id, "grace").is_ok());
        let err = registry.register_attendee(event.id, "edsger");
        assert!(matches!(err, Err(RegistryError::EventFull(_))));

        let Some(stored) = registry.get(event.id) else {
            panic!("event missing");
        };
        assert_eq!(stored.attendee_count(), 2);
        assert!(stored.attendee_count() <= stored.capacity() as usize);
    }

    #[test]
    fn search_is_conjunctive_and_case_insensitive() {
        let (_dir, mut registry) = open_registry();
        let details = EventDetails {
            description: Some("Annual coding marathon".to_string()),
            ..EventDetails::default()
        };
        let Ok(_) = registry.create("Hack Night", "2026-10-05", "30", details) else {
            panic!("create failed");
        };
        let Ok(_) = registry.create("Career Fair", "2026-10-05", "200", EventDetails::default())
        else {
            panic!("create failed");
        };

        let by_keyword: Vec<_> = registry.search(Some("CODING"), None).collect();
        assert_eq!(by_keyword.len(), 1);

        let by_date: Vec<_> = registry.search(None, Some("2026-10-05")).collect();
        assert_eq!(by_date.len(), 2);

        let both: Vec<_> = registry.search(Some("career"), Some("2026-10-05")).collect();
        assert_eq!(both.len(), 1);

        let neither: Vec<_> = registry.search(Some("career"), Some("2026-01-01")).collect();
        assert!(neither.is_empty());
    }

    #[test]
    fn search_is_restartable() {
        let (_dir, mut registry) = open_registry();
        let _ = create(&mut registry, "Hack Night", "30");
        let results = registry.search(Some("hack"), None);
        let first_pass = results.clone().count();
        let second_pass = results.count();
        assert_eq!(first_pass, 1);
        assert_eq!(second_pass, 1);
    }

    #[test]
    fn statistics_on_empty_registry_are_zero() {
        let (_dir, registry) = open_registry();
        let stats = registry.statistics();
        assert_eq!(stats.total_events, 0);
        assert_eq!(stats.total_attendees, 0);
        assert_eq!(stats.average_attendance, 0.0);
        assert!(stats.highest_attendance.is_none());
        assert!(stats.lowest_attendance.is_none());
        assert_eq!(stats.full_events, 0);
    }

    #[test]
    fn statistics_fixture() {
        // Attendee counts [0, 3, 5, 5] against capacities [2, 3, 5, 6].
        let (_dir, mut registry) = open_registry();
        let counts = [0usize, 3, 5, 5];
        let capacities = ["2", "3", "5", "6"];
        for (i, (count, capacity)) in counts.iter().zip(capacities).enumerate() {
            let event = create(&mut registry, &format!("Event {i}"), capacity);
            for n in 0..*count {
                assert!(registry.register_attendee(event.id, &format!("u{i}-{n}")).is_ok());
            }
        }

        let stats = registry.statistics();
        assert_eq!(stats.total_events, 4);
        assert_eq!(stats.total_attendees, 13);
        assert_eq!(stats.average_attendance, 3.25);
        assert_eq!(stats.full_events, 2);

        let Some(highest) = stats.highest_attendance else {
            panic!("highest missing");
        };
        assert_eq!(highest.attendees, 5);
        // First occurrence wins the tie between the two count-5 events.
        assert_eq!(highest.name, "Event 2");

        let Some(lowest) = stats.lowest_attendance else {
            panic!("lowest missing");
        };
        // The zero-attendee event is excluded from "lowest".
        assert_eq!(lowest.attendees, 3);
    }

    #[test]
    fn highest_is_present_even_at_zero_attendance() {
        let (_dir, mut registry) = open_registry();
        let _ = create(&mut registry, "Orientation", "10");
        let stats = registry.statistics();
        let Some(highest) = stats.highest_attendance else {
            panic!("highest missing");
        };
        assert_eq!(highest.attendees, 0);
        assert!(stats.lowest_attendance.is_none());
    }

    #[test]
    fn malformed_store_degrades_to_empty() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("temp dir");
        };
        let path = dir.path().join("events.json");
        assert!(fs::write(&path, "[{ broken").is_ok());

        let registry = EventRegistry::open(JsonStore::new(path));
        assert!(registry.is_empty());
        // Queries stay usable.
        assert_eq!(registry.statistics().total_events, 0);
    }

    #[test]
    fn refresh_picks_up_external_edits() {
        let (dir, mut registry) = open_registry();
        assert!(registry.is_empty());

        let store: JsonStore<Event> = JsonStore::new(dir.path().join("events.json"));
        assert!(store.save_all(&[Event::new(1, "Hack Night", "2026-10-05", 30)]).is_ok());

        // Reads do not reload implicitly.
        assert!(registry.is_empty());
        registry.refresh();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn events_by_organizer_and_registration_views() {
        let (_dir, mut registry) = open_registry();
        let details = EventDetails {
            organizer: Some("org".to_string()),
            ..EventDetails::default()
        };
        let Ok(owned) = registry.create("Hack Night", "2026-10-05", "30", details) else {
            panic!("create failed");
        };
        let other = create(&mut registry, "Career Fair", "200");
        assert!(registry.register_attendee(other.id, "ada").is_ok());

        let organized = registry.events_by_organizer("org");
        assert_eq!(organized.len(), 1);
        assert!(organized.iter().all(|e| e.id == owned.id));

        let joined = registry.events_registered_by("ada");
        assert_eq!(joined.len(), 1);
        assert!(joined.iter().all(|e| e.id == other.id));
    }
}
