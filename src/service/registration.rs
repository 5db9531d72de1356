//! Registration coordinator: two coordinated single-registry mutations.
//!
//! There is no transaction boundary spanning the event and account stores,
//! so a registration is two steps in a fixed order with no rollback of step
//! one when step two fails. The contract makes partial failure observable
//! ([`RegistryError::PartialRegistration`]) rather than pretending
//! atomicity.

use serde::Serialize;

use crate::domain::{AccountRegistry, EventRegistry};
use crate::error::{RegistrationStep, RegistryError};

/// Summary of the repairs performed by [`RegistrationCoordinator::reconcile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Attendee entries removed because no account with that username exists.
    pub attendees_removed: usize,
    /// Account references added to match an event's attendee list.
    pub references_added: usize,
    /// Account references removed because the event is gone or does not
    /// list the account.
    pub references_removed: usize,
}

impl ReconcileReport {
    /// `true` if the stores were already consistent.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.attendees_removed == 0 && self.references_added == 0 && self.references_removed == 0
    }
}

/// Orchestrates registrations across the two registries.
///
/// Step one always targets the event registry (capacity and event-side
/// duplicate checks), step two the account registry (reference bookkeeping).
/// A step-one failure is atomic; a step-two failure is surfaced as a
/// distinct partial-failure error carrying the failed step so the caller
/// can attempt a compensating action.
#[derive(Debug)]
pub struct RegistrationCoordinator {
    events: EventRegistry,
    accounts: AccountRegistry,
}

impl RegistrationCoordinator {
    /// Creates a coordinator over the two registries.
    #[must_use]
    pub fn new(events: EventRegistry, accounts: AccountRegistry) -> Self {
        Self { events, accounts }
    }

    /// The event registry.
    #[must_use]
    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    /// Mutable access to the event registry.
    pub fn events_mut(&mut self) -> &mut EventRegistry {
        &mut self.events
    }

    /// The account registry.
    #[must_use]
    pub fn accounts(&self) -> &AccountRegistry {
        &self.accounts
    }

    /// Mutable access to the account registry.
    pub fn accounts_mut(&mut self) -> &mut AccountRegistry {
        &mut self.accounts
    }

    /// Registers a username for an event: event store first, account store
    /// second.
    ///
    /// # Errors
    ///
    /// Step-one errors ([`RegistryError::EventNotFound`],
    /// [`RegistryError::EventFull`],
    /// [`RegistryError::DuplicateRegistration`]) fail atomically. A
    /// step-two failure returns [`RegistryError::PartialRegistration`]: the
    /// event gained the attendee but the account reference was not added.
    pub fn register(&mut self, event_id: u32, username: &str) -> Result<(), RegistryError> {
        self.events.register_attendee(event_id, username)?;
        if let Err(source) = self.accounts.add_registration_reference(username, event_id) {
            tracing::error!(event_id, username, error = %source,
                "registration left stores inconsistent");
            return Err(RegistryError::PartialRegistration {
                step: RegistrationStep::AccountStore,
                source: Box::new(source),
            });
        }
        tracing::info!(event_id, username, "registration completed");
        Ok(())
    }

    /// Unregisters a username from an event, mirroring the order of
    /// [`RegistrationCoordinator::register`] with the same partial-failure
    /// signal.
    ///
    /// # Errors
    ///
    /// Step-one errors fail atomically; a step-two failure returns
    /// [`RegistryError::PartialRegistration`].
    pub fn unregister(&mut self, event_id: u32, username: &str) -> Result<(), RegistryError> {
        self.events.unregister_attendee(event_id, username)?;
        if let Err(source) = self
            .accounts
            .remove_registration_reference(username, event_id)
        {
            tracing::error!(event_id, username, error = %source,
                "unregistration left stores inconsistent");
            return Err(RegistryError::PartialRegistration {
                step: RegistrationStep::AccountStore,
                source: Box::new(source),
            });
        }
        tracing::info!(event_id, username, "unregistration completed");
        Ok(())
    }

    /// Audits the cross-store invariant and repairs drift.
    ///
    /// The event registry is the source of truth for membership, so repairs
    /// converge on it: attendee entries whose account no longer exists are
    /// dropped from events, and each account's reference set is rewritten to
    /// exactly the events that list it. This is the compensating action for
    /// partial registrations and for event deletions, which deliberately do
    /// not cascade.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Store`] if a repair cannot be persisted; repairs
    /// already written remain in place.
    pub fn reconcile(&mut self) -> Result<ReconcileReport, RegistryError> {
        let mut report = ReconcileReport::default();

        // Event side: drop attendees with no backing account.
        let mut orphans: Vec<(u32, String)> = Vec::new();
        for event in self.events.all() {
            for username in event.attendees() {
                if self.accounts.get(username).is_none() {
                    orphans.push((event.id, username.clone()));
                }
            }
        }
        for (event_id, username) in orphans {
            self.events.unregister_attendee(event_id, &username)?;
            report.attendees_removed += 1;
        }

        // Account side: rewrite each reference set from the event registry.
        let mut rewrites: Vec<(String, Vec<u32>)> = Vec::new();
        for account in self.accounts.all() {
            let desired: Vec<u32> = self
                .events
                .all()
                .iter()
                .filter(|e| e.attendees().iter().any(|a| *a == account.username))
                .map(|e| e.id)
                .collect();
            if desired == account.registered_events {
                continue;
            }
            let kept = account
                .registered_events
                .iter()
                .filter(|id| desired.contains(id))
                .count();
            // A hand-edited store may hold duplicate references, so `kept`
            // can exceed the desired count.
            report.references_removed += account.registered_events.len().saturating_sub(kept);
            report.references_added += desired.len().saturating_sub(kept);
            rewrites.push((account.username.clone(), desired));
        }
        for (username, desired) in rewrites {
            self.accounts
                .replace_registration_references(&username, desired)?;
        }

        if !report.is_clean() {
            tracing::warn!(
                attendees_removed = report.attendees_removed,
                references_added = report.references_added,
                references_removed = report.references_removed,
                "reconcile repaired cross-store drift"
            );
        }
        Ok(report)
    }
}
