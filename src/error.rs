//! Registry error types with numeric code mapping.
//!
//! [`RegistryError`] is the central error type for the engine. Every variant
//! is locally recoverable: a failing operation leaves prior state intact,
//! with the single documented exception of [`RegistryError::PartialRegistration`].

use std::fmt;

/// Identifies which half of a two-step registration the failure occurred in.
///
/// A registration (or unregistration) mutates the event store first and the
/// account store second. Step-one failures are atomic; a step-two failure
/// leaves the stores inconsistent and is reported with the step attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStep {
    /// The event-side mutation (capacity and attendee membership).
    EventStore,
    /// The account-side mutation (registered-event references).
    AccountStore,
}

impl fmt::Display for RegistrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EventStore => write!(f, "event store"),
            Self::AccountStore => write!(f, "account store"),
        }
    }
}

/// Engine-wide error enum with numeric code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category                  |
/// |-----------|---------------------------|
/// | 1000–1999 | Validation / credentials  |
/// | 2000–2999 | Not found / duplicates    |
/// | 3000–3999 | Storage                   |
/// | 4000–4999 | Registration state        |
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Input validation failed (bad name, date, or capacity). The caller
    /// may re-prompt and retry.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Username/password pair did not match any account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Event with the given id was not found.
    #[error("event not found: {0}")]
    EventNotFound(u32),

    /// Account with the given username was not found.
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// An account with the given username already exists.
    #[error("username already exists: {0}")]
    DuplicateUsername(String),

    /// The event has no remaining capacity.
    #[error("event {0} is full")]
    EventFull(u32),

    /// The username is already on the event's attendee list.
    #[error("{username} is already registered for event {event_id}")]
    DuplicateRegistration {
        /// Event whose attendee list already holds the username.
        event_id: u32,
        /// The duplicate username.
        username: String,
    },

    /// The account already holds a reference to the event.
    #[error("{username} already holds a reference to event {event_id}")]
    AlreadyRegistered {
        /// Account holding the duplicate reference.
        username: String,
        /// The referenced event.
        event_id: u32,
    },

    /// The username is not registered for the event.
    #[error("{username} is not registered for event {event_id}")]
    NotRegistered {
        /// Event the username was expected on.
        event_id: u32,
        /// The absent username.
        username: String,
    },

    /// An update would reduce capacity below the current attendee count.
    #[error("capacity {requested} is below current attendance {attendees}")]
    CapacityConflict {
        /// Requested new capacity.
        requested: u32,
        /// Current attendee count the capacity must cover.
        attendees: usize,
    },

    /// Storage adapter failure (write or serialization).
    #[error("store error: {0}")]
    Store(String),

    /// A two-step registration left the stores inconsistent: the first
    /// mutation succeeded and the second failed. The caller should attempt
    /// a compensating action (e.g. retry the failed step) rather than treat
    /// this as a plain validation failure.
    #[error("partial registration failure at {step}: {source}")]
    PartialRegistration {
        /// The step whose mutation failed.
        step: RegistrationStep,
        /// The error the failing step produced.
        source: Box<RegistryError>,
    },
}

impl RegistryError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::InvalidCredentials => 1002,
            Self::EventNotFound(_) => 2001,
            Self::AccountNotFound(_) => 2002,
            Self::DuplicateUsername(_) => 2003,
            Self::Store(_) => 3001,
            Self::EventFull(_) => 4001,
            Self::DuplicateRegistration { .. } => 4002,
            Self::AlreadyRegistered { .. } => 4003,
            Self::NotRegistered { .. } => 4004,
            Self::CapacityConflict { .. } => 4005,
            Self::PartialRegistration { .. } => 4006,
        }
    }
}
