//! Account entity: credentials, role, and registered-event references.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of account roles.
///
/// Capability is derived from the role by the predicate methods on
/// [`Account`]; there is no role hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Manages events and attendees.
    Administrator,
    /// Manages attendees of events they own.
    Organizer,
    /// Registers for and unregisters from events.
    Registrant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Administrator => write!(f, "Administrator"),
            Self::Organizer => write!(f, "Organizer"),
            Self::Registrant => write!(f, "Registrant"),
        }
    }
}

/// A credentialed identity with a role and a set of event references.
///
/// The password is stored as an opaque plaintext string. That is a known
/// weakness carried over from the persisted store format, not an invitation
/// to match against it elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique username (immutable after creation).
    pub username: String,
    /// Opaque credential string.
    pub password: String,
    /// The account's role.
    pub role: Role,
    /// Contact address, if provided.
    pub email: Option<String>,
    /// Display name, if provided.
    pub full_name: Option<String>,
    /// Ids of events this account has joined (semantically a set).
    #[serde(default)]
    pub registered_events: Vec<u32>,
}

impl Account {
    /// Creates an account with no profile details and no registrations.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role,
            email: None,
            full_name: None,
            registered_events: Vec::new(),
        }
    }

    /// `true` for roles allowed to create, update, and delete events.
    #[must_use]
    pub const fn can_manage_events(&self) -> bool {
        matches!(self.role, Role::Administrator)
    }

    /// `true` for roles allowed to manage attendee lists.
    #[must_use]
    pub const fn can_manage_attendees(&self) -> bool {
        matches!(self.role, Role::Administrator | Role::Organizer)
    }

    /// `true` for roles allowed to register for events.
    #[must_use]
    pub const fn can_register(&self) -> bool {
        matches!(self.role, Role::Registrant)
    }

    /// `true` if the account holds a reference to the given event.
    #[must_use]
    pub fn is_registered_for(&self, event_id: u32) -> bool {
        self.registered_events.contains(&event_id)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.username, self.role)
    }
}
