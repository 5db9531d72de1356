//! Domain layer: entities and the two registries.
//!
//! The event registry is the source of truth for capacity and attendee
//! membership; the account registry mirrors registration references. The
//! cross-registry consistency protocol lives in the service layer.

pub mod account;
pub mod account_registry;
pub mod event;
pub mod event_registry;

pub use account::{Account, Role};
pub use account_registry::{AccountProfile, AccountRegistry, ProfileUpdate};
pub use event::Event;
pub use event_registry::{
    AttendanceEntry, EventDetails, EventRegistry, EventStatistics, EventUpdate,
};
