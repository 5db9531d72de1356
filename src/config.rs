//! Engine configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`), with defaults suitable for a local
//! checkout.

use std::path::PathBuf;

use crate::domain::{AccountRegistry, EventRegistry};
use crate::persistence::JsonStore;
use crate::service::RegistrationCoordinator;

/// Top-level engine configuration.
///
/// Loaded once at startup via [`EngineConfig::from_env`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path of the persisted event store.
    pub events_file: PathBuf,

    /// Path of the persisted account store.
    pub accounts_file: PathBuf,
}

impl EngineConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to `data/events.json` and `data/users.json` when a
    /// variable is not set. Calls `dotenvy::dotenv().ok()` to optionally
    /// load a `.env` file.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            events_file: env_path("CAMPUS_EVENTS_FILE", "data/events.json"),
            accounts_file: env_path("CAMPUS_ACCOUNTS_FILE", "data/users.json"),
        }
    }

    /// Opens both registries over the configured stores and wires them into
    /// a [`RegistrationCoordinator`].
    #[must_use]
    pub fn open(&self) -> RegistrationCoordinator {
        let events = EventRegistry::open(JsonStore::new(&self.events_file));
        let accounts = AccountRegistry::open(JsonStore::new(&self.accounts_file));
        RegistrationCoordinator::new(events, accounts)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Reads an environment variable as a path, returning `default` when unset.
fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key).map_or_else(|_| PathBuf::from(default), PathBuf::from)
}
