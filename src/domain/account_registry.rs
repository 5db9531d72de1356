//! Account collection: credentials, profiles, and registration references.

use super::account::{Account, Role};
use crate::error::RegistryError;
use crate::persistence::JsonStore;

/// Optional profile fields supplied at account creation.
#[derive(Debug, Clone, Default)]
pub struct AccountProfile {
    /// Contact address.
    pub email: Option<String>,
    /// Display name.
    pub full_name: Option<String>,
}

/// Field-wise profile update. `None` means "leave unchanged".
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New password.
    pub password: Option<String>,
    /// New contact address.
    pub email: Option<String>,
    /// New display name.
    pub full_name: Option<String>,
}

/// Central store for all accounts.
///
/// Mirrors registration references for the event registry; it never checks
/// capacity itself. Same single-threaded read-modify-write discipline as
/// [`super::EventRegistry`].
#[derive(Debug)]
pub struct AccountRegistry {
    store: JsonStore<Account>,
    accounts: Vec<Account>,
}

impl AccountRegistry {
    /// Opens a registry over the given store, loading the working copy.
    ///
    /// Missing or malformed store files degrade to an empty registry; a
    /// malformed file is reported, never propagated.
    #[must_use]
    pub fn open(store: JsonStore<Account>) -> Self {
        let mut registry = Self {
            store,
            accounts: Vec::new(),
        };
        registry.refresh();
        registry
    }

    /// Replaces the working copy with the current store contents.
    pub fn refresh(&mut self) {
        match self.store.load_all() {
            Ok(accounts) => self.accounts = accounts,
            Err(e) => {
                tracing::error!(error = %e, "account store load failed; starting empty");
                self.accounts = Vec::new();
            }
        }
    }

    fn persist(&self) -> Result<(), RegistryError> {
        self.store.save_all(&self.accounts)
    }

    /// All accounts in store order.
    #[must_use]
    pub fn all(&self) -> &[Account] {
        &self.accounts
    }

    /// Looks up an account by username.
    #[must_use]
    pub fn get(&self, username: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.username == username)
    }

    /// Matches a username/password pair against the stored accounts.
    ///
    /// The role is read from the matched account, never supplied by the
    /// caller: a caller need not know an account's role in advance.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidCredentials`] when no account matches both
    /// fields. The error does not reveal which field was wrong.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<&Account, RegistryError> {
        self.accounts
            .iter()
            .find(|a| a.username == username && a.password == password)
            .ok_or(RegistryError::InvalidCredentials)
    }

    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateUsername`] if the username is taken,
    /// [`RegistryError::Store`] on write failure (the account is not
    /// retained).
    pub fn create(
        &mut self,
        username: &str,
        password: &str,
        role: Role,
        profile: AccountProfile,
    ) -> Result<Account, RegistryError> {
        if self.get(username).is_some() {
            return Err(RegistryError::DuplicateUsername(username.to_string()));
        }
        let mut account = Account::new(username, password, role);
        account.email = profile.email;
        account.full_name = profile.full_name;

        self.accounts.push(account.clone());
        if let Err(e) = self.persist() {
            self.accounts.pop();
            return Err(e);
        }
        tracing::info!(username, %role, "account created");
        Ok(account)
    }

    /// Applies a field-wise profile update.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AccountNotFound`] for an unknown username, or
    /// [`RegistryError::Store`] on write failure (the profile is restored).
    pub fn update_profile(
        &mut self,
        username: &str,
        update: ProfileUpdate,
    ) -> Result<Account, RegistryError> {
        let Some(pos) = self.accounts.iter().position(|a| a.username == username) else {
            return Err(RegistryError::AccountNotFound(username.to_string()));
        };
        let Some(current) = self.accounts.get(pos) else {
            return Err(RegistryError::AccountNotFound(username.to_string()));
        };

        let previous = current.clone();
        let mut updated = previous.clone();
        if let Some(password) = update.password {
            updated.password = password;
        }
        if let Some(email) = update.email {
            updated.email = Some(email);
        }
        if let Some(full_name) = update.full_name {
            updated.full_name = Some(full_name);
        }

        if let Some(slot) = self.accounts.get_mut(pos) {
            *slot = updated.clone();
        }
        if let Err(e) = self.persist() {
            if let Some(slot) = self.accounts.get_mut(pos) {
                *slot = previous;
            }
            return Err(e);
        }
        Ok(updated)
    }

    /// Records that an account joined an event.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AccountNotFound`],
    /// [`RegistryError::AlreadyRegistered`] if the reference exists, or
    /// [`RegistryError::Store`] (the reference is rolled back).
    pub fn add_registration_reference(
        &mut self,
        username: &str,
        event_id: u32,
    ) -> Result<(), RegistryError> {
        let Some(account) = self.accounts.iter_mut().find(|a| a.username == username) else {
            return Err(RegistryError::AccountNotFound(username.to_string()));
        };
        if account.registered_events.contains(&event_id) {
            return Err(RegistryError::AlreadyRegistered {
                username: username.to_string(),
                event_id,
            });
        }
        account.registered_events.push(event_id);
        if let Err(e) = self.persist() {
            if let Some(account) = self.accounts.iter_mut().find(|a| a.username == username) {
                account.registered_events.retain(|id| *id != event_id);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Removes an account's reference to an event.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AccountNotFound`],
    /// [`RegistryError::NotRegistered`] if the reference is absent, or
    /// [`RegistryError::Store`] (the reference is restored).
    pub fn remove_registration_reference(
        &mut self,
        username: &str,
        event_id: u32,
    ) -> Result<(), RegistryError> {
        let Some(account) = self.accounts.iter_mut().find(|a| a.username == username) else {
            return Err(RegistryError::AccountNotFound(username.to_string()));
        };
        let Some(pos) = account.registered_events.iter().position(|id| *id == event_id) else {
            return Err(RegistryError::NotRegistered {
                event_id,
                username: username.to_string(),
            });
        };
        account.registered_events.remove(pos);
        if let Err(e) = self.persist() {
            if let Some(account) = self.accounts.iter_mut().find(|a| a.username == username) {
                account.registered_events.insert(pos, event_id);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Replaces an account's reference set wholesale. Used by reconcile
    /// repairs; persists once for the whole batch.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AccountNotFound`] or [`RegistryError::Store`].
    pub(crate) fn replace_registration_references(
        &mut self,
        username: &str,
        references: Vec<u32>,
    ) -> Result<(), RegistryError> {
        let Some(account) = self.accounts.iter_mut().find(|a| a.username == username) else {
            return Err(RegistryError::AccountNotFound(username.to_string()));
        };
        let previous = std::mem::replace(&mut account.registered_events, references);
        if let Err(e) = self.persist() {
            if let Some(account) = self.accounts.iter_mut().find(|a| a.username == username) {
                account.registered_events = previous;
            }
            return Err(e);
        }
        Ok(())
    }
}
