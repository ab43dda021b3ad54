//! User record repository
//!
//! CRUD over the collection of registered users, keyed by normalized
//! (case-insensitive) email, persisted through the key-value store port.
//! The collection is the single source of truth; the session is a pointer
//! (the signed-in user's normalized email) resolved against it on read, so
//! the session can never diverge from the collection.

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{Theme, UserRecord};
use crate::ports::KeyValueStore;

/// Store key holding the full collection of user records
pub const ALL_USERS_KEY: &str = "allUsers";

/// Store key holding the session pointer (normalized email)
pub const SESSION_KEY: &str = "session";

/// Store key holding the theme preference
pub const THEME_KEY: &str = "theme";

/// Repository over any key-value store
pub struct UserRepository {
    store: Arc<dyn KeyValueStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    // =========================================================================
    // Collection
    // =========================================================================

    /// All registered users in stored order; a missing key is the empty
    /// collection. A malformed stored value is an error - callers that can
    /// degrade (the admin listing) do so explicitly.
    pub fn list_users(&self) -> Result<Vec<UserRecord>> {
        match self.store.get(ALL_USERS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Find a record by case-insensitive email
    pub fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let users = self.list_users()?;
        Ok(users.into_iter().find(|u| u.matches_email(email)))
    }

    /// Append a new record; the normalized email must not already exist
    pub fn insert_user(&self, record: &UserRecord) -> Result<()> {
        let mut users = self.list_users()?;
        if users.iter().any(|u| u.matches_email(&record.email)) {
            return Err(Error::DuplicateAccount);
        }
        users.push(record.clone());
        self.save_users(&users)
    }

    /// Replace the record whose normalized email matches
    ///
    /// Absence is an explicit error: updating a user that was never
    /// registered (or was deleted underneath the caller) is a caller bug,
    /// not a silent no-op.
    pub fn update_user(&self, record: &UserRecord) -> Result<()> {
        let mut users = self.list_users()?;
        match users.iter_mut().find(|u| u.matches_email(&record.email)) {
            Some(slot) => *slot = record.clone(),
            None => {
                return Err(Error::not_found(format!(
                    "no account for {}",
                    record.email_key()
                )))
            }
        }
        self.save_users(&users)
    }

    /// Remove all records matching the normalized email
    ///
    /// Removing an email with no record is not an error.
    pub fn remove_user(&self, email: &str) -> Result<()> {
        let mut users = self.list_users()?;
        users.retain(|u| !u.matches_email(email));
        self.save_users(&users)
    }

    fn save_users(&self, users: &[UserRecord]) -> Result<()> {
        let raw = serde_json::to_string(users)?;
        self.store.set(ALL_USERS_KEY, &raw)
    }

    // =========================================================================
    // Session pointer
    // =========================================================================

    /// The signed-in user's normalized email, if any
    pub fn session_email(&self) -> Result<Option<String>> {
        match self.store.get(SESSION_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Point the session at a user (stored normalized)
    pub fn set_session_email(&self, email: &str) -> Result<()> {
        let normalized = UserRecord::normalize_email(email);
        let raw = serde_json::to_string(&normalized)?;
        self.store.set(SESSION_KEY, &raw)
    }

    /// Clear the session pointer
    pub fn clear_session(&self) -> Result<()> {
        self.store.remove(SESSION_KEY)
    }

    /// Resolve the session pointer against the collection
    ///
    /// A dangling pointer (the record was removed) reads as no session.
    pub fn current_user(&self) -> Result<Option<UserRecord>> {
        match self.session_email()? {
            Some(email) => self.find_by_email(&email),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Theme preference
    // =========================================================================

    /// Stored theme preference; absent or unreadable reads as the default
    pub fn theme(&self) -> Result<Theme> {
        match self.store.get(THEME_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw).unwrap_or_default()),
            None => Ok(Theme::default()),
        }
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        let raw = serde_json::to_string(&theme)?;
        self.store.set(THEME_KEY, &raw)
    }
}
