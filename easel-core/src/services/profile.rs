//! Profile service - self-service edits to the signed-in account

use std::sync::Arc;

use crate::domain::password;
use crate::domain::result::{Error, Result};
use crate::domain::UserRecord;
use crate::repository::UserRepository;

/// Service for the signed-in account's own profile
pub struct ProfileService {
    repository: Arc<UserRepository>,
}

impl ProfileService {
    pub fn new(repository: Arc<UserRepository>) -> Self {
        Self { repository }
    }

    fn require_current(&self) -> Result<UserRecord> {
        self.repository
            .current_user()?
            .ok_or_else(|| Error::not_found("You are not signed in."))
    }

    /// Change the display name of the signed-in account
    pub fn set_name(&self, new_name: &str) -> Result<UserRecord> {
        UserRecord::validate_name(new_name).map_err(Error::validation)?;

        let mut user = self.require_current()?;
        user.name = new_name.trim().to_string();
        self.repository.update_user(&user)?;
        Ok(user)
    }

    /// Change the password of the signed-in account
    ///
    /// Administrator accounts and accounts without a stored hash cannot
    /// change their password here. The current password must verify before
    /// the new one is accepted.
    pub fn change_password(&self, current: &str, new: &str) -> Result<()> {
        let mut user = self.require_current()?;

        if user.is_admin {
            return Err(Error::AccountHasNoPassword);
        }
        let hash = user
            .password_hash
            .clone()
            .ok_or(Error::AccountHasNoPassword)?;

        if !password::verify_password(current, &hash)? {
            return Err(Error::IncorrectCurrentPassword);
        }
        UserRecord::validate_password(new).map_err(Error::validation)?;

        user.password_hash = Some(password::hash_password(new)?);
        self.repository.update_user(&user)
    }

    /// Permanently delete the signed-in account
    ///
    /// Removes the record and the session pointer. Returns the email of the
    /// deleted account.
    pub fn delete_account(&self) -> Result<String> {
        let user = self.require_current()?;
        self.repository.remove_user(&user.email)?;
        self.repository.clear_session()?;
        Ok(user.email)
    }
}
