//! Account service - signup, login, session restore and logout
//!
//! Authentication is local: records live in the user collection and the
//! signed-in account is a session pointer holding the normalized email.
//! Activating a session (login or restore) is also the moment the weekly
//! credit grant is applied.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::password;
use crate::domain::result::{Error, Result};
use crate::domain::{now_ms, UserRecord};
use crate::repository::UserRepository;

/// Where a signed-in account lands after authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Landing {
    Home,
    Admin,
}

impl Landing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Landing::Home => "home",
            Landing::Admin => "admin",
        }
    }
}

/// A resolved signed-in session
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub user: UserRecord,
    /// Whether this activation granted the weekly credit top-up
    pub granted_weekly_topup: bool,
}

impl ActiveSession {
    pub fn landing(&self) -> Landing {
        if self.user.is_admin {
            Landing::Admin
        } else {
            Landing::Home
        }
    }
}

/// Printable view of an account, without the password hash
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub name: String,
    pub email: String,
    pub credits: i64,
    pub is_admin: bool,
    pub created_at: Option<i64>,
    pub history_count: usize,
}

impl AccountView {
    pub fn from_record(user: &UserRecord) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            credits: user.credits,
            is_admin: user.is_admin,
            created_at: user.created_at,
            history_count: user.history.len(),
        }
    }
}

/// Service for account lifecycle and session management
pub struct AccountService {
    repository: Arc<UserRepository>,
}

impl AccountService {
    pub fn new(repository: Arc<UserRepository>) -> Self {
        Self { repository }
    }

    /// Register a new account and sign it in
    ///
    /// The email is stored normalized (trimmed, lower-cased). New accounts
    /// start with the signup credit grant and an empty history.
    pub fn signup(&self, name: &str, email: &str, password: &str) -> Result<ActiveSession> {
        UserRecord::validate_name(name).map_err(Error::validation)?;
        UserRecord::validate_email(email).map_err(Error::validation)?;
        UserRecord::validate_password(password).map_err(Error::validation)?;

        let hash = password::hash_password(password)?;
        let record = UserRecord::new(
            name.trim(),
            UserRecord::normalize_email(email),
            Some(hash),
        );

        self.repository.insert_user(&record)?;
        self.repository.set_session_email(&record.email)?;

        Ok(ActiveSession {
            user: record,
            granted_weekly_topup: false,
        })
    }

    /// Sign in to an existing account
    ///
    /// Distinguishes an unknown email from a bad password so the caller can
    /// steer the user to signup instead.
    pub fn login(&self, email: &str, password: &str) -> Result<ActiveSession> {
        let mut user = self
            .repository
            .find_by_email(email)?
            .ok_or_else(|| Error::not_found("No account found with this email. Please sign up."))?;

        let hash = user.password_hash.clone().ok_or(Error::NoPasswordSet)?;
        if !password::verify_password(password, &hash)? {
            return Err(Error::InvalidCredentials);
        }

        let granted = user.apply_weekly_topup(now_ms());
        if granted {
            self.repository.update_user(&user)?;
        }
        self.repository.set_session_email(&user.email)?;

        Ok(ActiveSession {
            user,
            granted_weekly_topup: granted,
        })
    }

    /// Restore the persisted session, if any
    ///
    /// A pointer to an account that no longer exists is cleared rather than
    /// reported. Like login, restoring applies the weekly top-up when due.
    pub fn activate(&self) -> Result<Option<ActiveSession>> {
        let email = match self.repository.session_email()? {
            Some(email) => email,
            None => return Ok(None),
        };

        let mut user = match self.repository.find_by_email(&email)? {
            Some(user) => user,
            None => {
                self.repository.clear_session()?;
                return Ok(None);
            }
        };

        let granted = user.apply_weekly_topup(now_ms());
        if granted {
            self.repository.update_user(&user)?;
        }

        Ok(Some(ActiveSession {
            user,
            granted_weekly_topup: granted,
        }))
    }

    /// Sign out by dropping the session pointer
    ///
    /// Signing out while already signed out is fine.
    pub fn logout(&self) -> Result<()> {
        self.repository.clear_session()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::local::LocalStore;
    use crate::domain::pricing::{SIGNUP_GRANT, WEEKLY_TOPUP, WEEKLY_TOPUP_INTERVAL_MS};
    use tempfile::TempDir;

    fn service() -> (TempDir, AccountService, Arc<UserRepository>) {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        let repository = Arc::new(UserRepository::new(Arc::new(store)));
        (dir, AccountService::new(repository.clone()), repository)
    }

    #[test]
    fn test_signup_grants_credits_and_signs_in() {
        let (_dir, service, repository) = service();

        let session = service
            .signup("Ada", "Ada@Example.com", "password123")
            .unwrap();

        assert_eq!(session.user.email, "ada@example.com");
        assert_eq!(session.user.credits, SIGNUP_GRANT);
        assert!(!session.user.is_admin);
        assert_eq!(session.landing(), Landing::Home);
        assert_eq!(
            repository.session_email().unwrap(),
            Some("ada@example.com".to_string())
        );
        // The stored hash is never the plaintext
        let stored = repository.find_by_email("ada@example.com").unwrap().unwrap();
        assert_ne!(stored.password_hash.as_deref(), Some("password123"));
    }

    #[test]
    fn test_signup_rejects_duplicate_email() {
        let (_dir, service, _repository) = service();

        service.signup("Ada", "ada@example.com", "password123").unwrap();
        let err = service
            .signup("Other", "ADA@example.com", "different1")
            .unwrap_err();

        assert!(matches!(err, Error::DuplicateAccount));
    }

    #[test]
    fn test_signup_validates_inputs() {
        let (_dir, service, _repository) = service();

        assert!(matches!(
            service.signup("", "a@b.com", "password123").unwrap_err(),
            Error::Validation(_)
        ));
        assert!(matches!(
            service.signup("Ada", "not-an-email", "password123").unwrap_err(),
            Error::Validation(_)
        ));
        assert!(matches!(
            service.signup("Ada", "a@b.com", "short").unwrap_err(),
            Error::Validation(_)
        ));
    }

    #[test]
    fn test_login_distinguishes_unknown_email_from_bad_password() {
        let (_dir, service, _repository) = service();
        service.signup("Ada", "ada@example.com", "password123").unwrap();

        let unknown = service.login("nobody@example.com", "password123").unwrap_err();
        assert!(matches!(unknown, Error::NotFound(_)));

        let wrong = service.login("ada@example.com", "wrongpassword").unwrap_err();
        assert!(matches!(wrong, Error::InvalidCredentials));
    }

    #[test]
    fn test_login_without_stored_hash_reports_no_password() {
        let (_dir, service, repository) = service();

        let record = UserRecord::new("Legacy", "legacy@example.com", None);
        repository.insert_user(&record).unwrap();

        let err = service.login("legacy@example.com", "whatever1").unwrap_err();
        assert!(matches!(err, Error::NoPasswordSet));
    }

    #[test]
    fn test_login_applies_weekly_topup_once() {
        let (_dir, service, repository) = service();
        service.signup("Ada", "ada@example.com", "password123").unwrap();

        // Age the account past two full windows
        let mut user = repository.find_by_email("ada@example.com").unwrap().unwrap();
        user.last_weekly_credit = Some(now_ms() - 2 * WEEKLY_TOPUP_INTERVAL_MS - 1000);
        repository.update_user(&user).unwrap();

        let session = service.login("ada@example.com", "password123").unwrap();
        assert!(session.granted_weekly_topup);
        assert_eq!(session.user.credits, SIGNUP_GRANT + WEEKLY_TOPUP);

        // Immediately activating again grants nothing more
        let restored = service.activate().unwrap().unwrap();
        assert!(!restored.granted_weekly_topup);
        assert_eq!(restored.user.credits, SIGNUP_GRANT + WEEKLY_TOPUP);
    }

    #[test]
    fn test_activate_restores_session_across_instances() {
        let (dir, service, _repository) = service();
        service.signup("Ada", "ada@example.com", "password123").unwrap();
        drop(service);
        drop(_repository);

        let store = LocalStore::open(dir.path()).unwrap();
        let repository = Arc::new(UserRepository::new(Arc::new(store)));
        let service = AccountService::new(repository);

        let session = service.activate().unwrap().unwrap();
        assert_eq!(session.user.email, "ada@example.com");
    }

    #[test]
    fn test_activate_clears_dangling_pointer() {
        let (_dir, service, repository) = service();
        service.signup("Ada", "ada@example.com", "password123").unwrap();
        repository.remove_user("ada@example.com").unwrap();

        assert!(service.activate().unwrap().is_none());
        assert_eq!(repository.session_email().unwrap(), None);
    }

    #[test]
    fn test_logout_clears_session_and_is_idempotent() {
        let (_dir, service, repository) = service();
        service.signup("Ada", "ada@example.com", "password123").unwrap();

        service.logout().unwrap();
        assert_eq!(repository.session_email().unwrap(), None);
        service.logout().unwrap();
    }

    #[test]
    fn test_admin_lands_on_admin_surface() {
        let (_dir, service, repository) = service();

        let mut record = UserRecord::new("Root", "root@example.com", None);
        record.password_hash = Some(password::hash_password("password123").unwrap());
        record.is_admin = true;
        repository.insert_user(&record).unwrap();

        let session = service.login("root@example.com", "password123").unwrap();
        assert_eq!(session.landing(), Landing::Admin);
        assert!(!session.granted_weekly_topup);
    }

    #[test]
    fn test_account_view_omits_hash() {
        let record = UserRecord::new("Ada", "ada@example.com", Some("$argon2$fake".into()));
        let view = AccountView::from_record(&record);
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"email\":\"ada@example.com\""));
    }
}
