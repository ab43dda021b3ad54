//! Admin service - account administration for operator accounts
//!
//! Every operation except provisioning requires the signed-in account to be
//! an administrator. Listings exclude administrator accounts.

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::password;
use crate::domain::pricing::ADMIN_CREDITS;
use crate::domain::result::{Error, Result};
use crate::domain::UserRecord;
use crate::repository::UserRepository;

/// Column the member listing is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Name,
    Email,
    Credits,
    #[default]
    CreatedAt,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Email => "email",
            SortKey::Credits => "credits",
            SortKey::CreatedAt => "created",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "email" => Ok(SortKey::Email),
            "credits" => Ok(SortKey::Credits),
            "created" | "created-at" | "createdat" => Ok(SortKey::CreatedAt),
            other => Err(format!(
                "unknown sort key '{}' (expected name, email, credits or created)",
                other
            )),
        }
    }
}

/// Aggregates shown on the admin dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    /// Every registered account, administrators included
    pub total_accounts: usize,
    /// Credits held across member accounts; the administrator sentinel
    /// balance is not counted
    pub credits_outstanding: i64,
}

/// Service for administrator operations on the user collection
pub struct AdminService {
    repository: Arc<UserRepository>,
}

impl AdminService {
    pub fn new(repository: Arc<UserRepository>) -> Self {
        Self { repository }
    }

    fn require_admin(&self) -> Result<UserRecord> {
        let user = self
            .repository
            .current_user()?
            .ok_or_else(|| Error::not_found("You are not signed in."))?;
        if !user.is_admin {
            return Err(Error::other("Administrator access is required."));
        }
        Ok(user)
    }

    /// Members sorted by `sort`, administrators excluded
    ///
    /// Records with no creation timestamp sort last in either direction.
    pub fn list_members(&self, sort: SortKey, descending: bool) -> Result<Vec<UserRecord>> {
        self.require_admin()?;

        let mut members: Vec<UserRecord> = self
            .repository
            .list_users()?
            .into_iter()
            .filter(|u| !u.is_admin)
            .collect();
        members.sort_by(|a, b| compare_members(a, b, sort, descending));
        Ok(members)
    }

    /// Add credits to a member's balance
    pub fn grant(&self, email: &str, amount: i64) -> Result<UserRecord> {
        self.adjust_member(email, amount, |credits, amount| credits + amount)
    }

    /// Remove credits from a member's balance, clamping at zero
    pub fn revoke(&self, email: &str, amount: i64) -> Result<UserRecord> {
        self.adjust_member(email, amount, |credits, amount| (credits - amount).max(0))
    }

    fn adjust_member(
        &self,
        email: &str,
        amount: i64,
        apply: impl Fn(i64, i64) -> i64,
    ) -> Result<UserRecord> {
        self.require_admin()?;

        if amount <= 0 {
            return Err(Error::validation(
                "Amount must be a positive number of credits.",
            ));
        }

        let mut target = self.require_member(email)?;
        target.credits = apply(target.credits, amount);
        self.repository.update_user(&target)?;

        // Hand back the stored record, not the local copy
        self.require_member(email)
    }

    /// Permanently delete a member account
    pub fn delete_member(&self, email: &str) -> Result<()> {
        self.require_admin()?;
        self.require_member(email)?;
        self.repository.remove_user(email)
    }

    /// Dashboard aggregates over the whole collection
    pub fn totals(&self) -> Result<DashboardTotals> {
        self.require_admin()?;

        let users = self.repository.list_users()?;
        Ok(DashboardTotals {
            total_accounts: users.len(),
            credits_outstanding: users
                .iter()
                .filter(|u| !u.is_admin)
                .map(|u| u.credits)
                .sum(),
        })
    }

    /// Create or promote an administrator account
    ///
    /// This is the bootstrap path, so it does not require a signed-in
    /// administrator. An existing account with the email is promoted in
    /// place; either way the account ends up with the administrator
    /// balance and the given password.
    pub fn provision_admin(&self, name: &str, email: &str, password: &str) -> Result<UserRecord> {
        UserRecord::validate_name(name).map_err(Error::validation)?;
        UserRecord::validate_email(email).map_err(Error::validation)?;
        UserRecord::validate_password(password).map_err(Error::validation)?;

        let hash = password::hash_password(password)?;

        match self.repository.find_by_email(email)? {
            Some(mut existing) => {
                existing.name = name.trim().to_string();
                existing.password_hash = Some(hash);
                existing.is_admin = true;
                existing.credits = ADMIN_CREDITS;
                self.repository.update_user(&existing)?;
                Ok(existing)
            }
            None => {
                let mut record = UserRecord::new(
                    name.trim(),
                    UserRecord::normalize_email(email),
                    Some(hash),
                );
                record.is_admin = true;
                record.credits = ADMIN_CREDITS;
                self.repository.insert_user(&record)?;
                Ok(record)
            }
        }
    }

    fn require_member(&self, email: &str) -> Result<UserRecord> {
        let target = self
            .repository
            .find_by_email(email)?
            .ok_or_else(|| {
                Error::not_found(format!(
                    "No account found for {}.",
                    UserRecord::normalize_email(email)
                ))
            })?;
        if target.is_admin {
            return Err(Error::validation(
                "Administrator accounts cannot be managed here.",
            ));
        }
        Ok(target)
    }
}

fn compare_members(a: &UserRecord, b: &UserRecord, sort: SortKey, descending: bool) -> Ordering {
    let directional = |ordering: Ordering| {
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    };

    match sort {
        SortKey::Name => directional(a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        SortKey::Email => directional(a.email_key().cmp(&b.email_key())),
        SortKey::Credits => directional(a.credits.cmp(&b.credits)),
        // Unknown creation times sort last in both directions
        SortKey::CreatedAt => match (a.created_at, b.created_at) {
            (Some(x), Some(y)) => directional(x.cmp(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}
