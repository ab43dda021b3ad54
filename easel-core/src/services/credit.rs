//! Credit service - balance, adjustments and the generation history
//!
//! Credits are a field on the account record, so every operation here is a
//! read-mutate-write against the user collection keyed by the session
//! pointer.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::pricing::{CreditPlan, CREDIT_PLANS};
use crate::domain::result::{Error, Result};
use crate::domain::{HistoryItem, UserRecord};
use crate::repository::UserRepository;

/// Snapshot of the signed-in account's credit state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSummary {
    pub credits: i64,
    pub is_admin: bool,
}

/// Service for the signed-in account's credits and history
pub struct CreditService {
    repository: Arc<UserRepository>,
}

impl CreditService {
    pub fn new(repository: Arc<UserRepository>) -> Self {
        Self { repository }
    }

    fn require_current(&self) -> Result<UserRecord> {
        self.repository
            .current_user()?
            .ok_or_else(|| Error::not_found("You are not signed in."))
    }

    /// Current balance of the signed-in account
    pub fn balance(&self) -> Result<BalanceSummary> {
        let user = self.require_current()?;
        Ok(BalanceSummary {
            credits: user.credits,
            is_admin: user.is_admin,
        })
    }

    /// Apply a signed delta to the balance and return the new balance
    ///
    /// Callers are expected to have checked affordability; this does not
    /// clamp, so a refund can always restore what a debit took.
    pub fn adjust(&self, delta: i64) -> Result<i64> {
        let mut user = self.require_current()?;
        user.credits += delta;
        self.repository.update_user(&user)?;
        Ok(user.credits)
    }

    /// Prepend an item to the signed-in account's generation history
    pub fn append_history(&self, item: HistoryItem) -> Result<()> {
        let mut user = self.require_current()?;
        user.prepend_history(item);
        self.repository.update_user(&user)
    }

    /// Generation history, most recent first
    pub fn history(&self, limit: Option<usize>) -> Result<Vec<HistoryItem>> {
        let user = self.require_current()?;
        let mut items = user.history;
        if let Some(limit) = limit {
            items.truncate(limit);
        }
        Ok(items)
    }

    /// The purchasable credit plans
    pub fn plans(&self) -> &'static [CreditPlan] {
        &CREDIT_PLANS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::local::LocalStore;
    use crate::domain::pricing::SIGNUP_GRANT;
    use crate::services::account::AccountService;
    use tempfile::TempDir;

    fn signed_in() -> (TempDir, CreditService, Arc<UserRepository>) {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        let repository = Arc::new(UserRepository::new(Arc::new(store)));
        AccountService::new(repository.clone())
            .signup("Ada", "ada@example.com", "password123")
            .unwrap();
        (dir, CreditService::new(repository.clone()), repository)
    }

    #[test]
    fn test_balance_reflects_signup_grant() {
        let (_dir, credits, _repository) = signed_in();
        let summary = credits.balance().unwrap();
        assert_eq!(summary.credits, SIGNUP_GRANT);
        assert!(!summary.is_admin);
    }

    #[test]
    fn test_adjust_debit_then_refund_restores_balance() {
        let (_dir, credits, _repository) = signed_in();

        assert_eq!(credits.adjust(-10).unwrap(), SIGNUP_GRANT - 10);
        assert_eq!(credits.adjust(10).unwrap(), SIGNUP_GRANT);
    }

    #[test]
    fn test_adjust_persists() {
        let (_dir, credits, repository) = signed_in();

        credits.adjust(-5).unwrap();
        let stored = repository.find_by_email("ada@example.com").unwrap().unwrap();
        assert_eq!(stored.credits, SIGNUP_GRANT - 5);
    }

    #[test]
    fn test_history_is_most_recent_first() {
        let (_dir, credits, _repository) = signed_in();

        credits
            .append_history(HistoryItem::new("first", "/tmp/a.jpg"))
            .unwrap();
        credits
            .append_history(HistoryItem::new("second", "/tmp/b.jpg"))
            .unwrap();

        let items = credits.history(None).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].prompt, "second");
        assert_eq!(items[1].prompt, "first");

        let limited = credits.history(Some(1)).unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].prompt, "second");
    }

    #[test]
    fn test_plans_are_listed() {
        let (_dir, credits, _repository) = signed_in();
        let plans = credits.plans();
        assert_eq!(plans.len(), 3);
        assert!(plans[0].credits < plans[2].credits);
    }

    #[test]
    fn test_requires_session() {
        let (_dir, credits, repository) = signed_in();
        repository.clear_session().unwrap();
        assert!(matches!(credits.balance().unwrap_err(), Error::NotFound(_)));
    }
}
