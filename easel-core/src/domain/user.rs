//! User record domain model

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::pricing;

/// Current time as epoch milliseconds (the unit every stored timestamp uses)
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// One generated artifact remembered on a user's record
///
/// Immutable once created; `image_url` is an artifact path or URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub prompt: String,
    pub image_url: String,
    pub timestamp: i64,
}

impl HistoryItem {
    pub fn new(prompt: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image_url: image_url.into(),
            timestamp: now_ms(),
        }
    }
}

/// UI theme preference, stored under its own key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{}' (expected light or dark)", other)),
        }
    }
}

/// A registered user
///
/// Serialized shape matches the product's stored JSON: camelCase keys,
/// optionals omitted when absent. `email` keeps the casing the user typed;
/// all matching goes through [`UserRecord::normalize_email`].
/// `created_at` and `last_weekly_credit` are optional because legacy and
/// provisioned records may lack them (see the admin sort contract).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub name: String,
    pub email: String,
    /// Argon2 PHC string; never the plaintext password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub credits: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_weekly_credit: Option<i64>,
    #[serde(default)]
    pub history: Vec<HistoryItem>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl UserRecord {
    /// Create a new record with the signup credit grant and empty history
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: Option<String>,
    ) -> Self {
        let now = now_ms();
        Self {
            name: name.into(),
            email: email.into(),
            password_hash,
            credits: pricing::SIGNUP_GRANT,
            last_weekly_credit: Some(now),
            history: Vec::new(),
            is_admin: false,
            created_at: Some(now),
        }
    }

    /// Normalize an email for matching: trimmed, lower-cased
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// This record's normalized email key
    pub fn email_key(&self) -> String {
        Self::normalize_email(&self.email)
    }

    /// Whether `email` identifies this record (case-insensitive)
    pub fn matches_email(&self, email: &str) -> bool {
        self.email_key() == Self::normalize_email(email)
    }

    /// Apply the weekly credit grant if a full window has elapsed
    ///
    /// Administrators are exempt. A record with no `last_weekly_credit`
    /// counts as overdue. At most one grant per call regardless of how many
    /// windows elapsed. Returns whether a grant was applied.
    pub fn apply_weekly_topup(&mut self, now: i64) -> bool {
        if self.is_admin {
            return false;
        }
        let last = self.last_weekly_credit.unwrap_or(0);
        if now - last > pricing::WEEKLY_TOPUP_INTERVAL_MS {
            self.credits += pricing::WEEKLY_TOPUP;
            self.last_weekly_credit = Some(now);
            true
        } else {
            false
        }
    }

    /// Prepend a history item (most recent first)
    pub fn prepend_history(&mut self, item: HistoryItem) {
        self.history.insert(0, item);
    }

    /// Validate a signup/profile display name
    pub fn validate_name(name: &str) -> Result<(), &'static str> {
        if name.trim().is_empty() {
            return Err("Name cannot be empty.");
        }
        Ok(())
    }

    /// Validate an email address shape
    pub fn validate_email(email: &str) -> Result<(), &'static str> {
        let email_re = Regex::new(r"^\S+@\S+\.\S+$").unwrap();
        if !email_re.is_match(email.trim()) {
            return Err("Please enter a valid email address.");
        }
        Ok(())
    }

    /// Validate a new password
    pub fn validate_password(password: &str) -> Result<(), &'static str> {
        if password.len() < 8 {
            return Err("Password must be at least 8 characters long.");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_gets_signup_grant() {
        let user = UserRecord::new("Ada", "ada@example.com", None);
        assert_eq!(user.credits, pricing::SIGNUP_GRANT);
        assert!(user.history.is_empty());
        assert!(!user.is_admin);
        assert!(user.created_at.is_some());
        assert_eq!(user.created_at, user.last_weekly_credit);
    }

    #[test]
    fn test_email_normalization() {
        assert_eq!(
            UserRecord::normalize_email("  Ada@Example.COM "),
            "ada@example.com"
        );
        let user = UserRecord::new("Ada", "Ada@Example.com", None);
        assert!(user.matches_email("ada@EXAMPLE.com"));
        assert!(!user.matches_email("someone@example.com"));
    }

    #[test]
    fn test_weekly_topup_after_window() {
        let mut user = UserRecord::new("Ada", "ada@example.com", None);
        let start = user.credits;
        let now = now_ms();
        user.last_weekly_credit = Some(now - pricing::WEEKLY_TOPUP_INTERVAL_MS - 1);

        assert!(user.apply_weekly_topup(now));
        assert_eq!(user.credits, start + pricing::WEEKLY_TOPUP);
        assert_eq!(user.last_weekly_credit, Some(now));
    }

    #[test]
    fn test_weekly_topup_within_window() {
        let mut user = UserRecord::new("Ada", "ada@example.com", None);
        let start = user.credits;

        assert!(!user.apply_weekly_topup(now_ms()));
        assert_eq!(user.credits, start);
    }

    #[test]
    fn test_weekly_topup_missing_timestamp_counts_as_overdue() {
        let mut user = UserRecord::new("Ada", "ada@example.com", None);
        user.last_weekly_credit = None;
        assert!(user.apply_weekly_topup(now_ms()));
    }

    #[test]
    fn test_weekly_topup_skips_admin() {
        let mut user = UserRecord::new("Admin", "admin@example.com", None);
        user.is_admin = true;
        user.credits = pricing::ADMIN_CREDITS;
        user.last_weekly_credit = Some(0);

        assert!(!user.apply_weekly_topup(now_ms()));
        assert_eq!(user.credits, pricing::ADMIN_CREDITS);
    }

    #[test]
    fn test_topup_grants_once_even_when_many_windows_elapsed() {
        let mut user = UserRecord::new("Ada", "ada@example.com", None);
        let start = user.credits;
        let now = now_ms();
        user.last_weekly_credit = Some(now - 10 * pricing::WEEKLY_TOPUP_INTERVAL_MS);

        user.apply_weekly_topup(now);
        assert_eq!(user.credits, start + pricing::WEEKLY_TOPUP);
    }

    #[test]
    fn test_history_is_prepend_only() {
        let mut user = UserRecord::new("Ada", "ada@example.com", None);
        user.prepend_history(HistoryItem::new("A", "a.jpg"));
        user.prepend_history(HistoryItem::new("B", "b.jpg"));

        assert_eq!(user.history[0].prompt, "B");
        assert_eq!(user.history[1].prompt, "A");
    }

    #[test]
    fn test_validation_rules() {
        assert!(UserRecord::validate_name("Ada").is_ok());
        assert!(UserRecord::validate_name("   ").is_err());

        assert!(UserRecord::validate_email("ada@example.com").is_ok());
        assert!(UserRecord::validate_email("not-an-email").is_err());
        assert!(UserRecord::validate_email("a b@example.com").is_err());

        assert!(UserRecord::validate_password("longenough").is_ok());
        assert!(UserRecord::validate_password("short").is_err());
    }

    #[test]
    fn test_serialized_shape_uses_camel_case() {
        let user = UserRecord::new("Ada", "ada@example.com", None);
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("lastWeeklyCredit").is_some());
        // no password set, so the key is omitted entirely
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let mut user = UserRecord::new("Ada", "ada@example.com", Some("$argon2id$stub".into()));
        user.prepend_history(HistoryItem::new("sunset", "artifacts/sunset.jpg"));

        let json = serde_json::to_string(&user).unwrap();
        let back: UserRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn test_partial_record_deserializes_with_defaults() {
        // the shape a legacy/provisioned record may have on disk
        let json = r#"{"name":"Admin","email":"admin@example.com","credits":9999,"isAdmin":true}"#;
        let user: UserRecord = serde_json::from_str(json).unwrap();
        assert!(user.is_admin);
        assert!(user.history.is_empty());
        assert!(user.created_at.is_none());
        assert!(user.password_hash.is_none());
    }
}
