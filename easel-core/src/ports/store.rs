//! Persistent key-value store port
//!
//! The sole durability mechanism for user state. Keys are short stable
//! identifiers ("allUsers", "session", "theme"); values are strings,
//! normally serialized JSON. Serialization belongs to the caller.

use crate::domain::result::Result;

/// Key-value store trait
///
/// Each call is independently durable; there are no cross-key transactions.
/// Implementations must surface I/O failures instead of swallowing them -
/// callers decide whether to degrade (e.g. the admin listing treats an
/// unreadable collection as empty).
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if the key is absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Durably write `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}
