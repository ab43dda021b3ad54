//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod user;
pub mod password;
pub mod pricing;
pub mod result;

pub use pricing::{CreditPlan, GenerationKind, CREDIT_PLANS};
pub use user::{now_ms, HistoryItem, Theme, UserRecord};
