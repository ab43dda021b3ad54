//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod account;
mod admin;
mod artifacts;
mod chat;
mod credit;
pub mod logging;
mod profile;
mod studio;

pub use account::{AccountService, AccountView, ActiveSession, Landing};
pub use admin::{AdminService, DashboardTotals, SortKey};
pub use artifacts::{ArtifactKind, ArtifactStore};
pub use chat::{ChatReply, ChatService, ChatSession};
pub use credit::{BalanceSummary, CreditService};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use profile::ProfileService;
pub use studio::{AnimationOutcome, GenerationOutcome, StudioService};
