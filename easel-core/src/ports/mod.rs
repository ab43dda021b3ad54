//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod generator;
mod store;

pub use generator::{Artifact, AspectRatio, ChatRole, ChatTurn, MediaGenerator};
pub use store::KeyValueStore;
