//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - Local filesystem for the KeyValueStore port
//! - Gemini HTTP client for MediaGenerator
//! - Demo generator for offline use and testing

pub mod demo;
pub mod gemini;
pub mod local;
