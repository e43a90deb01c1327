//! Provider capability.
//!
//! This module provides the `ProviderClient` trait used by the search
//! orchestrator, plus a Jackett-backed implementation where every provider
//! id is a Jackett indexer.

mod jackett;
mod types;

pub use jackett::JackettProvider;
pub use types::*;
