//! Search orchestration.
//!
//! Normalizes raw provider records, drives providers sequentially (with
//! fallback) or concurrently (with merge), and ranks the combined results.

mod aggregator;
mod normalizer;
mod orchestrator;
mod types;

pub use aggregator::merge_results;
pub use normalizer::{normalize_all, normalize_record};
pub use orchestrator::{FallbackChain, SearchOrchestrator};
pub use types::*;
