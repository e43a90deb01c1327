//! Interruptible progress indication for long-running async phases.

mod reporter;

pub use reporter::{simulated_percent, ProgressHandle, ProgressReporter};
