//! Interactive torrent search session.

mod launcher;
mod prompt;
mod session;

pub use launcher::{LaunchError, Launcher};
pub use prompt::{PromptError, Prompter};
pub use session::{search_summary, Wizard, WizardState, ALL_PROVIDERS};

use thiserror::Error;

use crate::search::SearchError;

#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
