use thiserror::Error;

use crate::display::Choice;
use crate::search::TorrentRecord;

/// Errors from interactive prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    /// The user aborted the prompt (Ctrl-C, Esc). Ends the session quietly.
    #[error("prompt cancelled")]
    Cancelled,

    #[error("prompt failed: {0}")]
    Io(String),
}

/// Asks the user questions.
///
/// Calls block until the user answers; the wizard only prompts while no
/// search or download is in flight.
pub trait Prompter: Send {
    /// Free text input.
    fn input(&mut self, message: &str) -> Result<String, PromptError>;

    /// Pick one of `options`; returns its index.
    fn select(&mut self, message: &str, options: &[String]) -> Result<usize, PromptError>;

    /// Pick a torrent from a formatted table. Separators are not selectable.
    fn select_record(
        &mut self,
        message: &str,
        choices: &[Choice],
    ) -> Result<TorrentRecord, PromptError>;

    /// Yes/no question.
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PromptError>;
}
