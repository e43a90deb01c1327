//! Terminal prompts backed by inquire.

use inquire::list_option::ListOption;
use inquire::{Confirm, InquireError, Select, Text};
use magnetize_core::{Choice, PromptError, Prompter, TableEntry, TorrentRecord};

/// Rows visible when the terminal height is unknown.
const DEFAULT_PAGE_SIZE: usize = 15;

/// Rows visible at once in selection lists: 70% of the terminal height.
fn page_size(terminal_rows: Option<u16>) -> usize {
    match terminal_rows {
        Some(rows) if rows > 0 => (usize::from(rows) * 7 / 10).max(1),
        _ => DEFAULT_PAGE_SIZE,
    }
}

fn terminal_rows() -> Option<u16> {
    terminal_size::terminal_size().map(|(_, terminal_size::Height(rows))| rows)
}

#[derive(Debug, Default)]
pub struct InquirePrompter;

impl InquirePrompter {
    pub fn new() -> Self {
        Self
    }
}

fn map_err(e: InquireError) -> PromptError {
    match e {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => {
            PromptError::Cancelled
        }
        other => PromptError::Io(other.to_string()),
    }
}

impl Prompter for InquirePrompter {
    fn input(&mut self, message: &str) -> Result<String, PromptError> {
        Text::new(message).prompt().map_err(map_err)
    }

    fn select(&mut self, message: &str, options: &[String]) -> Result<usize, PromptError> {
        Select::new(message, options.to_vec())
            .with_page_size(page_size(terminal_rows()))
            .raw_prompt()
            .map(|selected| selected.index)
            .map_err(map_err)
    }

    fn select_record(
        &mut self,
        message: &str,
        choices: &[Choice],
    ) -> Result<TorrentRecord, PromptError> {
        // Separators cannot be list items; they go under the question,
        // indented to line up with the option rows.
        let mut prompt = message.to_string();
        for choice in choices {
            if let Choice::Separator(line) = choice {
                prompt.push_str("\n  ");
                prompt.push_str(line);
            }
        }

        let entries: Vec<&TableEntry> = choices.iter().filter_map(Choice::as_entry).collect();
        let names: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();
        let formatter = |option: ListOption<&String>| {
            entries
                .get(option.index)
                .map(|e| e.short.clone())
                .unwrap_or_default()
        };

        let selected = Select::new(&prompt, names)
            .with_page_size(page_size(terminal_rows()))
            .with_formatter(&formatter)
            .raw_prompt()
            .map_err(map_err)?;

        entries
            .get(selected.index)
            .map(|e| e.record.clone())
            .ok_or_else(|| PromptError::Io(format!("no table row {}", selected.index)))
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PromptError> {
        Confirm::new(message)
            .with_default(default)
            .prompt()
            .map_err(map_err)
    }
}
