//! Testing utilities and mock implementations for session tests.
//!
//! This module provides mock implementations of the provider, prompt, and
//! launcher seams, allowing full wizard runs without a terminal, a Jackett
//! server, or a desktop.
//!
//! # Example
//!
//! ```rust,ignore
//! use magnetize_core::testing::{fixtures, Answer, MockProviderClient, ScriptedPrompter};
//!
//! let client = MockProviderClient::new();
//! client.set_results("1337x", vec![fixtures::raw("Ubuntu 24.04", Some(120))]);
//!
//! let prompter = ScriptedPrompter::new([
//!     Answer::Input("ubuntu".into()),
//!     Answer::Select(0),
//!     Answer::Pick(0),
//! ]);
//!
//! // Build a Wizard with the mocks...
//! ```

mod mock_provider;

pub use mock_provider::{MockProviderClient, RecordedCall};

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::display::Choice;
use crate::search::TorrentRecord;
use crate::wizard::{LaunchError, Launcher, PromptError, Prompter};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// A scripted answer to the next prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Text for an input prompt.
    Input(String),
    /// Option index for a select prompt.
    Select(usize),
    /// Index of the table entry to pick (separators not counted).
    Pick(usize),
    Confirm(bool),
    /// Abort the prompt as if the user hit Ctrl-C.
    Cancel,
}

/// A prompt the wizard showed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskedPrompt {
    pub message: String,
    /// Select options or rendered table rows; empty for input and confirm.
    pub options: Vec<String>,
}

#[derive(Default)]
struct PrompterState {
    answers: VecDeque<Answer>,
    asked: Vec<AskedPrompt>,
}

/// Answers prompts from a fixed script.
///
/// Clones share the script, so a test can keep a handle after moving one
/// into the wizard. Running out of answers cancels the prompt; an answer
/// of the wrong kind fails it.
#[derive(Clone, Default)]
pub struct ScriptedPrompter {
    state: Arc<Mutex<PrompterState>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            state: Arc::new(Mutex::new(PrompterState {
                answers: answers.into_iter().collect(),
                asked: Vec::new(),
            })),
        }
    }

    /// Every prompt shown, in order.
    pub fn asked(&self) -> Vec<AskedPrompt> {
        lock(&self.state).asked.clone()
    }

    /// Messages of every prompt shown, in order.
    pub fn messages(&self) -> Vec<String> {
        lock(&self.state)
            .asked
            .iter()
            .map(|p| p.message.clone())
            .collect()
    }

    /// Answers not consumed yet.
    pub fn remaining(&self) -> usize {
        lock(&self.state).answers.len()
    }

    fn next(&self, message: &str, options: Vec<String>) -> Result<Answer, PromptError> {
        let mut state = lock(&self.state);
        state.asked.push(AskedPrompt {
            message: message.to_string(),
            options,
        });
        match state.answers.pop_front() {
            None | Some(Answer::Cancel) => Err(PromptError::Cancelled),
            Some(answer) => Ok(answer),
        }
    }
}

fn unexpected(message: &str, answer: Answer) -> PromptError {
    PromptError::Io(format!("unexpected answer {:?} to \"{}\"", answer, message))
}

impl Prompter for ScriptedPrompter {
    fn input(&mut self, message: &str) -> Result<String, PromptError> {
        match self.next(message, Vec::new())? {
            Answer::Input(text) => Ok(text),
            other => Err(unexpected(message, other)),
        }
    }

    fn select(&mut self, message: &str, options: &[String]) -> Result<usize, PromptError> {
        match self.next(message, options.to_vec())? {
            Answer::Select(index) if index < options.len() => Ok(index),
            other => Err(unexpected(message, other)),
        }
    }

    fn select_record(
        &mut self,
        message: &str,
        choices: &[Choice],
    ) -> Result<TorrentRecord, PromptError> {
        let rows = choices
            .iter()
            .map(|choice| match choice {
                Choice::Separator(line) => line.clone(),
                Choice::Entry(entry) => entry.name.clone(),
            })
            .collect();

        match self.next(message, rows)? {
            Answer::Pick(index) => choices
                .iter()
                .filter_map(Choice::as_entry)
                .nth(index)
                .map(|entry| entry.record.clone())
                .ok_or_else(|| PromptError::Io(format!("no table entry {}", index))),
            other => Err(unexpected(message, other)),
        }
    }

    fn confirm(&mut self, message: &str, _default: bool) -> Result<bool, PromptError> {
        match self.next(message, Vec::new())? {
            Answer::Confirm(yes) => Ok(yes),
            other => Err(unexpected(message, other)),
        }
    }
}

#[derive(Default)]
struct LauncherState {
    copied: Vec<String>,
    opened: Vec<(String, Option<String>)>,
    clipboard_failure: Option<String>,
    open_failure: Option<String>,
}

/// Records magnet deliveries instead of touching the desktop.
#[derive(Clone, Default)]
pub struct RecordingLauncher {
    state: Arc<Mutex<LauncherState>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every clipboard copy fail.
    pub fn fail_clipboard(&self, error: &str) {
        lock(&self.state).clipboard_failure = Some(error.to_string());
    }

    /// Make every open fail.
    pub fn fail_open(&self, error: &str) {
        lock(&self.state).open_failure = Some(error.to_string());
    }

    /// Texts copied to the clipboard.
    pub fn copied(&self) -> Vec<String> {
        lock(&self.state).copied.clone()
    }

    /// (uri, app) pairs opened.
    pub fn opened(&self) -> Vec<(String, Option<String>)> {
        lock(&self.state).opened.clone()
    }
}

impl Launcher for RecordingLauncher {
    fn copy_to_clipboard(&self, text: &str) -> Result<(), LaunchError> {
        let mut state = lock(&self.state);
        if let Some(error) = &state.clipboard_failure {
            return Err(LaunchError::Clipboard(error.clone()));
        }
        state.copied.push(text.to_string());
        Ok(())
    }

    fn open(&self, uri: &str, app: Option<&str>) -> Result<(), LaunchError> {
        let mut state = lock(&self.state);
        if let Some(error) = &state.open_failure {
            return Err(LaunchError::Open(error.clone()));
        }
        state
            .opened
            .push((uri.to_string(), app.map(str::to_string)));
        Ok(())
    }
}

/// In-memory writer whose clones share one buffer.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&lock(&self.bytes)).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.bytes).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::provider::{ProviderId, RawRecord};
    use crate::search::{MagnetRef, TorrentRecord};

    /// Create a normalized record with only title, provider, and seeds set.
    pub fn record(title: &str, provider: &str, seeds: Option<u64>) -> TorrentRecord {
        TorrentRecord {
            title: title.to_string(),
            size_text: None,
            seeds,
            peers: None,
            uploaded_at: None,
            provider: ProviderId::from(provider),
            magnet_ref: MagnetRef::default(),
            description: None,
            detail_link: None,
        }
    }

    /// Create a raw provider record with a magnet derived from the title.
    pub fn raw(title: &str, seeds: Option<i64>) -> RawRecord {
        RawRecord {
            title: title.to_string(),
            seeds,
            magnet_uri: Some(format!(
                "magnet:?xt=urn:btih:{}",
                title.to_lowercase().replace(' ', "-")
            )),
            ..Default::default()
        }
    }

    /// A raw record with every optional field filled in.
    pub fn full_raw(title: &str, seeds: i64, peers: i64) -> RawRecord {
        RawRecord {
            size: Some("1.4 GiB".to_string()),
            peers: Some(peers),
            time: Some("2024-03-01T12:00:00Z".to_string()),
            description: Some(format!("{} release notes", title)),
            details_url: Some(format!(
                "https://example.org/t/{}",
                title.to_lowercase().replace(' ', "-")
            )),
            ..raw(title, Some(seeds))
        }
    }
}
