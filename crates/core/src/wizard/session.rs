//! The interactive search session.
//!
//! One session is a loop over [`WizardState`]: search, pick a row, look at
//! the details, fetch the magnet link and hand it to the desktop, then
//! decide whether to go again. Cancelling any prompt ends the session.

use std::fmt;
use std::io::{self, Write};
use std::slice;
use std::time::Duration;

use colored::Colorize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::display::{render_details, TableFormatter};
use crate::progress::{ProgressHandle, ProgressReporter};
use crate::provider::ProviderId;
use crate::search::{
    SearchError, SearchMode, SearchOrchestrator, SearchOutcome, SearchRequest, TorrentRecord,
};

use super::launcher::Launcher;
use super::prompt::{PromptError, Prompter};
use super::WizardError;

/// Label of the extra provider prompt option that searches everywhere.
pub const ALL_PROVIDERS: &str = "All Providers";

const DETAIL_ACTIONS: [&str; 3] = ["Download/Open Magnet", "Back to Search", "Exit"];
const OPEN_STEP_PAUSE: Duration = Duration::from_millis(30);

/// Where the session is.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardState {
    /// Run a search; `None` asks for a fresh query.
    Searching { query: Option<String> },
    /// Pick a row from the results of `query`.
    Reviewing {
        query: String,
        records: Vec<TorrentRecord>,
    },
    /// Show details and ask what to do with `record`.
    Confirming { query: String, record: TorrentRecord },
    /// Resolve and deliver the magnet link.
    Downloading { record: TorrentRecord },
    /// Ask whether to search again.
    Continuing,
    Done,
}

impl fmt::Display for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardState::Searching { .. } => "searching",
            WizardState::Reviewing { .. } => "reviewing",
            WizardState::Confirming { .. } => "confirming",
            WizardState::Downloading { .. } => "downloading",
            WizardState::Continuing => "continuing",
            WizardState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Drives one interactive session.
pub struct Wizard<P, L>
where
    P: Prompter,
    L: Launcher,
{
    config: Config,
    orchestrator: SearchOrchestrator,
    reporter: ProgressReporter,
    formatter: TableFormatter,
    prompter: P,
    launcher: L,
    out: Box<dyn Write + Send>,
    provider: Option<ProviderId>,
}

impl<P, L> Wizard<P, L>
where
    P: Prompter,
    L: Launcher,
{
    /// Create a wizard writing to stdout with progress on stderr.
    pub fn new(config: Config, orchestrator: SearchOrchestrator, prompter: P, launcher: L) -> Self {
        let reporter = ProgressReporter::stderr(&config.progress);
        let formatter = TableFormatter::new(&config.display);

        Self {
            config,
            orchestrator,
            reporter,
            formatter,
            prompter,
            launcher,
            out: Box::new(io::stdout()),
            provider: None,
        }
    }

    /// Start every fallback search at `provider` instead of prompting.
    pub fn with_provider(mut self, provider: Option<ProviderId>) -> Result<Self, WizardError> {
        if let Some(provider) = &provider {
            if !self.orchestrator.providers().contains(provider) {
                return Err(SearchError::UnknownProvider(provider.to_string()).into());
            }
        }
        self.provider = provider;
        Ok(self)
    }

    pub fn with_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_formatter(mut self, formatter: TableFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Send status lines and details to `out`.
    pub fn with_output(mut self, out: impl Write + Send + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    /// Run until the user is done. A cancelled prompt is a normal exit.
    pub async fn run(&mut self, query: Option<String>) -> Result<(), WizardError> {
        let mut state = WizardState::Searching { query };
        info!(
            providers = self.orchestrator.providers().len(),
            search_all = self.config.search.search_all,
            "Starting session"
        );

        loop {
            debug!(state = %state, "Wizard step");
            state = match self.step(state).await {
                Ok(WizardState::Done) => break,
                Ok(next) => next,
                Err(WizardError::Prompt(PromptError::Cancelled)) => {
                    info!("Session cancelled");
                    break;
                }
                Err(e) => return Err(e),
            };
        }

        Ok(())
    }

    /// Perform one transition.
    pub async fn step(&mut self, state: WizardState) -> Result<WizardState, WizardError> {
        match state {
            WizardState::Searching { query } => self.searching(query).await,
            WizardState::Reviewing { query, records } => self.reviewing(query, records),
            WizardState::Confirming { query, record } => self.confirming(query, record),
            WizardState::Downloading { record } => self.downloading(record).await,
            WizardState::Continuing => self.continuing(),
            WizardState::Done => Ok(WizardState::Done),
        }
    }

    async fn searching(&mut self, query: Option<String>) -> Result<WizardState, WizardError> {
        let query = match query.filter(|q| !q.trim().is_empty()) {
            Some(query) => query,
            None => self.prompter.input("What do you want to download?")?,
        };
        if query.trim().is_empty() {
            return Ok(WizardState::Searching { query: None });
        }

        let search = &self.config.search;
        let request = SearchRequest::new(query.trim(), search.category, search.rows, search.truncate)?;
        let mode = self.choose_mode()?;

        let mut outcome = self.run_search(&request, &mode).await?;
        // A retry only helps when some provider failed or timed out.
        if outcome.is_empty()
            && !mode.is_all_providers()
            && !outcome.settled_empty_on(self.orchestrator.providers())
            && self.prompter.confirm("Search across all providers?", true)?
        {
            outcome = self.run_search(&request, &SearchMode::AllProviders).await?;
        }

        if outcome.is_empty() {
            let line = format!(
                "No torrents found for \"{}\", try another query.",
                request.query()
            );
            writeln!(self.out, "{}", line.yellow())?;
            return Ok(WizardState::Searching { query: None });
        }

        Ok(WizardState::Reviewing {
            query: request.query().to_string(),
            records: outcome.records,
        })
    }

    fn choose_mode(&mut self) -> Result<SearchMode, PromptError> {
        if self.config.search.search_all {
            return Ok(SearchMode::AllProviders);
        }
        if let Some(provider) = &self.provider {
            return Ok(SearchMode::Fallback {
                start: Some(provider.clone()),
            });
        }

        let providers = self.orchestrator.providers();
        let mut options: Vec<String> = providers.iter().map(|p| p.to_string()).collect();
        options.push(ALL_PROVIDERS.to_string());

        let index = self
            .prompter
            .select("Which torrent provider would you like to use?", &options)?;
        Ok(match providers.as_slice().get(index) {
            Some(provider) => SearchMode::Fallback {
                start: Some(provider.clone()),
            },
            None => SearchMode::AllProviders,
        })
    }

    async fn run_search(
        &mut self,
        request: &SearchRequest,
        mode: &SearchMode,
    ) -> Result<SearchOutcome, WizardError> {
        if !self.reporter.is_interactive() {
            let line = format!("Searching for \"{}\"...", request.query());
            writeln!(self.out, "{}", line.blue())?;
        }

        let (outcome, handle) = self
            .reporter
            .track("Searching", self.orchestrator.search(request, mode))
            .await;
        let outcome = outcome?;

        let summary = search_summary(&outcome, mode);
        let line = if outcome.is_empty() {
            summary.yellow()
        } else {
            summary.green()
        };
        self.finish(handle, &line.to_string())?;
        Ok(outcome)
    }

    fn reviewing(
        &mut self,
        query: String,
        records: Vec<TorrentRecord>,
    ) -> Result<WizardState, WizardError> {
        let choices = self.formatter.format(&records, self.config.search.truncate);
        let record = self
            .prompter
            .select_record("Which torrent would you like to view?", &choices)?;
        debug!(title = %record.title, provider = %record.provider, "Torrent selected");

        if self.config.display.show_details {
            Ok(WizardState::Confirming { query, record })
        } else {
            Ok(WizardState::Downloading { record })
        }
    }

    fn confirming(&mut self, query: String, record: TorrentRecord) -> Result<WizardState, WizardError> {
        writeln!(self.out, "{}", render_details(&record))?;

        let options: Vec<String> = DETAIL_ACTIONS.iter().map(|s| s.to_string()).collect();
        Ok(match self.prompter.select("What would you like to do?", &options)? {
            0 => WizardState::Downloading { record },
            1 => WizardState::Searching { query: Some(query) },
            _ => WizardState::Done,
        })
    }

    async fn downloading(&mut self, record: TorrentRecord) -> Result<WizardState, WizardError> {
        if !self.reporter.is_interactive() {
            writeln!(self.out, "{}", "Getting magnet link...".blue())?;
        }

        let client = self.orchestrator.client().clone();
        let active = client.activate(slice::from_ref(&record.provider));
        let (resolved, handle) = self
            .reporter
            .track("Getting magnet link", client.resolve_magnet(&active, &record))
            .await;

        let magnet = match resolved {
            Ok(magnet) => {
                let line = "✓ Magnet link retrieved successfully".green().to_string();
                self.finish(handle, &line)?;
                magnet
            }
            Err(e) => {
                warn!(
                    provider = %record.provider,
                    title = %record.title,
                    error = %e,
                    "Magnet resolution failed"
                );
                let line = "Unable to get magnet for torrent.".red().to_string();
                self.finish(handle, &line)?;
                return Ok(WizardState::Continuing);
            }
        };

        self.deliver(&record, &magnet).await?;
        Ok(WizardState::Continuing)
    }

    async fn deliver(&mut self, record: &TorrentRecord, magnet: &str) -> io::Result<()> {
        let output = self.config.output.clone();

        if output.clipboard {
            match self.launcher.copy_to_clipboard(magnet) {
                Ok(()) => {
                    let line = format!("Magnet link for \"{}\" copied to clipboard.", record.title);
                    writeln!(self.out, "{}", line.green())?;
                }
                Err(e) => {
                    warn!(error = %e, "Clipboard copy failed");
                    let line = format!("Unable to copy magnet link: {}", e);
                    writeln!(self.out, "{}", line.red())?;
                }
            }
        }

        let app = output.open_app.as_deref();
        if app.is_none() && !output.open_default {
            if !output.clipboard {
                writeln!(self.out, "{}", magnet)?;
            }
            return Ok(());
        }

        let mut handle = self.reporter.begin(100, "Opening torrent");
        self.reporter
            .animate(&mut handle, 90, 10, OPEN_STEP_PAUSE)
            .await;

        let line = match self.launcher.open(magnet, app) {
            Ok(()) => {
                handle.update(100);
                info!(app = app.unwrap_or("default"), "Magnet opened");
                match app {
                    Some(app) => format!("✓ Opened in {}", app).green(),
                    None => "✓ Opened in default application".green(),
                }
            }
            Err(e) => {
                warn!(error = %e, "Opening magnet failed");
                format!("Unable to open torrent: {}", e).red()
            }
        };
        self.finish(handle, &line.to_string())
    }

    fn continuing(&mut self) -> Result<WizardState, WizardError> {
        let options = vec!["Yes".to_string(), "No".to_string()];
        Ok(match self.prompter.select("Find another torrent?", &options)? {
            0 => WizardState::Searching { query: None },
            _ => WizardState::Done,
        })
    }

    /// Replace the bar with `line`, or print it when no bar was drawn.
    fn finish(&mut self, handle: ProgressHandle, line: &str) -> io::Result<()> {
        if !handle.stop(line) {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }
}

/// One-line summary of a finished search, without styling.
pub fn search_summary(outcome: &SearchOutcome, mode: &SearchMode) -> String {
    let all = mode.is_all_providers();
    if !outcome.is_empty() {
        return match outcome.winning_provider() {
            Some(provider) if !all => {
                format!("✓ Found {} results on \"{}\"", outcome.len(), provider)
            }
            _ => format!("✓ Found {} results across all providers", outcome.len()),
        };
    }

    if all {
        return "✗ No torrents found across any providers".to_string();
    }
    let tried = outcome
        .attempts
        .iter()
        .map(|a| format!("\"{}\"", a.provider))
        .collect::<Vec<_>>()
        .join(", ");
    format!("✗ No torrents found via {}", tried)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{AttemptStatus, ProviderAttempt};
    use crate::testing::fixtures::record;

    fn attempt(provider: &str, status: AttemptStatus) -> ProviderAttempt {
        ProviderAttempt {
            provider: ProviderId::from(provider),
            limit: 30,
            status,
            finished_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_summary_names_winning_provider() {
        let outcome = SearchOutcome {
            records: vec![record("a", "B", Some(1)), record("b", "B", Some(2))],
            attempts: vec![
                attempt("A", AttemptStatus::Empty),
                attempt("B", AttemptStatus::Found { count: 2 }),
            ],
        };
        let mode = SearchMode::Fallback { start: None };

        assert_eq!(search_summary(&outcome, &mode), "✓ Found 2 results on \"B\"");
    }

    #[test]
    fn test_summary_for_all_providers() {
        let outcome = SearchOutcome {
            records: vec![record("a", "A", Some(1))],
            attempts: vec![attempt("A", AttemptStatus::Found { count: 1 })],
        };
        assert_eq!(
            search_summary(&outcome, &SearchMode::AllProviders),
            "✓ Found 1 results across all providers"
        );
        assert_eq!(
            search_summary(&SearchOutcome::default(), &SearchMode::AllProviders),
            "✗ No torrents found across any providers"
        );
    }

    #[test]
    fn test_summary_lists_tried_providers() {
        let outcome = SearchOutcome {
            records: Vec::new(),
            attempts: vec![
                attempt("A", AttemptStatus::Empty),
                attempt("B", AttemptStatus::TimedOut),
            ],
        };
        let mode = SearchMode::Fallback {
            start: Some(ProviderId::from("A")),
        };

        assert_eq!(
            search_summary(&outcome, &mode),
            "✗ No torrents found via \"A\", \"B\""
        );
    }

    #[test]
    fn test_state_names() {
        assert_eq!(WizardState::Continuing.to_string(), "continuing");
        assert_eq!(WizardState::Searching { query: None }.to_string(), "searching");
    }
}
