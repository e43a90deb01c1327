//! Progress bars for long-running phases.
//!
//! Provider calls report no real progress, so a search shows a simulated
//! bar: a ticker advances it by a fixed step per interval up to a ceiling
//! below 100%, and it only jumps to 100% once the real call resolves.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use is_terminal::IsTerminal;
use tokio::time::MissedTickBehavior;

use crate::config::ProgressConfig;

type TargetFactory = Arc<dyn Fn() -> ProgressDrawTarget + Send + Sync>;

/// Creates progress bars, or hidden no-op handles when output is not
/// interactive.
#[derive(Clone)]
pub struct ProgressReporter {
    config: ProgressConfig,
    interactive: bool,
    target: TargetFactory,
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("config", &self.config)
            .field("interactive", &self.interactive)
            .finish()
    }
}

impl ProgressReporter {
    /// Draw on stderr when it is a terminal and progress is enabled.
    pub fn stderr(config: &ProgressConfig) -> Self {
        let interactive = config.enabled && std::io::stderr().is_terminal();
        Self::with_target(config, interactive, ProgressDrawTarget::stderr)
    }

    /// Never draw anything.
    pub fn hidden(config: &ProgressConfig) -> Self {
        Self::with_target(config, false, ProgressDrawTarget::hidden)
    }

    /// Draw on targets produced by `target` when `interactive` is set.
    pub fn with_target<F>(config: &ProgressConfig, interactive: bool, target: F) -> Self
    where
        F: Fn() -> ProgressDrawTarget + Send + Sync + 'static,
    {
        Self {
            config: config.clone(),
            interactive,
            target: Arc::new(target),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Start a bar of `total` units labelled `label`.
    pub fn begin(&self, total: u64, label: &str) -> ProgressHandle {
        if !self.interactive {
            return ProgressHandle::hidden(total);
        }

        let template = format!("{{msg}} {{bar:{}}} {{percent}}%", self.config.width);
        let style = ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█░");
        let bar = ProgressBar::with_draw_target(Some(total), (self.target)());
        bar.set_style(style);
        bar.set_message(label.to_string());

        ProgressHandle {
            bar,
            total: total.max(1),
            last_percent: None,
        }
    }

    /// Await `future` under a simulated 0-100 bar.
    ///
    /// The returned handle sits at 100% and still needs a
    /// [`stop`](ProgressHandle::stop) with the summary line.
    pub async fn track<F>(&self, label: &str, future: F) -> (F::Output, ProgressHandle)
    where
        F: Future,
    {
        let mut handle = self.begin(100, label);
        if handle.is_hidden() {
            return (future.await, handle);
        }

        let mut ticker = tokio::time::interval(Duration::from_millis(self.config.tick_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        tokio::pin!(future);
        let mut ticks = 0u64;
        let output = loop {
            tokio::select! {
                output = &mut future => break output,
                _ = ticker.tick() => {
                    ticks += 1;
                    handle.update(simulated_percent(ticks, self.config.step, self.config.ceiling));
                }
            }
        };

        handle.update(100);
        (output, handle)
    }

    /// Step a bar from 0 to `up_to` with a fixed pause per step.
    ///
    /// Used for short phases (magnet lookup, opening) that have no
    /// measurable progress. Hidden handles return immediately.
    pub async fn animate(&self, handle: &mut ProgressHandle, up_to: u64, step: u64, pause: Duration) {
        if handle.is_hidden() {
            return;
        }
        for current in (0..=up_to).step_by(step.max(1) as usize) {
            handle.update(current);
            tokio::time::sleep(pause).await;
        }
    }
}

/// Percentage shown after `ticks` ticker intervals.
pub fn simulated_percent(ticks: u64, step: u64, ceiling: u64) -> u64 {
    ticks.saturating_mul(step).min(ceiling)
}

/// A running bar. Every operation is a no-op on hidden handles.
#[derive(Debug)]
pub struct ProgressHandle {
    bar: ProgressBar,
    total: u64,
    last_percent: Option<u64>,
}

impl ProgressHandle {
    fn hidden(total: u64) -> Self {
        Self {
            bar: ProgressBar::hidden(),
            total: total.max(1),
            last_percent: None,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    /// Last percentage drawn.
    pub fn percent(&self) -> Option<u64> {
        self.last_percent
    }

    /// Move the bar to `current`, redrawing only when the percentage changes.
    pub fn update(&mut self, current: u64) {
        if self.is_hidden() {
            return;
        }

        let current = current.min(self.total);
        let percent = (u128::from(current) * 100 / u128::from(self.total)) as u64;
        if self.last_percent == Some(percent) && percent != 100 {
            return;
        }
        self.last_percent = Some(percent);
        self.bar.set_position(current);
    }

    /// Clear the bar and leave `message` in its place.
    ///
    /// Returns `false` when nothing was drawn (hidden handle), so callers
    /// can print the summary some other way.
    pub fn stop(self, message: &str) -> bool {
        if self.is_hidden() {
            return false;
        }

        let style =
            ProgressStyle::with_template("{msg}").unwrap_or_else(|_| ProgressStyle::default_bar());
        self.bar.set_style(style);
        self.bar.finish_with_message(message.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::InMemoryTerm;

    fn config() -> ProgressConfig {
        ProgressConfig {
            tick_ms: 5,
            ..Default::default()
        }
    }

    fn in_memory(interactive: bool) -> (ProgressReporter, InMemoryTerm) {
        let term = InMemoryTerm::new(10, 80);
        let target_term = term.clone();
        let reporter = ProgressReporter::with_target(&config(), interactive, move || {
            ProgressDrawTarget::term_like(Box::new(target_term.clone()))
        });
        (reporter, term)
    }

    #[test]
    fn test_simulated_percent_stops_below_ceiling() {
        assert_eq!(simulated_percent(0, 5, 95), 0);
        assert_eq!(simulated_percent(3, 5, 95), 15);
        assert_eq!(simulated_percent(19, 5, 95), 95);
        assert_eq!(simulated_percent(500, 5, 95), 95);
        assert_eq!(simulated_percent(u64::MAX, 5, 95), 95);
    }

    #[test]
    fn test_non_interactive_is_silent() {
        let (reporter, term) = in_memory(false);
        let mut handle = reporter.begin(100, "Searching");

        assert!(handle.is_hidden());
        handle.update(40);
        handle.update(100);
        assert_eq!(handle.percent(), None);
        assert!(!handle.stop("done"));
        assert_eq!(term.contents(), "");
    }

    #[test]
    fn test_hidden_reporter_never_interactive() {
        let reporter = ProgressReporter::hidden(&ProgressConfig::default());
        assert!(!reporter.is_interactive());
        assert!(reporter.begin(10, "x").is_hidden());
    }

    #[test]
    fn test_update_tracks_percentage() {
        let (reporter, _term) = in_memory(true);
        let mut handle = reporter.begin(200, "Searching");

        assert!(!handle.is_hidden());
        handle.update(50);
        assert_eq!(handle.percent(), Some(25));
        handle.update(51); // same percentage, no redraw
        assert_eq!(handle.percent(), Some(25));
        handle.update(500); // clamped
        assert_eq!(handle.percent(), Some(100));
    }

    #[test]
    fn test_update_with_huge_total() {
        let (reporter, _term) = in_memory(true);
        let mut handle = reporter.begin(u64::MAX, "Downloading");

        handle.update(u64::MAX / 2);
        assert_eq!(handle.percent(), Some(49));
        handle.update(u64::MAX);
        assert_eq!(handle.percent(), Some(100));
    }

    #[test]
    fn test_stop_leaves_summary_line() {
        let (reporter, term) = in_memory(true);
        let mut handle = reporter.begin(100, "Searching");
        handle.update(60);

        assert!(handle.stop("Found 3 results"));
        assert!(term.contents().contains("Found 3 results"));
    }

    #[tokio::test]
    async fn test_track_finishes_at_full() {
        let (reporter, _term) = in_memory(true);
        let (value, handle) = reporter
            .track("Searching", async {
                tokio::time::sleep(Duration::from_millis(40)).await;
                7
            })
            .await;

        assert_eq!(value, 7);
        assert_eq!(handle.percent(), Some(100));
    }

    #[test]
    fn test_track_hidden_just_awaits() {
        let reporter = ProgressReporter::hidden(&config());
        let (value, handle) = tokio_test::block_on(reporter.track("Searching", async { "ok" }));

        assert_eq!(value, "ok");
        assert!(handle.is_hidden());
    }

    #[tokio::test]
    async fn test_animate_reaches_target() {
        let (reporter, _term) = in_memory(true);
        let mut handle = reporter.begin(100, "Opening torrent");
        reporter
            .animate(&mut handle, 90, 15, Duration::from_millis(1))
            .await;

        assert_eq!(handle.percent(), Some(90));
    }
}
