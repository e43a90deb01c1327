use serde::{Deserialize, Serialize};

use crate::provider::{Category, ProviderId};

/// Root configuration
///
/// Every section is optional; an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub jackett: JackettConfig,
}

/// Search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Providers in fallback order
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderId>,
    /// Rows listed per search
    #[serde(default = "default_rows")]
    pub rows: usize,
    /// Characters shown before a title is truncated
    #[serde(default = "default_truncate")]
    pub truncate: usize,
    #[serde(default)]
    pub category: Category,
    /// Query every provider at once instead of falling back one by one
    #[serde(default)]
    pub search_all: bool,
    /// Per-call deadline in seconds (0 = wait forever)
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            rows: default_rows(),
            truncate: default_truncate(),
            category: Category::default(),
            search_all: false,
            provider_timeout_secs: default_provider_timeout(),
        }
    }
}

fn default_providers() -> Vec<ProviderId> {
    ["1337x", "thepiratebay", "kickasstorrents-ws", "torrentproject2", "limetorrents"]
        .into_iter()
        .map(ProviderId::from)
        .collect()
}

fn default_rows() -> usize {
    30
}

fn default_truncate() -> usize {
    40
}

fn default_provider_timeout() -> u64 {
    30
}

/// Table and detail view configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub seeds: bool,
    #[serde(default = "default_true")]
    pub peers: bool,
    #[serde(default = "default_true")]
    pub size: bool,
    #[serde(default = "default_true")]
    pub date: bool,
    /// Show the detail view and confirm before downloading
    #[serde(default = "default_true")]
    pub show_details: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            seeds: true,
            peers: true,
            size: true,
            date: true,
            show_details: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Progress bar configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProgressConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Bar width in characters
    #[serde(default = "default_bar_width")]
    pub width: usize,
    /// Simulated progress tick interval (milliseconds)
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Percentage added per tick
    #[serde(default = "default_step")]
    pub step: u64,
    /// Highest simulated percentage; 100% is reserved for completion
    #[serde(default = "default_ceiling")]
    pub ceiling: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            width: default_bar_width(),
            tick_ms: default_tick_ms(),
            step: default_step(),
            ceiling: default_ceiling(),
        }
    }
}

fn default_bar_width() -> usize {
    40
}

fn default_tick_ms() -> u64 {
    200
}

fn default_step() -> u64 {
    5
}

fn default_ceiling() -> u64 {
    95
}

/// What happens with the selected magnet link
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct OutputConfig {
    #[serde(default)]
    pub clipboard: bool,
    #[serde(default = "default_true")]
    pub open_default: bool,
    /// Application to open magnets with; takes precedence over open_default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_app: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            clipboard: false,
            open_default: true,
            open_app: None,
        }
    }
}

/// Jackett provider backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JackettConfig {
    /// Jackett server URL (e.g., "http://localhost:9117")
    #[serde(default = "default_jackett_url")]
    pub url: String,
    /// Jackett API key
    #[serde(default)]
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for JackettConfig {
    fn default() -> Self {
        Self {
            url: default_jackett_url(),
            api_key: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_jackett_url() -> String {
    "http://127.0.0.1:9117".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Values supplied on the command line; `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub rows: Option<usize>,
    pub truncate: Option<usize>,
    pub category: Option<Category>,
    pub search_all: Option<bool>,
    pub show_details: Option<bool>,
    pub show_progress: Option<bool>,
    pub clipboard: Option<bool>,
    pub open_default: Option<bool>,
    pub open_app: Option<String>,
}

impl Config {
    /// Apply command-line overrides, producing the session configuration.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(rows) = overrides.rows {
            self.search.rows = rows;
        }
        if let Some(truncate) = overrides.truncate {
            self.search.truncate = truncate;
        }
        if let Some(category) = overrides.category {
            self.search.category = category;
        }
        if let Some(search_all) = overrides.search_all {
            self.search.search_all = search_all;
        }
        if let Some(show_details) = overrides.show_details {
            self.display.show_details = show_details;
        }
        if let Some(show_progress) = overrides.show_progress {
            self.progress.enabled = show_progress;
        }
        if let Some(clipboard) = overrides.clipboard {
            self.output.clipboard = clipboard;
        }
        if let Some(open_default) = overrides.open_default {
            self.output.open_default = open_default;
        }
        if overrides.open_app.is_some() {
            self.output.open_app = overrides.open_app;
        }
        self
    }
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub search: SearchConfig,
    pub display: DisplayConfig,
    pub progress: ProgressConfig,
    pub output: OutputConfig,
    pub jackett: SanitizedJackettConfig,
}

/// Sanitized Jackett config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedJackettConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            search: config.search.clone(),
            display: config.display.clone(),
            progress: config.progress.clone(),
            output: config.output.clone(),
            jackett: SanitizedJackettConfig {
                url: config.jackett.url.clone(),
                api_key_configured: !config.jackett.api_key.is_empty(),
                timeout_secs: config.jackett.timeout_secs,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.search.rows, 30);
        assert_eq!(config.search.truncate, 40);
        assert_eq!(config.search.category, Category::All);
        assert_eq!(config.search.providers.len(), 5);
        assert!(config.display.seeds);
        assert!(config.display.show_details);
        assert_eq!(config.progress.ceiling, 95);
        assert!(config.output.open_default);
        assert!(config.output.open_app.is_none());
        assert_eq!(config.jackett.url, "http://127.0.0.1:9117");
    }

    #[test]
    fn test_deserialize_partial_sections() {
        let toml = r#"
[search]
providers = ["1337x", "nyaasi"]
category = "movies"

[display]
date = false

[jackett]
url = "http://jackett.lan:9117"
api_key = "secret"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.search.providers,
            vec![ProviderId::from("1337x"), ProviderId::from("nyaasi")]
        );
        assert_eq!(config.search.category, Category::Movies);
        assert_eq!(config.search.rows, 30); // default
        assert!(!config.display.date);
        assert!(config.display.peers);
        assert_eq!(config.jackett.timeout_secs, 30); // default
    }

    #[test]
    fn test_overrides_replace_only_given_values() {
        let config = Config::default().with_overrides(Overrides {
            rows: Some(10),
            show_progress: Some(false),
            open_app: Some("transmission-gtk".to_string()),
            ..Default::default()
        });

        assert_eq!(config.search.rows, 10);
        assert_eq!(config.search.truncate, 40);
        assert!(!config.progress.enabled);
        assert_eq!(config.output.open_app.as_deref(), Some("transmission-gtk"));
        assert!(config.output.open_default);
    }

    #[test]
    fn test_sanitized_config_hides_api_key() {
        let mut config = Config::default();
        config.jackett.api_key = "secret-key".to_string();

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.jackett.api_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-key"));
    }
}
