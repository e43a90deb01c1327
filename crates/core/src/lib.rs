pub mod config;
pub mod display;
pub mod progress;
pub mod provider;
pub mod search;
pub mod testing;
pub mod wizard;

pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, Overrides, SanitizedConfig,
};
pub use display::{Choice, ColumnPolicy, TableEntry, TableFormatter};
pub use progress::{ProgressHandle, ProgressReporter};
pub use provider::{
    ActiveProviders, Category, JackettProvider, ProviderClient, ProviderError, ProviderId,
};
pub use search::{
    merge_results, SearchError, SearchMode, SearchOrchestrator, SearchOutcome, SearchRequest,
    TorrentRecord,
};
pub use wizard::{
    LaunchError, Launcher, PromptError, Prompter, Wizard, WizardError, WizardState,
};
