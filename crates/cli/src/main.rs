mod cli;
mod launcher;
mod prompt;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use magnetize_core::{
    load_config_or_default, search::ProviderSet, validate_config, JackettProvider, ProviderClient,
    ProviderId, SanitizedConfig, SearchOrchestrator, Wizard,
};

use cli::Cli;
use launcher::SystemLauncher;
use prompt::InquirePrompter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let query = cli.query();

    let config = load_config_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?
        .with_overrides(cli.overrides());
    validate_config(&config).context("Configuration validation failed")?;
    debug!(
        config = %serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default(),
        "Configuration loaded"
    );

    let client: Arc<dyn ProviderClient> = Arc::new(
        JackettProvider::new(config.jackett.clone()).context("Failed to create Jackett client")?,
    );
    info!("Using provider backend: {}", client.name());

    let providers = ProviderSet::new(config.search.providers.iter().cloned())?;
    let call_timeout = match config.search.provider_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let orchestrator = SearchOrchestrator::new(client, providers).with_call_timeout(call_timeout);

    let mut wizard = Wizard::new(
        config,
        orchestrator,
        InquirePrompter::new(),
        SystemLauncher::new(),
    )
    .with_provider(cli.provider.map(ProviderId::from))?;

    wizard.run(query).await?;
    Ok(())
}
