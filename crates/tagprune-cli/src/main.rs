//! Tagprune CLI - prunes container image tags from a GitLab registry.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tagprune_registry::{GitlabClient, Pruner, RegistryConfig};

mod args;
mod output;

use args::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tagprune=info,tagprune_registry=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config =
        RegistryConfig::from_settings(cli.into_settings()).context("Invalid configuration")?;

    tracing::info!(
        domain = %config.domain,
        namespace = %config.namespace,
        project = %config.project_name,
        strategy = %config.strategy,
        dry_run = config.dry_run,
        "Starting run"
    );

    let client = GitlabClient::new(&config).context("Failed to create registry client")?;
    let report = Pruner::new(&client)
        .run(&config)
        .await
        .context("Run aborted")?;

    print!("{}", output::render(&report));

    if !report.is_success() {
        tracing::warn!("Some deletions were not accepted by the registry");
    }

    Ok(())
}
