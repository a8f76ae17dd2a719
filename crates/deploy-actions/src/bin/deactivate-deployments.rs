//! deactivate-deployments - retire a closed pull request's deployments.
//!
//! Every deployment of the PR's head ref that is still live is moved to
//! `failure` (which kicks off environment cleanup) and, after a pause, to
//! `inactive`.
//!
//! # Environment Variables
//!
//! - `INPUT_TOKEN` - API token (required)
//! - `GITHUB_EVENT_NAME`, `GITHUB_EVENT_PATH`, `GITHUB_ACTOR`,
//!   `GITHUB_REPOSITORY`, `GITHUB_API_URL`

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use deploy_actions::actions::deactivate::ACTION_NAME;
use deploy_actions::actions::DeactivateRunner;
use deploy_actions::cli::{self, ApiArgs, EventArgs};
use deploy_actions::settings::ActionSettings;

/// Deactivate the deployments of a merged or closed pull request.
#[derive(Parser)]
#[command(name = "deactivate-deployments")]
#[command(about = "Move a closed pull request's deployments to inactive")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    event: EventArgs,

    #[command(flatten)]
    api: ApiArgs,
}

async fn run(cli: Cli, settings: ActionSettings) -> Result<()> {
    let context = cli
        .event
        .load_context()
        .context("Failed to load event context")?;
    let client = cli.api.client(context.repo.clone())?;

    let runner = DeactivateRunner::new(Arc::new(client), context, settings);
    let report = runner.run().await?;

    tracing::info!(
        deactivated = ?report.deactivated,
        skipped = ?report.skipped,
        "Deployments deactivated"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let settings = ActionSettings::from_env();
    if settings.test_mode {
        println!("testing");
        return ExitCode::SUCCESS;
    }

    let cli = Cli::parse();
    cli::init_tracing();

    match run(cli, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => cli::report_failure(ACTION_NAME, &err),
    }
}
