//! create-deployment-from-label - request a deployment by labelling a PR.
//!
//! Runs on `pull_request` `labeled` events. The environment is extracted from
//! the label with the `environment-regex` input, the deployment workflow is
//! dispatched on the PR branch and the label is removed again.
//!
//! # Environment Variables
//!
//! - `INPUT_TOKEN` - API token (required)
//! - `INPUT_ENVIRONMENT-REGEX` - pattern whose first group is the environment
//! - `INPUT_DEPLOYMENT-WORKFLOW-NAME` - workflow to dispatch
//! - `INPUT_CREATE-COMMENT` - post an acknowledgement comment (default true)
//! - `INPUT_ADDITIONAL-INPUTS-JSON` - extra dispatch inputs as a JSON object
//! - `GITHUB_EVENT_NAME`, `GITHUB_EVENT_PATH`, `GITHUB_ACTOR`,
//!   `GITHUB_REPOSITORY`, `GITHUB_API_URL`, `GITHUB_OUTPUT`

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use deploy_actions::actions::label_deploy::ACTION_NAME;
use deploy_actions::actions::LabelDeployRunner;
use deploy_actions::cli::{self, ApiArgs, EventArgs};
use deploy_actions::settings::ActionSettings;
use deploy_actions::toolkit::EnvToolkit;

/// Request a deployment from a pull request label.
#[derive(Parser)]
#[command(name = "create-deployment-from-label")]
#[command(about = "Dispatch the deployment workflow for a labelled pull request")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    event: EventArgs,

    #[command(flatten)]
    api: ApiArgs,
}

async fn run(cli: Cli) -> Result<()> {
    let context = cli
        .event
        .load_context()
        .context("Failed to load event context")?;
    let client = cli.api.client(context.repo.clone())?;
    let toolkit = EnvToolkit::from_env();

    let runner = LabelDeployRunner::new(Arc::new(client), Arc::new(toolkit), context);
    let info = runner.run().await?;

    tracing::info!(environment = %info.environment, "Deployment requested");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    if ActionSettings::from_env().test_mode {
        println!("testing");
        return ExitCode::SUCCESS;
    }

    let cli = Cli::parse();
    cli::init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => cli::report_failure(ACTION_NAME, &err),
    }
}
