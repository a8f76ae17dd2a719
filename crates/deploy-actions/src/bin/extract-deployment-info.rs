//! extract-deployment-info - expose a deployment's ref and environment.
//!
//! Only valid for `deployment_status` triggers. Publishes the `deployment_ref`
//! and `environment` outputs; no API calls are made.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use deploy_actions::actions::deployment_info::ACTION_NAME;
use deploy_actions::actions::DeploymentInfoRunner;
use deploy_actions::cli::{self, EventArgs};
use deploy_actions::settings::ActionSettings;
use deploy_actions::toolkit::EnvToolkit;

/// Publish the deployment ref and environment of a `deployment_status` event.
#[derive(Parser)]
#[command(name = "extract-deployment-info")]
#[command(about = "Output the ref and environment of a deployment_status event")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    event: EventArgs,
}

fn run(cli: &Cli) -> Result<()> {
    let context = cli
        .event
        .load_context()
        .context("Failed to load event context")?;

    let runner = DeploymentInfoRunner::new(Arc::new(EnvToolkit::from_env()), context);
    runner.run()?;
    Ok(())
}

fn main() -> ExitCode {
    if ActionSettings::from_env().test_mode {
        println!("testing");
        return ExitCode::SUCCESS;
    }

    let cli = Cli::parse();
    cli::init_tracing();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => cli::report_failure(ACTION_NAME, &err),
    }
}
