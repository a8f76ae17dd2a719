//! Shared plumbing for the action binaries: runner environment arguments,
//! tracing setup and failure reporting.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::context::{ContextError, EventContext, RepoId};
use crate::error::ActionError;
use crate::github::client::DEFAULT_API_URL;
use crate::github::GitHubClient;

/// Description of the triggering event, as exported by the Actions runner.
#[derive(Debug, Clone, Args)]
pub struct EventArgs {
    /// Name of the triggering event
    #[arg(long, env = "GITHUB_EVENT_NAME", default_value = "")]
    pub event_name: String,

    /// Path to the JSON event payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    /// User that triggered the event
    #[arg(long, env = "GITHUB_ACTOR", default_value = "")]
    pub actor: String,

    /// Repository in owner/repo format
    #[arg(long, env = "GITHUB_REPOSITORY", default_value = "")]
    pub repository: String,
}

impl EventArgs {
    pub fn load_context(&self) -> Result<EventContext, ContextError> {
        EventContext::load(
            &self.event_name,
            &self.actor,
            &self.repository,
            self.event_path.as_deref(),
        )
    }
}

/// GitHub API access for actions that call the API.
#[derive(Debug, Clone, Args)]
pub struct ApiArgs {
    /// API token (the action's `token` input)
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// API root URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
}

impl ApiArgs {
    /// The token, or [`ActionError::MissingInput`] when none was supplied.
    pub fn token(&self) -> Result<&str, ActionError> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ActionError::MissingInput("token".to_string()))
    }

    pub fn client(&self, repo: RepoId) -> Result<GitHubClient, ActionError> {
        let token = self.token()?;
        Ok(GitHubClient::with_base_url(&self.api_url, token, repo)?)
    }
}

/// Install the fmt subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

/// Report a failed run to the runner and pick the exit code.
pub fn report_failure(action: &str, err: &anyhow::Error) -> ExitCode {
    println!("{}", failure_annotation(action, err));
    error!(error = ?err, "{} action failed", action);
    ExitCode::FAILURE
}

/// `::error::` workflow command marking the action as failed.
#[must_use]
pub fn failure_annotation(action: &str, err: &anyhow::Error) -> String {
    format!("::error::{action} action failed: {err:#}")
}
