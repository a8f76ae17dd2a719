//! Continuous-deployment actions for GitHub pull requests.
//!
//! Three independent actions, each shipped as its own binary:
//!
//! - `create-deployment-from-label`: turn a PR label such as `deploy to dev`
//!   into a `workflow_dispatch` of the deployment workflow
//! - `deactivate-deployments`: when a PR closes, move its deployments to
//!   `failure` (triggering environment cleanup) and then `inactive`
//! - `extract-deployment-info`: expose a `deployment_status` event's ref and
//!   environment as outputs
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use deploy_actions::actions::LabelDeployRunner;
//! use deploy_actions::context::{EventContext, EventPayload, RepoId};
//! use deploy_actions::github::GitHubClient;
//! use deploy_actions::toolkit::MemoryToolkit;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = RepoId::new("octo", "app");
//! let client = GitHubClient::new("ghp_token", repo.clone())?;
//! let toolkit = MemoryToolkit::new()
//!     .with_input("environment-regex", r"deploy to (\w+)")
//!     .with_input("deployment-workflow-name", "deploy.yml");
//! let context = EventContext::new("pull_request", "octocat", repo, EventPayload::default());
//!
//! let runner = LabelDeployRunner::new(Arc::new(client), Arc::new(toolkit), context);
//! let info = runner.run().await?;
//! println!("requested deployment to {}", info.environment);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`context::EventContext`] carries the trigger (event name, actor,
//!   repository, payload) into each runner explicitly
//! - [`github::DeploymentApi`] is the only path to GitHub
//! - [`toolkit::Toolkit`] reads inputs and publishes outputs

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod actions;
pub mod cli;
pub mod context;
pub mod error;
pub mod github;
pub mod settings;
pub mod toolkit;

pub use error::{ActionError, Result};
