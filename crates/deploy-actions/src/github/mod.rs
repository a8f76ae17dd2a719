//! # GitHub API access
//!
//! The actions reach GitHub only through [`DeploymentApi`], a narrow
//! capability trait covering the six REST operations they use. [`GitHubClient`]
//! implements it over `reqwest`; tests substitute a recording fake.

pub mod client;
pub mod error;
pub mod types;

pub use client::GitHubClient;
pub use error::GitHubError;
pub use types::{Deployment, DeploymentState, DeploymentStatus};

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Hosting-API operations used by the deployment actions.
#[async_trait]
pub trait DeploymentApi: Send + Sync {
    /// Post a comment on an issue or pull request thread.
    async fn create_comment(&self, issue_number: u64, body: &str) -> Result<(), GitHubError>;

    /// Start a `workflow_dispatch` run of `workflow_id` on `git_ref`.
    async fn create_workflow_dispatch(
        &self,
        workflow_id: &str,
        git_ref: &str,
        inputs: &Map<String, Value>,
    ) -> Result<(), GitHubError>;

    /// Remove a label from an issue or pull request.
    async fn remove_label(&self, issue_number: u64, name: &str) -> Result<(), GitHubError>;

    /// List deployments created from `git_ref` (first page only).
    async fn list_deployments(&self, git_ref: &str) -> Result<Vec<Deployment>, GitHubError>;

    /// List a deployment's statuses, most recent first (first page only).
    async fn list_deployment_statuses(
        &self,
        deployment_id: u64,
    ) -> Result<Vec<DeploymentStatus>, GitHubError>;

    /// Append a status to a deployment.
    async fn create_deployment_status(
        &self,
        deployment_id: u64,
        state: DeploymentState,
        description: &str,
    ) -> Result<(), GitHubError>;
}
