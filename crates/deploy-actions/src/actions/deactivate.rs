//! # Deployment deactivation
//!
//! Runs when a pull request is merged or closed. Every deployment created from
//! the PR's head ref whose current status is not already `failure` or
//! `inactive` is moved to `failure`, then after a pause to `inactive`.
//!
//! The `failure` write is what triggers environment cleanup workflows
//! (`deployment_status` events); `inactive` does not trigger workflows. The
//! pause lets that cascade start before the final state lands.
//!
//! Deployments are processed concurrently. A failed API call stops only that
//! deployment; the others run to completion before the first error fails the
//! whole run.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument};

use crate::context::EventContext;
use crate::error::{ActionError, Result};
use crate::github::{Deployment, DeploymentApi, DeploymentState};
use crate::settings::ActionSettings;

pub const ACTION_NAME: &str = "deactivate-deployments";

pub const FAILURE_DESCRIPTION: &str = "Pull Request Merged/Closed, triggering removal";
pub const INACTIVE_DESCRIPTION: &str = "Pull Request Merged/Closed, inactivating";

/// Pause between the `failure` and `inactive` writes, in wait units.
pub const TRANSITION_DELAY_UNITS: u64 = 15;

/// What happened to a single deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeactivationOutcome {
    /// Moved through `failure` to `inactive`
    Deactivated,
    /// Current state was already terminal
    AlreadyDeactivated(DeploymentState),
    /// The deployment has no statuses yet
    NoStatus,
}

/// Per-run summary, deployment ids grouped by outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeactivationReport {
    pub deactivated: Vec<u64>,
    pub skipped: Vec<u64>,
}

/// Deactivates the deployments of a closed pull request.
pub struct DeactivateRunner {
    api: Arc<dyn DeploymentApi>,
    context: EventContext,
    transition_delay: Duration,
}

impl DeactivateRunner {
    pub fn new(api: Arc<dyn DeploymentApi>, context: EventContext, settings: ActionSettings) -> Self {
        Self {
            api,
            context,
            transition_delay: settings.wait(TRANSITION_DELAY_UNITS),
        }
    }

    #[must_use]
    pub fn with_transition_delay(mut self, delay: Duration) -> Self {
        self.transition_delay = delay;
        self
    }

    #[must_use]
    pub fn transition_delay(&self) -> Duration {
        self.transition_delay
    }

    /// The event must carry a pull request with a head ref; returns that ref.
    pub fn validate(&self) -> Result<&str> {
        if self.context.payload.pull_request.is_none() {
            return Err(ActionError::InvalidTrigger(
                "This action must be run from a PR event".to_string(),
            ));
        }

        self.context.head_ref().ok_or_else(|| {
            ActionError::InvalidTrigger("Pull request head ref missing from event payload".to_string())
        })
    }

    pub async fn run(&self) -> Result<DeactivationReport> {
        let git_ref = self.validate()?;
        self.deactivate_integration_deployments(git_ref).await
    }

    /// Deactivate every deployment created from `git_ref`.
    ///
    /// Only the first page of deployments (and of each deployment's statuses)
    /// is considered.
    #[instrument(skip(self), fields(git_ref = %git_ref))]
    pub async fn deactivate_integration_deployments(
        &self,
        git_ref: &str,
    ) -> Result<DeactivationReport> {
        let deployments = self.api.list_deployments(git_ref).await?;
        info!(
            count = deployments.len(),
            "Found deployments for {}", git_ref
        );

        let results = join_all(
            deployments
                .iter()
                .map(|deployment| self.deactivate_deployment(deployment)),
        )
        .await;

        let mut outcomes = Vec::with_capacity(results.len());
        let mut first_error = None;
        for (deployment, result) in deployments.iter().zip(results) {
            match result {
                Ok(outcome) => outcomes.push((deployment.id, outcome)),
                Err(err) => {
                    error!(deployment_id = deployment.id, error = %err, "Deactivation failed");
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        let mut report = DeactivationReport::default();
        for (id, outcome) in outcomes {
            match outcome {
                DeactivationOutcome::Deactivated => report.deactivated.push(id),
                DeactivationOutcome::AlreadyDeactivated(_) | DeactivationOutcome::NoStatus => {
                    report.skipped.push(id);
                }
            }
        }

        info!(
            deactivated = report.deactivated.len(),
            skipped = report.skipped.len(),
            "Deactivation complete"
        );
        Ok(report)
    }

    async fn deactivate_deployment(&self, deployment: &Deployment) -> Result<DeactivationOutcome> {
        let statuses = self.api.list_deployment_statuses(deployment.id).await?;

        // Statuses are listed newest first
        let Some(current) = statuses.first() else {
            debug!(deployment_id = deployment.id, "Deployment has no statuses");
            return Ok(DeactivationOutcome::NoStatus);
        };

        if current.state.is_deactivated() {
            debug!(
                deployment_id = deployment.id,
                state = %current.state,
                "Deployment already deactivated"
            );
            return Ok(DeactivationOutcome::AlreadyDeactivated(current.state));
        }

        info!(
            "Deployment: {}:{} transitioning to failure",
            deployment.id, deployment.environment
        );
        self.api
            .create_deployment_status(deployment.id, DeploymentState::Failure, FAILURE_DESCRIPTION)
            .await?;

        info!("Sleeping to wait for transition...");
        sleep(self.transition_delay).await;

        info!(
            "Deployment: {}:{} transitioning to inactive",
            deployment.id, deployment.environment
        );
        self.api
            .create_deployment_status(
                deployment.id,
                DeploymentState::Inactive,
                INACTIVE_DESCRIPTION,
            )
            .await?;

        Ok(DeactivationOutcome::Deactivated)
    }
}
