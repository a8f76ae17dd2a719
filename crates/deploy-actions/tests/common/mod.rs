//! Shared fixtures for the action integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use deploy_actions::context::{EventContext, EventPayload, GitRef, Label, PullRequest, RepoId};
use deploy_actions::github::{
    Deployment, DeploymentApi, DeploymentState, DeploymentStatus, GitHubError,
};
use serde_json::{Map, Value};

/// One recorded API call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateComment {
        issue_number: u64,
        body: String,
    },
    WorkflowDispatch {
        workflow_id: String,
        git_ref: String,
        inputs: Map<String, Value>,
    },
    RemoveLabel {
        issue_number: u64,
        name: String,
    },
    ListDeployments {
        git_ref: String,
    },
    ListStatuses {
        deployment_id: u64,
    },
    CreateStatus {
        deployment_id: u64,
        state: DeploymentState,
        description: String,
    },
}

/// API operations that can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateComment,
    WorkflowDispatch,
    RemoveLabel,
    ListDeployments,
    ListStatuses,
    CreateStatus,
}

/// In-memory [`DeploymentApi`] that records every call.
#[derive(Default)]
pub struct RecordingApi {
    deployments: Vec<Deployment>,
    statuses: HashMap<u64, Vec<DeploymentStatus>>,
    failing: Vec<Operation>,
    /// Deployments whose status listing fails after the given delay
    failing_statuses: HashMap<u64, Duration>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a deployment whose statuses (newest first) are `states`.
    pub fn with_deployment(mut self, id: u64, environment: &str, states: &[DeploymentState]) -> Self {
        self.deployments.push(Deployment::new(id, environment));
        self.statuses.insert(
            id,
            states.iter().copied().map(DeploymentStatus::new).collect(),
        );
        self
    }

    pub fn failing_on(mut self, operation: Operation) -> Self {
        self.failing.push(operation);
        self
    }

    /// Make the status listing of deployment `id` fail once `after` elapses.
    pub fn failing_statuses_for(mut self, id: u64, after: Duration) -> Self {
        self.failing_statuses.insert(id, after);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Status writes, in call order.
    pub fn status_writes(&self) -> Vec<(u64, DeploymentState, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateStatus {
                    deployment_id,
                    state,
                    description,
                } => Some((deployment_id, state, description)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call, operation: Operation) -> Result<(), GitHubError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);

        if self.failing.contains(&operation) {
            return Err(GitHubError::Api {
                status: 500,
                message: "Server Error".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DeploymentApi for RecordingApi {
    async fn create_comment(&self, issue_number: u64, body: &str) -> Result<(), GitHubError> {
        self.record(
            Call::CreateComment {
                issue_number,
                body: body.to_string(),
            },
            Operation::CreateComment,
        )
    }

    async fn create_workflow_dispatch(
        &self,
        workflow_id: &str,
        git_ref: &str,
        inputs: &Map<String, Value>,
    ) -> Result<(), GitHubError> {
        self.record(
            Call::WorkflowDispatch {
                workflow_id: workflow_id.to_string(),
                git_ref: git_ref.to_string(),
                inputs: inputs.clone(),
            },
            Operation::WorkflowDispatch,
        )
    }

    async fn remove_label(&self, issue_number: u64, name: &str) -> Result<(), GitHubError> {
        self.record(
            Call::RemoveLabel {
                issue_number,
                name: name.to_string(),
            },
            Operation::RemoveLabel,
        )
    }

    async fn list_deployments(&self, git_ref: &str) -> Result<Vec<Deployment>, GitHubError> {
        self.record(
            Call::ListDeployments {
                git_ref: git_ref.to_string(),
            },
            Operation::ListDeployments,
        )?;
        Ok(self.deployments.clone())
    }

    async fn list_deployment_statuses(
        &self,
        deployment_id: u64,
    ) -> Result<Vec<DeploymentStatus>, GitHubError> {
        self.record(Call::ListStatuses { deployment_id }, Operation::ListStatuses)?;
        if let Some(after) = self.failing_statuses.get(&deployment_id) {
            tokio::time::sleep(*after).await;
            return Err(GitHubError::Api {
                status: 502,
                message: "Bad Gateway".to_string(),
            });
        }
        Ok(self.statuses.get(&deployment_id).cloned().unwrap_or_default())
    }

    async fn create_deployment_status(
        &self,
        deployment_id: u64,
        state: DeploymentState,
        description: &str,
    ) -> Result<(), GitHubError> {
        self.record(
            Call::CreateStatus {
                deployment_id,
                state,
                description: description.to_string(),
            },
            Operation::CreateStatus,
        )
    }
}

/// `pull_request` event for PR `number` on branch `head_ref`, optionally
/// carrying the label that was just applied.
pub fn pr_context(number: u64, head_ref: &str, label: Option<&str>) -> EventContext {
    let payload = EventPayload {
        pull_request: Some(PullRequest {
            number: Some(number),
            head: Some(GitRef {
                ref_name: head_ref.to_string(),
                sha: None,
            }),
        }),
        label: label.map(|name| Label {
            name: name.to_string(),
        }),
        number: Some(number),
        ..EventPayload::default()
    };

    EventContext::new("pull_request", "colin", RepoId::new("octo", "app"), payload)
}

/// Event without a pull request.
pub fn push_context() -> EventContext {
    EventContext::new(
        "push",
        "colin",
        RepoId::new("octo", "app"),
        EventPayload::default(),
    )
}
