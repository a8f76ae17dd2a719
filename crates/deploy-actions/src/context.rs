//! Trigger context for an action run.
//!
//! The runner describes the triggering event through `GITHUB_*` environment
//! variables and a JSON payload file. [`EventContext`] captures all of it as a
//! plain value so the actions never read process state themselves.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Event name of deployment status webhooks.
pub const DEPLOYMENT_STATUS_EVENT: &str = "deployment_status";

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Failed to read event payload {path}: {source}")]
    ReadPayload {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid event payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("Invalid repository '{0}', expected owner/repo")]
    InvalidRepository(String),
}

/// Repository coordinates (`owner/repo`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl FromStr for RepoId {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, repo))
                if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
            {
                Ok(Self::new(owner, repo))
            }
            _ => Err(ContextError::InvalidRepository(s.to_string())),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Webhook payload fields the actions care about. Everything is optional:
/// which fields must be present depends on the action.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub pull_request: Option<PullRequest>,

    #[serde(default)]
    pub label: Option<Label>,

    #[serde(default)]
    pub issue: Option<Issue>,

    #[serde(default)]
    pub deployment: Option<DeploymentPayload>,

    /// Top-level `number` carried by some issue/PR events
    #[serde(default)]
    pub number: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequest {
    #[serde(default)]
    pub number: Option<u64>,

    /// Source branch
    #[serde(default)]
    pub head: Option<GitRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub ref_name: String,

    #[serde(default)]
    pub sha: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
}

/// `deployment` object of a `deployment_status` event.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentPayload {
    #[serde(default)]
    pub id: Option<u64>,

    #[serde(rename = "ref")]
    pub ref_name: String,

    pub environment: String,
}

/// Everything an action knows about the event that triggered it.
#[derive(Debug, Clone)]
pub struct EventContext {
    pub event_name: String,
    pub actor: String,
    pub repo: RepoId,
    pub payload: EventPayload,
}

impl EventContext {
    pub fn new(
        event_name: impl Into<String>,
        actor: impl Into<String>,
        repo: RepoId,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_name: event_name.into(),
            actor: actor.into(),
            repo,
            payload,
        }
    }

    /// Build a context from the runner's event description. A missing event
    /// file yields an empty payload.
    pub fn load(
        event_name: &str,
        actor: &str,
        repository: &str,
        event_path: Option<&Path>,
    ) -> Result<Self, ContextError> {
        let repo = repository.parse()?;
        let payload = match event_path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path).map_err(|source| {
                    ContextError::ReadPayload {
                        path: path.display().to_string(),
                        source,
                    }
                })?;
                serde_json::from_str(&raw)?
            }
            _ => EventPayload::default(),
        };

        Ok(Self::new(event_name, actor, repo, payload))
    }

    /// Issue or pull request number the event refers to.
    #[must_use]
    pub fn issue_number(&self) -> Option<u64> {
        self.payload
            .issue
            .as_ref()
            .map(|issue| issue.number)
            .or_else(|| {
                self.payload
                    .pull_request
                    .as_ref()
                    .and_then(|pr| pr.number)
            })
            .or(self.payload.number)
    }

    /// Source branch of the pull request, if the event carries one.
    #[must_use]
    pub fn head_ref(&self) -> Option<&str> {
        self.payload
            .pull_request
            .as_ref()
            .and_then(|pr| pr.head.as_ref())
            .map(|head| head.ref_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_repo() {
        let repo: RepoId = "octo/app".parse().unwrap();
        assert_eq!(repo.owner, "octo");
        assert_eq!(repo.repo, "app");
        assert_eq!(repo.to_string(), "octo/app");
    }

    #[test]
    fn test_parse_repo_invalid() {
        assert!("octo".parse::<RepoId>().is_err());
        assert!("/app".parse::<RepoId>().is_err());
        assert!("octo/app/extra".parse::<RepoId>().is_err());
    }

    #[test]
    fn test_load_labeled_payload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "action": "labeled",
                "number": 42,
                "label": {{ "name": "Deploy to DEV" }},
                "pull_request": {{
                    "number": 42,
                    "head": {{ "ref": "feature/login", "sha": "abc" }}
                }}
            }}"#
        )
        .unwrap();

        let ctx = EventContext::load("pull_request", "octocat", "octo/app", Some(file.path()))
            .unwrap();
        assert_eq!(ctx.issue_number(), Some(42));
        assert_eq!(ctx.head_ref(), Some("feature/login"));
        assert_eq!(ctx.payload.label.unwrap().name, "Deploy to DEV");
    }

    #[test]
    fn test_load_without_event_file() {
        let ctx = EventContext::load("push", "octocat", "octo/app", None).unwrap();
        assert!(ctx.payload.pull_request.is_none());
        assert_eq!(ctx.issue_number(), None);
    }

    #[test]
    fn test_load_invalid_payload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = EventContext::load("push", "octocat", "octo/app", Some(file.path()));
        assert!(matches!(result, Err(ContextError::InvalidPayload(_))));
    }

    #[test]
    fn test_deployment_status_payload() {
        let payload: EventPayload = serde_json::from_str(
            r#"{ "deployment": { "id": 9, "ref": "123", "environment": "dev" } }"#,
        )
        .unwrap();
        let deployment = payload.deployment.unwrap();
        assert_eq!(deployment.ref_name, "123");
        assert_eq!(deployment.environment, "dev");
    }
}
