//! # GitHub REST Client
//!
//! `reqwest`-backed implementation of [`DeploymentApi`]. Every call is a single
//! request: no retries, no pagination, failures are returned to the caller
//! untouched.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client as HttpClient, Method, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument};

use super::{Deployment, DeploymentApi, DeploymentState, DeploymentStatus, GitHubError};
use crate::context::RepoId;

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("deploy-actions/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";
const GITHUB_JSON: &str = "application/vnd.github+json";

/// Deployment status writes opt into the `flash` (extra states) and
/// `ant-man` (`inactive` state) previews.
const DEPLOYMENT_STATUS_PREVIEWS: &str =
    "application/vnd.github.flash-preview+json, application/vnd.github.ant-man-preview+json";

/// Listings fetch a single page of this size.
const PAGE_SIZE: &str = "100";

#[derive(Debug, Deserialize)]
struct GitHubErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct CreatedComment {
    id: u64,
}

/// GitHub API client scoped to one repository.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http_client: HttpClient,
    base_url: Url,
    token: String,
    repo: RepoId,
}

impl GitHubClient {
    /// Create a client against the public GitHub API.
    pub fn new(token: impl Into<String>, repo: RepoId) -> Result<Self, GitHubError> {
        Self::with_base_url(DEFAULT_API_URL, token, repo)
    }

    /// Create a client against an explicit API root (GitHub Enterprise, tests).
    pub fn with_base_url(
        base_url: &str,
        token: impl Into<String>,
        repo: RepoId,
    ) -> Result<Self, GitHubError> {
        let parsed =
            Url::parse(base_url).map_err(|e| GitHubError::InvalidUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(GitHubError::InvalidUrl(base_url.to_string()));
        }

        let http_client = HttpClient::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            base_url: parsed,
            token: token.into(),
            repo,
        })
    }

    #[must_use]
    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    /// Build `{base}/repos/{owner}/{repo}/{segments...}`, percent-encoding
    /// each segment.
    fn repo_url(&self, segments: &[&str]) -> Result<Url, GitHubError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| GitHubError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty()
                .extend(["repos", self.repo.owner.as_str(), self.repo.repo.as_str()])
                .extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, accept: &str) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::ACCEPT, accept)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// Send a request and turn non-2xx responses into [`GitHubError::Api`].
    async fn send(request: RequestBuilder) -> Result<Response, GitHubError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GitHubErrorBody>(&body)
            .map(|e| e.message)
            .unwrap_or(body);

        Err(GitHubError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl DeploymentApi for GitHubClient {
    #[instrument(skip(self, body), fields(issue_number = %issue_number))]
    async fn create_comment(&self, issue_number: u64, body: &str) -> Result<(), GitHubError> {
        let issue = issue_number.to_string();
        let url = self.repo_url(&["issues", &issue, "comments"])?;

        let response = Self::send(
            self.request(Method::POST, url, GITHUB_JSON)
                .json(&json!({ "body": body })),
        )
        .await?;
        let comment: CreatedComment = response.json().await?;

        info!(
            comment_id = comment.id,
            "Created comment on #{}", issue_number
        );
        Ok(())
    }

    #[instrument(skip(self, inputs), fields(workflow_id = %workflow_id, git_ref = %git_ref))]
    async fn create_workflow_dispatch(
        &self,
        workflow_id: &str,
        git_ref: &str,
        inputs: &Map<String, Value>,
    ) -> Result<(), GitHubError> {
        let url = self.repo_url(&["actions", "workflows", workflow_id, "dispatches"])?;

        Self::send(
            self.request(Method::POST, url, GITHUB_JSON)
                .json(&json!({ "ref": git_ref, "inputs": inputs })),
        )
        .await?;

        info!("Dispatched workflow {} on {}", workflow_id, git_ref);
        Ok(())
    }

    #[instrument(skip(self), fields(issue_number = %issue_number, label = %name))]
    async fn remove_label(&self, issue_number: u64, name: &str) -> Result<(), GitHubError> {
        let issue = issue_number.to_string();
        let url = self.repo_url(&["issues", &issue, "labels", name])?;

        Self::send(self.request(Method::DELETE, url, GITHUB_JSON)).await?;

        debug!("Removed label '{}' from #{}", name, issue_number);
        Ok(())
    }

    #[instrument(skip(self), fields(git_ref = %git_ref))]
    async fn list_deployments(&self, git_ref: &str) -> Result<Vec<Deployment>, GitHubError> {
        let mut url = self.repo_url(&["deployments"])?;
        url.query_pairs_mut()
            .append_pair("ref", git_ref)
            .append_pair("per_page", PAGE_SIZE);

        let response = Self::send(self.request(Method::GET, url, GITHUB_JSON)).await?;
        let deployments: Vec<Deployment> = response.json().await?;

        debug!("Found {} deployments for {}", deployments.len(), git_ref);
        Ok(deployments)
    }

    #[instrument(skip(self), fields(deployment_id = %deployment_id))]
    async fn list_deployment_statuses(
        &self,
        deployment_id: u64,
    ) -> Result<Vec<DeploymentStatus>, GitHubError> {
        let id = deployment_id.to_string();
        let mut url = self.repo_url(&["deployments", &id, "statuses"])?;
        url.query_pairs_mut().append_pair("per_page", PAGE_SIZE);

        let response = Self::send(self.request(Method::GET, url, GITHUB_JSON)).await?;
        let statuses: Vec<DeploymentStatus> = response.json().await?;

        debug!(
            "Found {} statuses for deployment {}",
            statuses.len(),
            deployment_id
        );
        Ok(statuses)
    }

    #[instrument(skip(self, description), fields(deployment_id = %deployment_id, state = %state))]
    async fn create_deployment_status(
        &self,
        deployment_id: u64,
        state: DeploymentState,
        description: &str,
    ) -> Result<(), GitHubError> {
        let id = deployment_id.to_string();
        let url = self.repo_url(&["deployments", &id, "statuses"])?;

        Self::send(
            self.request(Method::POST, url, DEPLOYMENT_STATUS_PREVIEWS)
                .json(&json!({ "state": state, "description": description })),
        )
        .await?;

        debug!("Deployment {} set to {}", deployment_id, state);
        Ok(())
    }
}
