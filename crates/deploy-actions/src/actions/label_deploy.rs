//! # Label-triggered deployment requests
//!
//! Runs on `pull_request` `labeled` events. The label text selects an
//! environment via the `environment-regex` input; the action acknowledges the
//! request on the PR, dispatches the deployment workflow on the PR branch and
//! finally removes the label so it can be applied again.
//!
//! Steps run strictly in order and the first failure aborts the rest. Nothing
//! is rolled back: if the dispatch fails the label stays on the PR.

use std::sync::Arc;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{error, info};

use crate::context::EventContext;
use crate::error::{ActionError, Result};
use crate::github::DeploymentApi;
use crate::toolkit::{LogGroup, Toolkit};

pub const ACTION_NAME: &str = "create-deployment-from-label";

pub const INPUT_ENVIRONMENT_REGEX: &str = "environment-regex";
pub const INPUT_CREATE_COMMENT: &str = "create-comment";
pub const INPUT_DEPLOYMENT_WORKFLOW_NAME: &str = "deployment-workflow-name";
pub const INPUT_ADDITIONAL_INPUTS_JSON: &str = "additional-inputs-json";

pub const OUTPUT_ENVIRONMENT: &str = "environment";

/// Dispatch input carrying the extracted environment.
pub const ENVIRONMENT_INPUT_KEY: &str = "environment";

const LABELED_EVENT_REQUIRED: &str = "This action must be run from a PR 'labeled' event";
const ADDITIONAL_INPUTS_INVALID: &str = "Could not parse additional inputs (invalid JSON)";

/// Label that triggered the run and the environment extracted from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelInfo {
    /// Lower-cased label text
    pub label: String,
    pub environment: String,
}

/// Extract the environment from `label`: capture group 1 of `pattern`, or an
/// empty string when the pattern matches without a first group.
pub fn extract_environment(label: &str, pattern: &str) -> Result<String> {
    let matcher = Regex::new(pattern).map_err(|source| ActionError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let captures = matcher
        .captures(label)
        .ok_or(ActionError::EnvironmentExtraction)?;

    Ok(captures
        .get(1)
        .map(|group| group.as_str().to_string())
        .unwrap_or_default())
}

/// Build workflow dispatch inputs: `{environment}` with the additional JSON
/// object merged over it. Keys from `additional` win, `environment` included.
pub fn dispatch_inputs(environment: &str, additional: Option<&str>) -> Result<Map<String, Value>> {
    let mut inputs = Map::new();
    inputs.insert(
        ENVIRONMENT_INPUT_KEY.to_string(),
        Value::String(environment.to_string()),
    );

    let Some(raw) = additional else {
        return Ok(inputs);
    };

    info!("Additional inputs input: {}", raw);
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(extra)) => {
            inputs.extend(extra);
            Ok(inputs)
        }
        Ok(other) => {
            error!(value = %other, "Additional inputs must be a JSON object");
            Err(ActionError::InvalidInputFormat(
                ADDITIONAL_INPUTS_INVALID.to_string(),
            ))
        }
        Err(e) => {
            error!(error = %e, "Could not parse additional inputs");
            Err(ActionError::InvalidInputFormat(
                ADDITIONAL_INPUTS_INVALID.to_string(),
            ))
        }
    }
}

/// Acknowledgement posted on the pull request.
#[must_use]
pub fn comment_body(actor: &str, label: &str) -> String {
    format!("👋 Request from @{actor} for deployment received using _{label}_ :rocket:")
}

/// Requests a deployment from a PR label.
pub struct LabelDeployRunner {
    api: Arc<dyn DeploymentApi>,
    toolkit: Arc<dyn Toolkit>,
    context: EventContext,
}

impl LabelDeployRunner {
    pub fn new(
        api: Arc<dyn DeploymentApi>,
        toolkit: Arc<dyn Toolkit>,
        context: EventContext,
    ) -> Self {
        Self {
            api,
            toolkit,
            context,
        }
    }

    /// The event must carry both a pull request and a label.
    pub fn validate(&self) -> Result<()> {
        let payload = &self.context.payload;
        if payload.pull_request.is_none() || payload.label.is_none() {
            return Err(ActionError::InvalidTrigger(
                LABELED_EVENT_REQUIRED.to_string(),
            ));
        }
        Ok(())
    }

    fn label_name(&self) -> Result<&str> {
        self.context
            .payload
            .label
            .as_ref()
            .map(|label| label.name.as_str())
            .ok_or_else(|| ActionError::InvalidTrigger(LABELED_EVENT_REQUIRED.to_string()))
    }

    fn issue_number(&self) -> Result<u64> {
        self.context.issue_number().ok_or_else(|| {
            ActionError::InvalidTrigger("Pull request number missing from event payload".to_string())
        })
    }

    /// Extract the environment from the label and publish it as the
    /// `environment` output.
    pub fn parse_label(&self) -> Result<LabelInfo> {
        let _group = LogGroup::start(self.toolkit.as_ref(), "Parse label");

        let label = self.label_name()?.to_lowercase();
        info!("Detected label: {}", label);

        let pattern = self.toolkit.required_input(INPUT_ENVIRONMENT_REGEX)?;
        info!("Using regex {} to extract environment", pattern);

        let environment = extract_environment(&label, &pattern)?;
        info!("Environment is {}", environment);

        self.toolkit.set_output(OUTPUT_ENVIRONMENT, &environment)?;

        Ok(LabelInfo { label, environment })
    }

    /// Post the acknowledgement comment unless `create-comment` is false.
    pub async fn create_comment(&self, info: &LabelInfo) -> Result<()> {
        let _group = LogGroup::start(self.toolkit.as_ref(), "Create comment");

        if self.toolkit.boolean_input(INPUT_CREATE_COMMENT, true)? {
            let issue_number = self.issue_number()?;
            let body = comment_body(&self.context.actor, &info.label);
            self.api.create_comment(issue_number, &body).await?;
            info!("Created deployment comment!");
        } else {
            info!("Create comment skipped!");
        }

        Ok(())
    }

    /// Dispatch the deployment workflow on the pull request's source branch.
    pub async fn invoke_deployment_workflow(&self, info: &LabelInfo) -> Result<()> {
        let _group = LogGroup::start(self.toolkit.as_ref(), "Invoke deployment workflow");

        let workflow = self.toolkit.required_input(INPUT_DEPLOYMENT_WORKFLOW_NAME)?;
        info!("Workflow name: {}", workflow);

        let additional = self.toolkit.input(INPUT_ADDITIONAL_INPUTS_JSON);
        let inputs = dispatch_inputs(&info.environment, additional.as_deref())?;
        let final_inputs = Value::Object(inputs.clone());
        info!("Final inputs: {}", final_inputs);

        let git_ref = self.context.head_ref().ok_or_else(|| {
            ActionError::InvalidTrigger("Pull request head ref missing from event payload".to_string())
        })?;

        info!("Invoking workflow...");
        self.api
            .create_workflow_dispatch(&workflow, git_ref, &inputs)
            .await?;

        Ok(())
    }

    /// Remove the triggering label from the pull request.
    pub async fn remove_label(&self) -> Result<()> {
        info!("Removing label...");
        let issue_number = self.issue_number()?;
        let name = self.label_name()?;
        self.api.remove_label(issue_number, name).await?;
        Ok(())
    }

    /// validate → parse label → comment → dispatch → remove label.
    pub async fn run(&self) -> Result<LabelInfo> {
        self.validate()?;
        let info = self.parse_label()?;
        self.create_comment(&info).await?;
        self.invoke_deployment_workflow(&info).await?;
        self.remove_label().await?;
        Ok(info)
    }
}
