//! Deployment records as returned by the GitHub REST API.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A deployment tracked by GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Deployment ID
    pub id: u64,

    /// Target environment name
    pub environment: String,

    /// Ref the deployment was created from
    #[serde(rename = "ref", default)]
    pub ref_name: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Deployment {
    #[must_use]
    pub fn new(id: u64, environment: impl Into<String>) -> Self {
        Self {
            id,
            environment: environment.into(),
            ref_name: String::new(),
            created_at: None,
        }
    }
}

/// One entry in a deployment's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStatus {
    pub state: DeploymentState,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl DeploymentStatus {
    #[must_use]
    pub fn new(state: DeploymentState) -> Self {
        Self {
            state,
            description: None,
            created_at: None,
        }
    }
}

/// Deployment status states.
///
/// States GitHub adds later deserialize as [`DeploymentState::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    Error,
    Failure,
    Inactive,
    InProgress,
    Queued,
    Pending,
    Success,
    #[serde(other)]
    Unknown,
}

impl DeploymentState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Failure => "failure",
            Self::Inactive => "inactive",
            Self::InProgress => "in_progress",
            Self::Queued => "queued",
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Unknown => "unknown",
        }
    }

    /// `failure` and `inactive` end the deactivation workflow.
    #[must_use]
    pub const fn is_deactivated(self) -> bool {
        matches!(self, Self::Failure | Self::Inactive)
    }
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
