//! Error types for the deployment actions.

use thiserror::Error;

use crate::github::GitHubError;

/// Errors that abort an action run.
///
/// Every variant is fatal: the binaries report it as the action failure and
/// exit non-zero.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The triggering event lacks the payload fields the action needs
    #[error("{0}")]
    InvalidTrigger(String),

    /// The triggering event is of the wrong type
    #[error("{0}")]
    WrongTrigger(String),

    /// A required input was not supplied
    #[error("Input required and not supplied: {0}")]
    MissingInput(String),

    /// The configured environment pattern does not compile
    #[error("Invalid environment-regex '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The label did not match the configured environment pattern
    #[error("Cannot extract environment from label (no regex match)")]
    EnvironmentExtraction,

    /// A supplemental input could not be interpreted
    #[error("{0}")]
    InvalidInputFormat(String),

    /// A boolean input is not a YAML 1.2 core-schema boolean
    #[error(
        "Input does not meet YAML 1.2 \"Core Schema\" specification: {name}\n\
         Support boolean input list: `true | True | TRUE | false | False | FALSE`"
    )]
    InvalidBooleanInput { name: String, value: String },

    /// The hosting API rejected a call
    #[error(transparent)]
    Api(#[from] GitHubError),

    /// Writing an action output failed
    #[error("Failed to write action output: {0}")]
    Output(#[from] std::io::Error),
}

impl ActionError {
    /// Whether this error was raised before any work was attempted because the
    /// trigger did not fit the action.
    #[must_use]
    pub fn is_trigger_mismatch(&self) -> bool {
        matches!(self, Self::InvalidTrigger(_) | Self::WrongTrigger(_))
    }
}

/// Convenience alias used throughout the actions.
pub type Result<T, E = ActionError> = std::result::Result<T, E>;
