//! # Action toolkit
//!
//! Named inputs, named outputs and log groups, following the GitHub Actions
//! runner conventions:
//!
//! - inputs arrive as `INPUT_<NAME>` environment variables
//! - outputs are appended to the file named by `GITHUB_OUTPUT`
//! - `::group::` / `::endgroup::` fold log sections
//!
//! [`EnvToolkit`] talks to the runner; [`MemoryToolkit`] keeps everything in
//! memory for dry runs and tests.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use tracing::debug;
use uuid::Uuid;

use crate::error::{ActionError, Result};

/// Environment variable naming the runner's output file.
pub const ENV_GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";

const INPUT_PREFIX: &str = "INPUT_";

/// Access to action inputs and outputs.
pub trait Toolkit: Send + Sync {
    /// Raw input value. Blank values count as absent.
    fn input(&self, name: &str) -> Option<String>;

    /// Publish a named output.
    fn set_output(&self, name: &str, value: &str) -> std::io::Result<()>;

    /// Open a collapsible log section.
    fn start_group(&self, name: &str);

    /// Close the current log section.
    fn end_group(&self);

    /// Input that must be present.
    fn required_input(&self, name: &str) -> Result<String> {
        self.input(name)
            .ok_or_else(|| ActionError::MissingInput(name.to_string()))
    }

    /// Boolean input using the YAML 1.2 core-schema spellings, falling back to
    /// `default` when the input is absent.
    fn boolean_input(&self, name: &str, default: bool) -> Result<bool> {
        match self.input(name) {
            None => Ok(default),
            Some(value) => parse_boolean(name, &value),
        }
    }
}

/// Open log group, closed when dropped so error returns still end it.
#[must_use = "the group closes as soon as the guard is dropped"]
pub struct LogGroup<'a> {
    toolkit: &'a dyn Toolkit,
}

impl<'a> LogGroup<'a> {
    pub fn start(toolkit: &'a dyn Toolkit, name: &str) -> Self {
        toolkit.start_group(name);
        Self { toolkit }
    }
}

impl Drop for LogGroup<'_> {
    fn drop(&mut self) {
        self.toolkit.end_group();
    }
}

fn parse_boolean(name: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "True" | "TRUE" => Ok(true),
        "false" | "False" | "FALSE" => Ok(false),
        _ => Err(ActionError::InvalidBooleanInput {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

fn normalize(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Environment variable carrying input `name`.
#[must_use]
pub fn input_env_var(name: &str) -> String {
    format!("{INPUT_PREFIX}{}", name.replace(' ', "_").to_uppercase())
}

/// Toolkit backed by the Actions runner environment.
#[derive(Debug, Default)]
pub struct EnvToolkit {
    inputs: HashMap<String, String>,
    output_file: Option<PathBuf>,
}

impl EnvToolkit {
    /// Snapshot `INPUT_*` variables and the output file location.
    #[must_use]
    pub fn from_env() -> Self {
        let inputs = std::env::vars()
            .filter(|(key, _)| key.starts_with(INPUT_PREFIX))
            .collect();
        let output_file = std::env::var_os(ENV_GITHUB_OUTPUT)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        Self {
            inputs,
            output_file,
        }
    }

    /// Toolkit with explicit inputs (keyed by input name) and output file.
    #[must_use]
    pub fn with_parts(inputs: &HashMap<String, String>, output_file: Option<PathBuf>) -> Self {
        Self {
            inputs: inputs
                .iter()
                .map(|(name, value)| (input_env_var(name), value.clone()))
                .collect(),
            output_file,
        }
    }
}

impl Toolkit for EnvToolkit {
    fn input(&self, name: &str) -> Option<String> {
        self.inputs
            .get(&input_env_var(name))
            .and_then(|value| normalize(value))
    }

    fn set_output(&self, name: &str, value: &str) -> std::io::Result<()> {
        match &self.output_file {
            Some(path) => {
                let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                write!(file, "{name}<<{delimiter}\n{value}\n{delimiter}\n")?;
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout)?;
                writeln!(stdout, "::set-output name={name}::{value}")?;
            }
        }
        Ok(())
    }

    fn start_group(&self, name: &str) {
        println!("::group::{name}");
    }

    fn end_group(&self) {
        println!("::endgroup::");
    }
}

/// In-memory toolkit: inputs from a map, outputs recorded in order.
#[derive(Debug, Default)]
pub struct MemoryToolkit {
    inputs: HashMap<String, String>,
    outputs: Mutex<Vec<(String, String)>>,
    groups: Mutex<Vec<String>>,
}

impl MemoryToolkit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_input(mut self, name: &str, value: &str) -> Self {
        self.inputs.insert(name.to_string(), value.to_string());
        self
    }

    /// Outputs set so far, in emission order.
    #[must_use]
    pub fn outputs(&self) -> Vec<(String, String)> {
        self.outputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Groups started but not yet ended, outermost first.
    #[must_use]
    pub fn open_groups(&self) -> Vec<String> {
        self.groups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Most recent value of output `name`.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<String> {
        self.outputs()
            .into_iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

impl Toolkit for MemoryToolkit {
    fn input(&self, name: &str) -> Option<String> {
        self.inputs.get(name).and_then(|value| normalize(value))
    }

    fn set_output(&self, name: &str, value: &str) -> std::io::Result<()> {
        self.outputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((name.to_string(), value.to_string()));
        Ok(())
    }

    fn start_group(&self, name: &str) {
        debug!(group = name, "start group");
        self.groups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(name.to_string());
    }

    fn end_group(&self) {
        debug!("end group");
        self.groups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_input_env_var() {
        assert_eq!(input_env_var("environment-regex"), "INPUT_ENVIRONMENT-REGEX");
        assert_eq!(input_env_var("my input"), "INPUT_MY_INPUT");
    }

    #[test]
    fn test_blank_input_is_missing() {
        let toolkit = MemoryToolkit::new().with_input("token", "   ");
        assert!(toolkit.input("token").is_none());

        let err = toolkit.required_input("token").unwrap_err();
        assert_eq!(err.to_string(), "Input required and not supplied: token");
    }

    #[test]
    fn test_input_is_trimmed() {
        let toolkit = MemoryToolkit::new().with_input("deployment-workflow-name", " deploy.yml\n");
        assert_eq!(
            toolkit.required_input("deployment-workflow-name").unwrap(),
            "deploy.yml"
        );
    }

    #[test]
    fn test_boolean_input() {
        let toolkit = MemoryToolkit::new()
            .with_input("a", "True")
            .with_input("b", "FALSE")
            .with_input("c", "yes");

        assert!(toolkit.boolean_input("a", false).unwrap());
        assert!(!toolkit.boolean_input("b", true).unwrap());
        assert!(toolkit.boolean_input("missing", true).unwrap());
        assert!(matches!(
            toolkit.boolean_input("c", true),
            Err(ActionError::InvalidBooleanInput { .. })
        ));
    }

    #[test]
    fn test_memory_outputs_keep_order() {
        let toolkit = MemoryToolkit::new();
        toolkit.set_output("deployment_ref", "123").unwrap();
        toolkit.set_output("environment", "dev").unwrap();

        assert_eq!(
            toolkit.outputs(),
            vec![
                ("deployment_ref".to_string(), "123".to_string()),
                ("environment".to_string(), "dev".to_string()),
            ]
        );
        assert_eq!(toolkit.output("environment").as_deref(), Some("dev"));
    }

    #[test]
    fn test_log_group_closes_on_early_return() {
        fn failing_step(toolkit: &MemoryToolkit) -> Result<()> {
            let _group = LogGroup::start(toolkit, "Parse label");
            toolkit.required_input("environment-regex")?;
            Ok(())
        }

        let toolkit = MemoryToolkit::new();
        assert!(failing_step(&toolkit).is_err());
        assert!(toolkit.open_groups().is_empty());

        let group = LogGroup::start(&toolkit, "Set outputs");
        assert_eq!(toolkit.open_groups(), vec!["Set outputs".to_string()]);
        drop(group);
        assert!(toolkit.open_groups().is_empty());
    }

    #[test]
    fn test_output_file_uses_heredoc_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");
        let toolkit = EnvToolkit::with_parts(&HashMap::new(), Some(path.clone()));

        toolkit.set_output("environment", "dev").unwrap();
        toolkit.set_output("notes", "line one\nline two").unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 7);

        let (name, delimiter) = lines[0].split_once("<<").unwrap();
        assert_eq!(name, "environment");
        assert!(delimiter.starts_with("ghadelimiter_"));
        assert_eq!(lines[1], "dev");
        assert_eq!(lines[2], delimiter);
        assert!(lines[3].starts_with("notes<<ghadelimiter_"));
        assert_eq!(&lines[4..6], &["line one", "line two"]);
    }

    #[test]
    fn test_with_parts_maps_input_names() {
        let mut inputs = HashMap::new();
        inputs.insert("create-comment".to_string(), "false".to_string());
        let toolkit = EnvToolkit::with_parts(&inputs, None);

        assert!(!toolkit.boolean_input("create-comment", true).unwrap());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_inputs() {
        std::env::set_var("INPUT_ENVIRONMENT-REGEX", "deploy to (\\w+)");
        std::env::remove_var(ENV_GITHUB_OUTPUT);

        let toolkit = EnvToolkit::from_env();
        assert_eq!(
            toolkit.input("environment-regex").as_deref(),
            Some("deploy to (\\w+)")
        );
        assert!(toolkit.output_file.is_none());

        std::env::remove_var("INPUT_ENVIRONMENT-REGEX");
    }
}
