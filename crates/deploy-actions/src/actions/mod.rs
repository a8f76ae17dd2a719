//! The three deployment actions.
//!
//! Each runner receives its collaborators (API client, toolkit, trigger
//! context) at construction and exposes the action's steps as methods, with
//! `run()` executing them in order.

pub mod deactivate;
pub mod deployment_info;
pub mod label_deploy;

pub use deactivate::{DeactivateRunner, DeactivationOutcome, DeactivationReport};
pub use deployment_info::{DeploymentInfo, DeploymentInfoRunner};
pub use label_deploy::{LabelDeployRunner, LabelInfo};
