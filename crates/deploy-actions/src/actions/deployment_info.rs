//! Republishes a `deployment_status` event's deployment ref and environment as
//! action outputs.

use std::sync::Arc;

use tracing::info;

use crate::context::{EventContext, DEPLOYMENT_STATUS_EVENT};
use crate::error::{ActionError, Result};
use crate::toolkit::{LogGroup, Toolkit};

pub const ACTION_NAME: &str = "extract-deployment-info";

pub const OUTPUT_DEPLOYMENT_REF: &str = "deployment_ref";
pub const OUTPUT_ENVIRONMENT: &str = "environment";

/// Values published by the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentInfo {
    pub deployment_ref: String,
    pub environment: String,
}

pub struct DeploymentInfoRunner {
    toolkit: Arc<dyn Toolkit>,
    context: EventContext,
}

impl DeploymentInfoRunner {
    pub fn new(toolkit: Arc<dyn Toolkit>, context: EventContext) -> Self {
        Self { toolkit, context }
    }

    pub fn run(&self) -> Result<DeploymentInfo> {
        if self.context.event_name != DEPLOYMENT_STATUS_EVENT {
            return Err(ActionError::WrongTrigger(format!(
                "This Action only works for '{DEPLOYMENT_STATUS_EVENT}' triggers"
            )));
        }

        let deployment = self.context.payload.deployment.as_ref().ok_or_else(|| {
            ActionError::InvalidTrigger(
                "deployment_status event payload is missing the deployment".to_string(),
            )
        })?;

        {
            let _group = LogGroup::start(self.toolkit.as_ref(), "Set outputs");
            self.set_output(OUTPUT_DEPLOYMENT_REF, &deployment.ref_name)?;
            self.set_output(OUTPUT_ENVIRONMENT, &deployment.environment)?;
        }

        Ok(DeploymentInfo {
            deployment_ref: deployment.ref_name.clone(),
            environment: deployment.environment.clone(),
        })
    }

    fn set_output(&self, name: &str, value: &str) -> Result<()> {
        self.toolkit.set_output(name, value)?;
        info!("   {}: {}", name, value);
        Ok(())
    }
}
