use crate::checks::{is_already_exists, network_exists};
use crate::error::{ProvisionError, Result};
use crate::steps::{Completion, ProvisioningStep, StepEnv};
use async_trait::async_trait;

/// 서비스들이 공유하는 docker 네트워크 생성
pub struct NetworkStep;

#[async_trait]
impl ProvisioningStep for NetworkStep {
    fn name(&self) -> &str {
        "network"
    }

    async fn apply(&self, env: &StepEnv<'_>) -> Result<Completion> {
        let name = env.config.network_name.as_str();

        if network_exists(env.exec, name).await {
            return Ok(Completion::Skipped(format!("network {} already exists", name)));
        }

        match env.exec.execute("docker", &["network", "create", name]).await {
            Ok(_) => Ok(Completion::Succeeded),
            Err(ProvisionError::Execution { stderr, .. }) if is_already_exists(&stderr) => {
                Ok(Completion::Skipped(format!("network {} already exists", name)))
            }
            Err(e) => Err(ProvisionError::step(
                format!("Failed to create network {}", name),
                e,
            )),
        }
    }
}
