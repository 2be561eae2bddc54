use crate::checks::{container_exists, is_already_exists};
use crate::config::ServiceSpec;
use crate::error::{ProvisionError, Result};
use crate::steps::{Completion, ProvisioningStep, StepEnv};
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;

/// 컨테이너 서비스 하나를 프로비저닝 네트워크에 배포
pub struct ServiceStep {
    spec: ServiceSpec,
    name: String,
}

impl ServiceStep {
    pub fn new(spec: ServiceSpec) -> Self {
        let name = format!("service {}", spec.name);
        Self { spec, name }
    }

    /// `docker run` 인자 목록
    pub fn run_args(&self, network: &str, install_dir: &Path) -> Vec<String> {
        let mut args: Vec<String> = [
            "run",
            "-d",
            "--name",
            self.spec.name.as_str(),
            "--network",
            network,
            "--restart",
            "unless-stopped",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        for port in &self.spec.ports {
            args.push("-p".to_string());
            args.push(port.clone());
        }
        for volume in self.spec.volume_args(install_dir) {
            args.push("-v".to_string());
            args.push(volume);
        }

        args.push(self.spec.image.clone());
        args
    }

    async fn create_volume(&self, env: &StepEnv<'_>, volume: &str) -> Result<()> {
        match env.exec.execute("docker", &["volume", "create", volume]).await {
            Ok(_) => Ok(()),
            Err(ProvisionError::Execution { stderr, .. }) if is_already_exists(&stderr) => Ok(()),
            Err(e) => Err(ProvisionError::step(
                format!("Failed to create volume {}", volume),
                e,
            )),
        }
    }
}

#[async_trait]
impl ProvisioningStep for ServiceStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn warn_on_skip(&self) -> bool {
        true
    }

    async fn apply(&self, env: &StepEnv<'_>) -> Result<Completion> {
        if container_exists(env.exec, &self.spec.name).await {
            return Ok(Completion::Skipped(format!(
                "container {} already exists, leaving it as is",
                self.spec.name
            )));
        }

        let install_dir = &env.config.paths.install_dir;
        for dir in self.spec.state_dirs(install_dir) {
            fs::create_dir_all(&dir).await.map_err(|e| {
                ProvisionError::step(format!("Failed to create {}", dir.display()), e.into())
            })?;
        }

        for volume in self.spec.named_volumes() {
            self.create_volume(env, &volume).await?;
        }

        env.reporter
            .info(format!("Starting {} ({})", self.spec.title, self.spec.image));

        let args = self.run_args(&env.config.network_name, install_dir);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        env.exec.execute("docker", &args).await.map_err(|e| {
            ProvisionError::step(format!("Failed to start container {}", self.spec.name), e)
        })?;

        Ok(Completion::Succeeded)
    }
}
