use crate::checks::hosts_has_loopback_entry;
use crate::error::{ProvisionError, Result};
use crate::steps::{Completion, ProvisioningStep, StepEnv};
use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// hosts 파일에 현재 hostname의 루프백 바인딩 추가
///
/// `sudo`가 "unable to resolve host" 경고를 내지 않도록 하기 위함입니다.
pub struct HostnameStep;

#[async_trait]
impl ProvisioningStep for HostnameStep {
    fn name(&self) -> &str {
        "hostname"
    }

    async fn apply(&self, env: &StepEnv<'_>) -> Result<Completion> {
        let output = env
            .exec
            .execute("hostname", &[])
            .await
            .map_err(|e| ProvisionError::step("Failed to read the current hostname", e))?;
        let hostname = output.stdout.trim().to_string();
        if hostname.is_empty() {
            return Err(ProvisionError::cause("The current hostname is empty"));
        }

        let hosts_file = &env.config.paths.hosts_file;
        let contents = fs::read_to_string(hosts_file).await.map_err(|e| {
            ProvisionError::step(
                format!("Failed to read {}", hosts_file.display()),
                e.into(),
            )
        })?;

        if hosts_has_loopback_entry(&contents, &hostname) {
            return Ok(Completion::Skipped(format!(
                "127.0.0.1 {} already present in {}",
                hostname,
                hosts_file.display()
            )));
        }

        env.reporter
            .info(format!("Binding {} to 127.0.0.1 in {}", hostname, hosts_file.display()));

        let mut line = String::new();
        if !contents.is_empty() && !contents.ends_with('\n') {
            line.push('\n');
        }
        line.push_str(&format!("127.0.0.1 {}\n", hostname));

        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(hosts_file)
            .await
            .map_err(|e| {
                ProvisionError::step(format!("Failed to open {}", hosts_file.display()), e.into())
            })?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(Completion::Succeeded)
    }
}
