use crate::checks::runtime_installed;
use crate::error::{ProvisionError, Result};
use crate::steps::{Completion, ProvisioningStep, StepEnv};
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;

/// 컨테이너 런타임 (docker engine + compose plugin) 설치
pub struct RuntimeStep;

impl RuntimeStep {
    /// 저장소 정의 한 줄
    pub fn repository_entry(arch: &str, keyring: &Path, repo_url: &str, codename: &str) -> String {
        format!(
            "deb [arch={} signed-by={}] {} {} stable\n",
            arch,
            keyring.display(),
            repo_url,
            codename
        )
    }

    async fn query(env: &StepEnv<'_>, program: &str, args: &[&str], what: &str) -> Result<String> {
        let output = env
            .exec
            .execute(program, args)
            .await
            .map_err(|e| ProvisionError::step(format!("Failed to detect the {}", what), e))?;

        let value = output.stdout.trim().to_string();
        if value.is_empty() {
            return Err(ProvisionError::cause(format!("Could not detect the {}", what)));
        }
        Ok(value)
    }
}

#[async_trait]
impl ProvisioningStep for RuntimeStep {
    fn name(&self) -> &str {
        "container runtime"
    }

    async fn apply(&self, env: &StepEnv<'_>) -> Result<Completion> {
        if runtime_installed(env.exec).await {
            return Ok(Completion::Skipped(
                "docker and docker compose are already installed".to_string(),
            ));
        }

        let runtime = &env.config.runtime;
        let paths = &env.config.paths;
        let keyring = runtime.keyring_path(paths);

        // 1. 서명 키 등록
        fs::create_dir_all(&paths.keyring_dir).await?;
        let script = format!(
            "set -o pipefail; curl -fsSL {} | gpg --dearmor --yes -o {}",
            runtime.gpg_url,
            keyring.display()
        );
        env.exec.execute_shell(&script).await.map_err(|e| {
            ProvisionError::step(
                format!("Failed to download the signing key from {}", runtime.gpg_url),
                e,
            )
        })?;
        let keyring_arg = keyring.display().to_string();
        env.exec
            .execute("chmod", &["a+r", keyring_arg.as_str()])
            .await
            .map_err(|e| ProvisionError::step("Failed to make the signing key readable", e))?;

        // 2. 저장소 등록
        let arch = Self::query(env, "dpkg", &["--print-architecture"], "system architecture").await?;
        let codename = Self::query(env, "lsb_release", &["-cs"], "distribution codename").await?;
        let entry = Self::repository_entry(&arch, &keyring, &runtime.repo_url, &codename);

        if let Some(parent) = paths.apt_source_file.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&paths.apt_source_file, entry).await.map_err(|e| {
            ProvisionError::step(
                format!("Failed to write {}", paths.apt_source_file.display()),
                e.into(),
            )
        })?;

        // 3. 설치
        let spinner = env.reporter.spinner("Updating package index...");
        let updated = env.exec.execute("apt-get", &["update"]).await;
        spinner.finish_and_clear();
        updated.map_err(|e| ProvisionError::step("Failed to update the package index", e))?;

        let list = runtime.packages.join(" ");
        let mut args = vec!["install", "-y"];
        args.extend(runtime.packages.iter().map(String::as_str));

        let spinner = env.reporter.spinner(&format!("Installing {}...", list));
        let installed = env.exec.execute("apt-get", &args).await;
        spinner.finish_and_clear();
        installed.map_err(|e| {
            ProvisionError::step(format!("Failed to install the container runtime: {}", list), e)
        })?;

        // 4. 서비스 활성화
        env.exec
            .execute("systemctl", &["enable", "--now", runtime.service.as_str()])
            .await
            .map_err(|e| {
                ProvisionError::step(format!("Failed to start the {} service", runtime.service), e)
            })?;

        env.reporter.info(format!("Installed {}", list));
        Ok(Completion::Succeeded)
    }
}
