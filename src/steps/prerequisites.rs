use crate::error::{ProvisionError, Result};
use crate::steps::{Completion, ProvisioningStep, StepEnv};
use async_trait::async_trait;

/// 패키지 인덱스 갱신, 업그레이드, 기본 도구 설치
///
/// 멱등성 검사 없이 항상 실행합니다. apt 자체가 재실행에 안전합니다.
pub struct PrerequisitesStep;

#[async_trait]
impl ProvisioningStep for PrerequisitesStep {
    fn name(&self) -> &str {
        "prerequisites"
    }

    async fn apply(&self, env: &StepEnv<'_>) -> Result<Completion> {
        let spinner = env.reporter.spinner("Updating package index...");
        let updated = env.exec.execute("apt-get", &["update"]).await;
        spinner.finish_and_clear();
        updated.map_err(|e| ProvisionError::step("Failed to update the package index", e))?;

        let spinner = env.reporter.spinner("Upgrading installed packages...");
        let upgraded = env.exec.execute("apt-get", &["upgrade", "-y"]).await;
        spinner.finish_and_clear();
        upgraded.map_err(|e| ProvisionError::step("Failed to upgrade installed packages", e))?;

        let packages = &env.config.prerequisite_packages;
        if packages.is_empty() {
            return Ok(Completion::Succeeded);
        }

        let list = packages.join(" ");
        let mut args = vec!["install", "-y"];
        args.extend(packages.iter().map(String::as_str));

        let spinner = env.reporter.spinner(&format!("Installing {}...", list));
        let installed = env.exec.execute("apt-get", &args).await;
        spinner.finish_and_clear();
        installed
            .map_err(|e| ProvisionError::step(format!("Failed to install packages: {}", list), e))?;

        env.reporter.info(format!("Installed {}", list));
        Ok(Completion::Succeeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::Diagnostic;
    use crate::executor::testing::FakeHost;
    use crate::steps::StepResult;
    use crate::ui::Reporter;

    #[tokio::test]
    async fn test_runs_update_upgrade_install_in_order() {
        let config = Config::default();
        let host = FakeHost::new();
        let reporter = Reporter::capturing();
        let env = StepEnv {
            config: &config,
            exec: &host,
            reporter: &reporter,
        };

        assert_eq!(PrerequisitesStep.run(&env).await, StepResult::Succeeded);

        let calls = host.calls();
        assert_eq!(calls[0], "apt-get update");
        assert_eq!(calls[1], "apt-get upgrade -y");
        assert_eq!(
            calls[2],
            "apt-get install -y ca-certificates curl gnupg lsb-release git ufw"
        );
    }

    #[tokio::test]
    async fn test_install_failure_names_packages() {
        let config = Config::default();
        let host = FakeHost::new().with(|s| s.fail_on = Some("apt-get install".to_string()));
        let reporter = Reporter::capturing();
        let env = StepEnv {
            config: &config,
            exec: &host,
            reporter: &reporter,
        };

        match PrerequisitesStep.run(&env).await {
            StepResult::Failed(Diagnostic {
                cause,
                command,
                output,
                ..
            }) => {
                assert!(cause.contains("ca-certificates curl gnupg"));
                assert!(command.unwrap().starts_with("apt-get install -y"));
                assert_eq!(output.as_deref(), Some("simulated failure"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
