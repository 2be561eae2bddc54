pub mod hostname;
pub mod network;
pub mod prerequisites;
pub mod runtime;
pub mod service;

use crate::config::Config;
use crate::error::{Diagnostic, Result};
use crate::executor::CommandExecutor;
use crate::ui::Reporter;
use async_trait::async_trait;

pub use hostname::HostnameStep;
pub use network::NetworkStep;
pub use prerequisites::PrerequisitesStep;
pub use runtime::RuntimeStep;
pub use service::ServiceStep;

/// 단계가 정상적으로 끝났을 때의 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// 이미 원하는 상태라서 아무것도 하지 않음
    Skipped(String),
    Succeeded,
}

/// 한 단계의 최종 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    Skipped(String),
    Succeeded,
    Failed(Diagnostic),
}

impl From<Result<Completion>> for StepResult {
    fn from(result: Result<Completion>) -> Self {
        match result {
            Ok(Completion::Skipped(reason)) => StepResult::Skipped(reason),
            Ok(Completion::Succeeded) => StepResult::Succeeded,
            Err(err) => StepResult::Failed(Diagnostic::from(&err)),
        }
    }
}

/// 모든 단계가 읽기 전용으로 공유하는 실행 환경
pub struct StepEnv<'a> {
    pub config: &'a Config,
    pub exec: &'a dyn CommandExecutor,
    pub reporter: &'a Reporter,
}

/// 프로비저닝 단계
///
/// `apply`는 멱등성 검사를 먼저 수행하고, 이미 만족된 경우 `Completion::Skipped`를 돌려줘야 합니다.
#[async_trait]
pub trait ProvisioningStep: Send + Sync {
    fn name(&self) -> &str;

    async fn apply(&self, env: &StepEnv<'_>) -> Result<Completion>;

    /// 건너뛴 경우 경고로 보고할지 (기존 리소스가 에러는 아니지만 알릴 필요가 있을 때)
    fn warn_on_skip(&self) -> bool {
        false
    }

    async fn run(&self, env: &StepEnv<'_>) -> StepResult {
        self.apply(env).await.into()
    }
}

/// 고정된 순서의 프로비저닝 단계 목록
pub fn default_steps(config: &Config) -> Vec<Box<dyn ProvisioningStep>> {
    let mut steps: Vec<Box<dyn ProvisioningStep>> = vec![
        Box::new(HostnameStep),
        Box::new(PrerequisitesStep),
        Box::new(RuntimeStep),
        Box::new(NetworkStep),
    ];

    for service in &config.services {
        steps.push(Box::new(ServiceStep::new(service.clone())));
    }

    steps
}
