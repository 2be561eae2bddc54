use crate::config::Config;
use crate::error::{Diagnostic, ProvisionError, Result};
use crate::executor::CommandExecutor;
use crate::privilege::require_root;
use crate::steps::{default_steps, ProvisioningStep, StepEnv, StepResult};
use crate::summary::{render_summary, resolve_host_address};
use crate::ui::Reporter;
use std::time::Instant;

/// 실행 상태
///
/// ```text
/// NotStarted ──precheck──▶ Running(0) ──▶ Running(1) ──▶ … ──▶ Succeeded
///                              │              │
///                              └──── Failed ──┴──▶ Aborted(i, diagnostic)
/// ```
///
/// 실패한 단계 이후는 실행하지 않으며, 이전 단계는 되돌리지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running(usize),
    Succeeded,
    Aborted {
        index: usize,
        step: String,
        diagnostic: Diagnostic,
    },
}

/// 성공한 실행의 결과
#[derive(Debug)]
pub struct RunReport {
    pub outcomes: Vec<(String, StepResult)>,
    pub address: String,
    #[allow(dead_code)] // 이미 reporter로 출력됨
    pub summary: String,
}

impl RunReport {
    /// 건너뛴 단계 이름들
    pub fn skipped(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, r)| matches!(r, StepResult::Skipped(_)))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

pub struct Orchestrator<'a> {
    config: &'a Config,
    exec: &'a dyn CommandExecutor,
    reporter: &'a Reporter,
    euid: u32,
    steps: Vec<Box<dyn ProvisioningStep>>,
    state: RunState,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a Config,
        exec: &'a dyn CommandExecutor,
        reporter: &'a Reporter,
        euid: u32,
    ) -> Self {
        Self {
            config,
            exec,
            reporter,
            euid,
            steps: default_steps(config),
            state: RunState::NotStarted,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// 권한 확인 후 모든 단계를 순서대로 실행하고 요약을 출력
    pub async fn run(&mut self) -> Result<RunReport> {
        require_root(self.euid)?;

        let env = StepEnv {
            config: self.config,
            exec: self.exec,
            reporter: self.reporter,
        };
        let total = self.steps.len();
        let mut outcomes = Vec::with_capacity(total);

        for (index, step) in self.steps.iter().enumerate() {
            self.state = RunState::Running(index);
            self.reporter
                .info(format!("[{}/{}] {}", index + 1, total, step.name()));

            let started = Instant::now();
            let result = step.run(&env).await;
            let elapsed = started.elapsed().as_millis();

            match &result {
                StepResult::Succeeded => {
                    self.reporter
                        .success(format!("{} done ({}ms)", step.name(), elapsed));
                }
                StepResult::Skipped(reason) if step.warn_on_skip() => {
                    self.reporter
                        .warning(format!("{} skipped: {}", step.name(), reason));
                }
                StepResult::Skipped(reason) => {
                    self.reporter
                        .success(format!("{} skipped: {}", step.name(), reason));
                }
                StepResult::Failed(diagnostic) => {
                    self.state = RunState::Aborted {
                        index,
                        step: step.name().to_string(),
                        diagnostic: diagnostic.clone(),
                    };
                    return Err(ProvisionError::StepFailed {
                        step: step.name().to_string(),
                        diagnostic: diagnostic.clone(),
                    });
                }
            }

            outcomes.push((step.name().to_string(), result));
        }

        self.state = RunState::Succeeded;

        let address = resolve_host_address(self.exec, &self.config.ip_lookup_url).await;
        let summary = render_summary(self.config, &address, chrono::Local::now());
        self.reporter.block(&summary);

        Ok(RunReport {
            outcomes,
            address,
            summary,
        })
    }
}
