pub mod runner;

#[cfg(test)]
pub mod testing;

use crate::error::Result;
use async_trait::async_trait;

pub use runner::CommandRunner;

/// 완료된 명령어의 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// 호스트 환경에서 외부 명령어를 실행하는 유일한 창구
///
/// 0이 아닌 종료 코드는 `ProvisionError::Execution`으로, 실행 자체의 실패는
/// `ProvisionError::Spawn`으로 돌려줍니다. 재시도는 호출하는 단계의 몫입니다.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, program: &str, args: &[&str]) -> Result<Output>;

    /// `bash -c`로 파이프라인 실행
    async fn execute_shell(&self, script: &str) -> Result<Output> {
        self.execute("bash", &["-c", script]).await
    }

    /// 성공 여부만 확인 (읽기 전용 검사용)
    async fn probe(&self, program: &str, args: &[&str]) -> bool {
        self.execute(program, args).await.is_ok()
    }
}

/// 로그와 에러 메시지에 쓰는 명령어 표기
pub fn display_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
