use crate::error::{ProvisionError, Result};
use crate::executor::{display_command, CommandExecutor, Output};
use async_trait::async_trait;
use tokio::process::Command;

pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for CommandRunner {
    async fn execute(&self, program: &str, args: &[&str]) -> Result<Output> {
        let command = display_command(program, args);
        tracing::debug!(%command, "running");

        // 타임아웃 없음: 명령어가 끝날 때까지 기다림
        let output = Command::new(program)
            .args(args)
            .env("DEBIAN_FRONTEND", "noninteractive")
            .output()
            .await
            .map_err(|source| ProvisionError::Spawn {
                command: command.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        // 시그널로 종료된 경우 종료 코드가 없음
        let exit_code = output.status.code().unwrap_or(-1);

        tracing::debug!(%command, exit_code, "finished");

        if !output.status.success() {
            return Err(ProvisionError::Execution {
                command,
                exit_code,
                stderr: if stderr.trim().is_empty() { stdout } else { stderr },
            });
        }

        Ok(Output {
            stdout,
            stderr,
            exit_code,
        })
    }
}
