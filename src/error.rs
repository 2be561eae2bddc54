use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("This program must be run as root (try: sudo {0})")]
    NotPrivileged(String),

    #[error("Command failed: {command} (exit code {exit_code})")]
    Execution {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("Failed to start command: {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    Step {
        message: String,
        #[source]
        source: Option<Box<ProvisionError>>,
    },

    #[error("Step '{step}' failed: {diagnostic}")]
    StepFailed { step: String, diagnostic: Diagnostic },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ProvisionError {
    /// 하위 에러에 사람이 읽을 수 있는 원인을 덧붙임
    pub fn step(message: impl Into<String>, source: ProvisionError) -> Self {
        Self::Step {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// 명령어 실패 없이 원인만 있는 단계 에러
    pub fn cause(message: impl Into<String>) -> Self {
        Self::Step {
            message: message.into(),
            source: None,
        }
    }

    /// 실패한 명령어 (있다면)
    pub fn failed_command(&self) -> Option<&str> {
        match self {
            Self::Execution { command, .. } | Self::Spawn { command, .. } => Some(command.as_str()),
            Self::Step {
                source: Some(inner),
                ..
            } => inner.failed_command(),
            Self::StepFailed { diagnostic, .. } => diagnostic.command.as_deref(),
            _ => None,
        }
    }

    /// 실패한 명령어의 종료 코드 (있다면)
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Execution { exit_code, .. } => Some(*exit_code),
            Self::Step {
                source: Some(inner),
                ..
            } => inner.exit_code(),
            Self::StepFailed { diagnostic, .. } => diagnostic.exit_code,
            _ => None,
        }
    }

    /// 실패의 상세 출력 (있다면)
    ///
    /// 외부 명령어는 stderr를, 실행 자체나 파일 접근이 실패한 경우는 OS 에러 메시지를 돌려줍니다.
    pub fn command_output(&self) -> Option<String> {
        match self {
            Self::Execution { stderr, .. } if !stderr.trim().is_empty() => {
                Some(stderr.trim().to_string())
            }
            Self::Spawn { source, .. } | Self::IoError(source) => Some(source.to_string()),
            Self::Step {
                source: Some(inner),
                ..
            } => inner.command_output(),
            Self::StepFailed { diagnostic, .. } => diagnostic.output.clone(),
            _ => None,
        }
    }
}

/// 실패한 단계의 진단 정보
///
/// `cause`는 항상 존재하며, 명령어와 종료 코드는 외부 명령어가 실패한 경우에만 채워집니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub cause: String,
    pub command: Option<String>,
    pub exit_code: Option<i32>,
    pub output: Option<String>,
}

impl From<&ProvisionError> for Diagnostic {
    fn from(err: &ProvisionError) -> Self {
        Self {
            cause: err.to_string(),
            command: err.failed_command().map(str::to_string),
            exit_code: err.exit_code(),
            output: err.command_output(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cause)
    }
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
