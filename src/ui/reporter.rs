use crate::error::ProvisionError;
use crate::ui::progress::create_spinner;
use colored::*;
use indicatif::ProgressBar;
use std::sync::Mutex;

/// 메시지 심각도
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    fn tag(&self) -> ColoredString {
        match self {
            Level::Info => "[INFO]".cyan().bold(),
            Level::Success => "[OK]".green().bold(),
            Level::Warning => "[WARN]".yellow().bold(),
            Level::Error => "[ERROR]".red().bold(),
        }
    }
}

/// 운영자에게 보이는 진단 출력
///
/// `fatal`은 에러를 출력만 하고 돌아옵니다. 프로세스 종료는 `main`에서 한 번만 수행합니다.
pub struct Reporter {
    captured: Option<Mutex<Vec<(Level, String)>>>,
}

impl Reporter {
    pub fn new() -> Self {
        Self { captured: None }
    }

    /// 출력하지 않고 메시지를 기록만 하는 reporter
    #[cfg(test)]
    pub fn capturing() -> Self {
        Self {
            captured: Some(Mutex::new(Vec::new())),
        }
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.emit(Level::Info, message.as_ref());
    }

    pub fn success(&self, message: impl AsRef<str>) {
        self.emit(Level::Success, message.as_ref());
    }

    pub fn warning(&self, message: impl AsRef<str>) {
        self.emit(Level::Warning, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.emit(Level::Error, message.as_ref());
    }

    /// 치명적 에러 출력: 원인, 실패한 명령어와 종료 코드, 상세 출력
    pub fn fatal(&self, err: &ProvisionError) {
        self.error(err.to_string());
        if let Some(command) = err.failed_command() {
            let line = match err.exit_code() {
                Some(code) => format!("command: {} (exit code {})", command, code),
                None => format!("command: {}", command),
            };
            self.emit_detail(Level::Error, &line);
        }
        if let Some(output) = err.command_output() {
            for line in output.lines() {
                self.emit_detail(Level::Error, &format!("| {}", line));
            }
        }
    }

    /// 레벨 태그 없이 여러 줄 블록 출력 (요약용)
    pub fn block(&self, text: &str) {
        match &self.captured {
            Some(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.extend(text.lines().map(|l| (Level::Info, l.to_string())));
                }
            }
            None => println!("{}", text),
        }
    }

    /// 오래 걸리는 명령어용 스피너 (캡처 모드에서는 숨김)
    pub fn spinner(&self, message: &str) -> ProgressBar {
        if self.captured.is_some() {
            ProgressBar::hidden()
        } else {
            create_spinner(message)
        }
    }

    /// 기록된 메시지들
    #[cfg(test)]
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.captured
            .as_ref()
            .and_then(|lines| lines.lock().ok().map(|l| l.clone()))
            .unwrap_or_default()
    }

    /// 특정 레벨로 기록된 메시지들
    #[cfg(test)]
    pub fn lines_at(&self, level: Level) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, text)| text)
            .collect()
    }

    fn emit(&self, level: Level, message: &str) {
        match &self.captured {
            Some(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push((level, message.to_string()));
                }
            }
            None if level == Level::Error => eprintln!("{} {}", level.tag(), message.red()),
            None => println!("{} {}", level.tag(), message),
        }
    }

    fn emit_detail(&self, level: Level, message: &str) {
        match &self.captured {
            Some(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push((level, message.to_string()));
                }
            }
            None => eprintln!("        {}", message.dimmed()),
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Diagnostic;

    #[test]
    fn test_capturing_records_levels() {
        let reporter = Reporter::capturing();
        reporter.info("checking hostname");
        reporter.success("hostname ok");
        reporter.warning("container exists");

        let lines = reporter.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], (Level::Info, "checking hostname".to_string()));
        assert_eq!(reporter.lines_at(Level::Warning), vec!["container exists"]);
    }

    #[test]
    fn test_fatal_includes_command_and_output() {
        let reporter = Reporter::capturing();
        let err = ProvisionError::step(
            "Failed to create network kitzone-net",
            ProvisionError::Execution {
                command: "docker network create kitzone-net".to_string(),
                exit_code: 1,
                stderr: "daemon not running\n".to_string(),
            },
        );
        reporter.fatal(&err);

        let errors = reporter.lines_at(Level::Error);
        assert_eq!(errors[0], "Failed to create network kitzone-net");
        assert_eq!(
            errors[1],
            "command: docker network create kitzone-net (exit code 1)"
        );
        assert_eq!(errors[2], "| daemon not running");
    }

    #[test]
    fn test_fatal_shows_why_a_command_could_not_start() {
        let reporter = Reporter::capturing();
        let diagnostic = Diagnostic::from(&ProvisionError::step(
            "Failed to update the package index",
            ProvisionError::Spawn {
                command: "apt-get update".to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "No such file or directory",
                ),
            },
        ));
        reporter.fatal(&ProvisionError::StepFailed {
            step: "prerequisites".to_string(),
            diagnostic,
        });

        let errors = reporter.lines_at(Level::Error);
        assert_eq!(
            errors,
            vec![
                "Step 'prerequisites' failed: Failed to update the package index",
                "command: apt-get update",
                "| No such file or directory",
            ]
        );
    }

    #[test]
    fn test_block_splits_lines() {
        let reporter = Reporter::capturing();
        reporter.block("line one\nline two");
        assert_eq!(reporter.lines().len(), 2);
    }
}
