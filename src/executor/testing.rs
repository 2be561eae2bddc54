use crate::error::{ProvisionError, Result};
use crate::executor::{display_command, CommandExecutor, Output};
use async_trait::async_trait;
use std::sync::Mutex;

/// 테스트용 호스트 상태
///
/// 멱등성 검사가 앞선 명령어의 결과를 관찰할 수 있을 만큼만 apt/docker 상태를 흉내냅니다.
#[derive(Debug, Default)]
pub struct HostState {
    pub hostname: String,
    pub runtime_installed: bool,
    pub runtime_enabled: bool,
    pub networks: Vec<String>,
    pub containers: Vec<String>,
    pub volumes: Vec<String>,
    /// 목록 조회에는 나오지 않지만 생성하면 "already exists"로 실패하는 이름
    pub hidden: Vec<String>,
    pub public_ip: Option<String>,
    pub local_ip: Option<String>,
    /// 이 접두어로 시작하는 명령어는 실패
    pub fail_on: Option<String>,
    pub calls: Vec<String>,
}

pub struct FakeHost {
    state: Mutex<HostState>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HostState {
                hostname: "kitbox".to_string(),
                public_ip: Some("203.0.113.7".to_string()),
                local_ip: Some("10.0.0.5".to_string()),
                ..HostState::default()
            }),
        }
    }

    pub fn with<F: FnOnce(&mut HostState)>(self, f: F) -> Self {
        f(&mut *self.state.lock().unwrap());
        self
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, HostState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// 주어진 접두어로 시작하는 호출 수
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn fail(command: String, stderr: impl Into<String>) -> Result<Output> {
        Err(ProvisionError::Execution {
            command,
            exit_code: 1,
            stderr: stderr.into(),
        })
    }

    fn ok(stdout: impl Into<String>) -> Result<Output> {
        Ok(Output {
            stdout: stdout.into(),
            ..Output::default()
        })
    }

    fn filter_value<'a>(args: &[&'a str]) -> &'a str {
        args.iter()
            .find_map(|a| a.strip_prefix("name="))
            .unwrap_or_default()
    }

    fn option_value<'a>(args: &[&'a str], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| *a == flag)
            .and_then(|i| args.get(i + 1).copied())
    }
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for FakeHost {
    async fn execute(&self, program: &str, args: &[&str]) -> Result<Output> {
        let command = display_command(program, args);
        let mut state = self.state.lock().unwrap();
        state.calls.push(command.clone());

        if let Some(prefix) = &state.fail_on {
            if command.starts_with(prefix.as_str()) {
                return Self::fail(command, "simulated failure");
            }
        }

        match (program, args) {
            ("hostname", []) => Self::ok(format!("{}\n", state.hostname)),
            ("hostname", ["-I"]) => match &state.local_ip {
                Some(ip) => Self::ok(format!("{} 172.17.0.1 \n", ip)),
                None => Self::fail(command, ""),
            },
            ("curl", _) => match &state.public_ip {
                Some(ip) => Self::ok(ip.clone()),
                None => Self::fail(command, "Could not resolve host"),
            },
            ("apt-get", ["install", "-y", packages @ ..]) => {
                if packages.contains(&"docker-ce") {
                    state.runtime_installed = true;
                }
                Self::ok("")
            }
            ("which", ["docker"]) | ("docker", ["compose", "version"]) => {
                if state.runtime_installed {
                    Self::ok("")
                } else {
                    Self::fail(command, "")
                }
            }
            ("systemctl", ["enable", "--now", _]) => {
                state.runtime_enabled = true;
                Self::ok("")
            }
            ("dpkg", ["--print-architecture"]) => Self::ok("amd64\n"),
            ("lsb_release", ["-cs"]) => Self::ok("jammy\n"),
            ("docker", ["network", "ls", rest @ ..]) => {
                // docker의 name 필터는 부분 일치
                let needle = Self::filter_value(rest);
                let lines: Vec<String> = state
                    .networks
                    .iter()
                    .filter(|n| n.contains(needle))
                    .map(|n| format!("{{\"Driver\":\"bridge\",\"Name\":\"{}\",\"Scope\":\"local\"}}", n))
                    .collect();
                Self::ok(lines.join("\n"))
            }
            ("docker", ["network", "create", name]) => {
                if state.networks.iter().chain(&state.hidden).any(|n| n == name) {
                    return Self::fail(
                        command,
                        format!("Error response from daemon: network with name {} already exists", name),
                    );
                }
                state.networks.push(name.to_string());
                Self::ok("")
            }
            ("docker", ["ps", "-a", rest @ ..]) => {
                let needle = Self::filter_value(rest);
                let lines: Vec<String> = state
                    .containers
                    .iter()
                    .filter(|c| c.contains(needle))
                    .map(|c| format!("{{\"Names\":\"{}\",\"State\":\"exited\"}}", c))
                    .collect();
                Self::ok(lines.join("\n"))
            }
            ("docker", ["volume", "create", name]) => {
                if state.hidden.iter().any(|v| v == name) {
                    return Self::fail(
                        command,
                        format!("Error response from daemon: volume {} already exists", name),
                    );
                }
                if !state.volumes.iter().any(|v| v == name) {
                    state.volumes.push(name.to_string());
                }
                Self::ok(format!("{}\n", name))
            }
            ("docker", ["run", rest @ ..]) => {
                let name = Self::option_value(rest, "--name").unwrap_or_default();
                if state.containers.iter().any(|c| c == name) {
                    return Self::fail(
                        command,
                        format!("Conflict. The container name \"/{}\" is already in use", name),
                    );
                }
                state.containers.push(name.to_string());
                Self::ok("0123456789ab\n")
            }
            _ => Self::ok(""),
        }
    }
}
