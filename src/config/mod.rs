use crate::error::{ProvisionError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// 설정 파일이 명시되지 않았을 때 찾아보는 위치
pub const DEFAULT_CONFIG_PATH: &str = "/etc/kitzone/provision.toml";

/// 프로비저닝 실행 컨텍스트
///
/// 프로세스 시작 시 한 번 로드되고, 이후 모든 단계는 읽기 전용으로 빌려서 사용합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 서비스들이 연결될 docker 네트워크 이름
    #[serde(default = "default_network_name")]
    pub network_name: String,

    /// 기본 도구 패키지 목록
    #[serde(default = "default_prerequisite_packages")]
    pub prerequisite_packages: Vec<String>,

    /// 컨테이너 런타임 설치 설정
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// 배포할 서비스 목록 (순서대로 배포)
    #[serde(default = "default_services")]
    pub services: Vec<ServiceSpec>,

    /// 호스트 파일 경로
    #[serde(default)]
    pub paths: PathsConfig,

    /// 외부 IP 조회 URL
    #[serde(default = "default_ip_lookup_url")]
    pub ip_lookup_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// 업스트림 저장소 URL
    #[serde(default = "default_repo_url")]
    pub repo_url: String,

    /// 업스트림 서명 키 URL
    #[serde(default = "default_gpg_url")]
    pub gpg_url: String,

    /// 설치할 런타임 패키지 목록
    #[serde(default = "default_runtime_packages")]
    pub packages: Vec<String>,

    /// systemd 서비스 이름
    #[serde(default = "default_runtime_service")]
    pub service: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_hosts_file")]
    pub hosts_file: PathBuf,

    #[serde(default = "default_keyring_dir")]
    pub keyring_dir: PathBuf,

    #[serde(default = "default_apt_source_file")]
    pub apt_source_file: PathBuf,

    /// 서비스 호스트 디렉토리의 루트
    #[serde(default = "default_install_dir")]
    pub install_dir: PathBuf,
}

/// 배포할 컨테이너 서비스 하나의 정의
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSpec {
    /// 컨테이너 이름 (멱등성 검사 기준)
    pub name: String,

    /// 화면에 표시할 이름
    pub title: String,

    pub image: String,

    /// "host:container" 형식의 포트 매핑
    #[serde(default)]
    pub ports: Vec<String>,

    /// "source:target" 형식의 볼륨 매핑
    ///
    /// source가 '/'로 시작하면 호스트 경로, '/'를 포함하면 install_dir 기준 상대 경로,
    /// 그 외에는 named volume입니다.
    #[serde(default)]
    pub volumes: Vec<String>,

    /// 요약에 표시할 웹 UI 포트
    pub ui_port: u16,

    /// 요약에 표시할 기본 계정 (email, password)
    #[serde(default)]
    pub default_credentials: Option<Credentials>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

fn default_network_name() -> String {
    "kitzone-net".to_string()
}

fn default_prerequisite_packages() -> Vec<String> {
    ["ca-certificates", "curl", "gnupg", "lsb-release", "git", "ufw"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_repo_url() -> String {
    "https://download.docker.com/linux/ubuntu".to_string()
}

fn default_gpg_url() -> String {
    "https://download.docker.com/linux/ubuntu/gpg".to_string()
}

fn default_runtime_packages() -> Vec<String> {
    [
        "docker-ce",
        "docker-ce-cli",
        "containerd.io",
        "docker-buildx-plugin",
        "docker-compose-plugin",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_runtime_service() -> String {
    "docker".to_string()
}

fn default_hosts_file() -> PathBuf {
    PathBuf::from("/etc/hosts")
}

fn default_keyring_dir() -> PathBuf {
    PathBuf::from("/etc/apt/keyrings")
}

fn default_apt_source_file() -> PathBuf {
    PathBuf::from("/etc/apt/sources.list.d/docker.list")
}

fn default_install_dir() -> PathBuf {
    PathBuf::from("/opt/kitzone")
}

fn default_ip_lookup_url() -> String {
    "https://ifconfig.me".to_string()
}

fn default_services() -> Vec<ServiceSpec> {
    vec![
        ServiceSpec {
            name: "npm".to_string(),
            title: "Nginx Proxy Manager".to_string(),
            image: "jc21/nginx-proxy-manager:latest".to_string(),
            ports: vec!["80:80".to_string(), "81:81".to_string(), "443:443".to_string()],
            volumes: vec![
                "npm_data:/data".to_string(),
                "npm/letsencrypt:/etc/letsencrypt".to_string(),
            ],
            ui_port: 81,
            default_credentials: Some(Credentials {
                username: "admin@example.com".to_string(),
                password: "changeme".to_string(),
            }),
        },
        ServiceSpec {
            name: "portainer".to_string(),
            title: "Portainer".to_string(),
            image: "portainer/portainer-ce:latest".to_string(),
            ports: vec!["9000:9000".to_string()],
            volumes: vec![
                "/var/run/docker.sock:/var/run/docker.sock".to_string(),
                "portainer_data:/data".to_string(),
            ],
            ui_port: 9000,
            default_credentials: None,
        },
    ]
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            repo_url: default_repo_url(),
            gpg_url: default_gpg_url(),
            packages: default_runtime_packages(),
            service: default_runtime_service(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            hosts_file: default_hosts_file(),
            keyring_dir: default_keyring_dir(),
            apt_source_file: default_apt_source_file(),
            install_dir: default_install_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network_name: default_network_name(),
            prerequisite_packages: default_prerequisite_packages(),
            runtime: RuntimeConfig::default(),
            services: default_services(),
            paths: PathsConfig::default(),
            ip_lookup_url: default_ip_lookup_url(),
        }
    }
}

impl RuntimeConfig {
    /// 서명 키 파일 경로
    pub fn keyring_path(&self, paths: &PathsConfig) -> PathBuf {
        paths.keyring_dir.join("docker.gpg")
    }
}

/// 볼륨 매핑의 source 종류
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeSource {
    Named(String),
    HostPath(PathBuf),
    /// install_dir 아래에 생성되는 서비스 상태 디렉토리
    StateDir(PathBuf),
}

impl ServiceSpec {
    fn volume_sources(&self, install_dir: &Path) -> Vec<(VolumeSource, &str)> {
        self.volumes
            .iter()
            .filter_map(|v| v.split_once(':'))
            .map(|(source, target)| {
                let source = if source.starts_with('/') {
                    VolumeSource::HostPath(PathBuf::from(source))
                } else if source.contains('/') {
                    VolumeSource::StateDir(install_dir.join(source))
                } else {
                    VolumeSource::Named(source.to_string())
                };
                (source, target)
            })
            .collect()
    }

    /// named volume 이름들
    pub fn named_volumes(&self) -> Vec<String> {
        self.volume_sources(Path::new("/"))
            .into_iter()
            .filter_map(|(source, _)| match source {
                VolumeSource::Named(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    /// 미리 만들어야 하는 호스트 측 상태 디렉토리들
    pub fn state_dirs(&self, install_dir: &Path) -> Vec<PathBuf> {
        self.volume_sources(install_dir)
            .into_iter()
            .filter_map(|(source, _)| match source {
                VolumeSource::StateDir(dir) => Some(dir),
                _ => None,
            })
            .collect()
    }

    /// `docker run -v`에 넘길 매핑 (상대 경로는 install_dir 기준 절대 경로로 변환)
    pub fn volume_args(&self, install_dir: &Path) -> Vec<String> {
        self.volume_sources(install_dir)
            .into_iter()
            .map(|(source, target)| match source {
                VolumeSource::Named(name) => format!("{}:{}", name, target),
                VolumeSource::HostPath(path) | VolumeSource::StateDir(path) => {
                    format!("{}:{}", path.display(), target)
                }
            })
            .collect()
    }
}

impl Config {
    /// 설정 로드
    ///
    /// 경로가 주어지면 반드시 존재해야 하고, 없으면 기본 위치를 찾아본 뒤 기본값을 사용합니다.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ProvisionError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content)
            .map_err(|e| ProvisionError::Config(format!("invalid {}: {}", path.display(), e)))
    }

    /// 설정 값 검증
    pub fn validate(&self) -> Result<()> {
        if self.network_name.trim().is_empty() {
            return Err(ProvisionError::Config("network_name must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for service in &self.services {
            if service.name.trim().is_empty() || service.image.trim().is_empty() {
                return Err(ProvisionError::Config(
                    "every service needs a name and an image".to_string(),
                ));
            }
            if !seen.insert(service.name.as_str()) {
                return Err(ProvisionError::Config(format!(
                    "duplicate service name: {}",
                    service.name
                )));
            }
            for volume in &service.volumes {
                match volume.split_once(':') {
                    Some((source, target)) if !source.is_empty() && !target.is_empty() => {}
                    _ => {
                        return Err(ProvisionError::Config(format!(
                            "service {}: volume '{}' must be written as source:target",
                            service.name, volume
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}
