use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kitzone-provision")]
#[command(version)]
#[command(
    about = "Provision a host with docker, Nginx Proxy Manager and Portainer",
    long_about = "Installs the container runtime, creates the kitzone-net network and deploys \
                  the management services. Safe to re-run: finished steps are skipped. \
                  Must be run as root."
)]
pub struct Cli {
    /// 설정 파일 경로 (미지정시 /etc/kitzone/provision.toml 또는 기본값)
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// 디버그 모드 (실행하는 명령어 로그 출력)
    #[arg(short = 'd', long)]
    pub debug: bool,
}
