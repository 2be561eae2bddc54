use crate::config::Config;
use crate::executor::CommandExecutor;
use chrono::{DateTime, Local};
use std::fmt::Write;
use std::net::IpAddr;

const FALLBACK_ADDRESS: &str = "127.0.0.1";

/// 접속 주소 조회: 외부 IP → 로컬 IP → 루프백
pub async fn resolve_host_address(exec: &dyn CommandExecutor, lookup_url: &str) -> String {
    if let Ok(output) = exec
        .execute("curl", &["-s", "--max-time", "5", lookup_url])
        .await
    {
        if let Ok(ip) = output.stdout.trim().parse::<IpAddr>() {
            return ip.to_string();
        }
    }

    tracing::debug!("external address lookup failed, using a local address");

    if let Ok(output) = exec.execute("hostname", &["-I"]).await {
        if let Some(ip) = output
            .stdout
            .split_whitespace()
            .find_map(|field| field.parse::<IpAddr>().ok())
        {
            return ip.to_string();
        }
    }

    FALLBACK_ADDRESS.to_string()
}

/// URL에 넣을 호스트 표기 (IPv6는 대괄호)
fn url_host(address: &str) -> String {
    match address.parse::<IpAddr>() {
        Ok(IpAddr::V6(_)) => format!("[{}]", address),
        _ => address.to_string(),
    }
}

/// 요약 블록 렌더링
pub fn render_summary(config: &Config, address: &str, finished_at: DateTime<Local>) -> String {
    let host = url_host(address);
    let rule = "=".repeat(60);
    let mut out = String::new();

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, " Provisioning complete ({})", finished_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out);
    let _ = writeln!(out, " Access:");
    for service in &config.services {
        let _ = writeln!(
            out,
            "   {:<22} http://{}:{}",
            service.title, host, service.ui_port
        );
    }

    let with_credentials: Vec<_> = config
        .services
        .iter()
        .filter_map(|s| s.default_credentials.as_ref().map(|c| (s, c)))
        .collect();
    if !with_credentials.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, " Default credentials (change them after first login):");
        for (service, credentials) in with_credentials {
            let _ = writeln!(
                out,
                "   {:<22} {} / {}",
                service.title, credentials.username, credentials.password
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, " Useful commands:");
    let _ = writeln!(out, "   docker ps");
    for service in &config.services {
        let _ = writeln!(out, "   docker logs -f {}", service.name);
    }
    for service in &config.services {
        let _ = writeln!(out, "   docker restart {}", service.name);
    }
    let _ = writeln!(out, "   docker network inspect {}", config.network_name);
    let _ = write!(out, "{}", rule);

    out
}
