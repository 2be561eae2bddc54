use crate::executor::CommandExecutor;
use serde::Deserialize;

const LOOPBACK: &str = "127.0.0.1";

/// `docker network ls --format '{{json .}}'` 한 줄
#[derive(Debug, Deserialize)]
struct NetworkRow {
    #[serde(rename = "Name")]
    name: String,
}

/// `docker ps --format '{{json .}}'` 한 줄
#[derive(Debug, Deserialize)]
struct ContainerRow {
    #[serde(rename = "Names")]
    names: String,
}

/// hosts 파일에 `127.0.0.1 <hostname>` 바인딩이 이미 있는지 확인
///
/// 첫 필드가 정확히 루프백 주소이고, 나머지 필드 중 하나가 hostname과 정확히 일치해야 합니다.
pub fn hosts_has_loopback_entry(contents: &str, hostname: &str) -> bool {
    contents.lines().any(|line| {
        let line = line.split('#').next().unwrap_or_default();
        let mut fields = line.split_whitespace();
        fields.next() == Some(LOOPBACK) && fields.any(|name| name == hostname)
    })
}

/// 런타임 바이너리와 compose 서브커맨드가 모두 사용 가능한지
pub async fn runtime_installed(exec: &dyn CommandExecutor) -> bool {
    exec.probe("which", &["docker"]).await && exec.probe("docker", &["compose", "version"]).await
}

/// 이름이 정확히 일치하는 네트워크가 있는지
///
/// docker의 name 필터는 부분 일치이므로 결과를 다시 정확히 비교합니다.
/// 조회 자체가 실패하면 없는 것으로 간주하고, 생성 단계가 에러를 보고하게 둡니다.
pub async fn network_exists(exec: &dyn CommandExecutor, name: &str) -> bool {
    let filter = format!("name={}", name);
    let Ok(output) = exec
        .execute("docker", &["network", "ls", "--filter", filter.as_str(), "--format", "{{json .}}"])
        .await
    else {
        return false;
    };

    parse_rows::<NetworkRow>(&output.stdout)
        .iter()
        .any(|row| row.name == name)
}

/// 이름이 정확히 일치하는 컨테이너가 있는지 (중지된 컨테이너 포함)
pub async fn container_exists(exec: &dyn CommandExecutor, name: &str) -> bool {
    let filter = format!("name={}", name);
    let Ok(output) = exec
        .execute("docker", &["ps", "-a", "--filter", filter.as_str(), "--format", "{{json .}}"])
        .await
    else {
        return false;
    };

    parse_rows::<ContainerRow>(&output.stdout).iter().any(|row| {
        row.names
            .split(',')
            .any(|n| n.trim().trim_start_matches('/') == name)
    })
}

/// 생성 명령어의 "already exists" 에러인지
pub fn is_already_exists(stderr: &str) -> bool {
    let stderr = stderr.to_lowercase();
    stderr.contains("already exists") || stderr.contains("already in use")
}

fn parse_rows<T: for<'de> Deserialize<'de>>(stdout: &str) -> Vec<T> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(row) => Some(row),
            Err(e) => {
                tracing::warn!(%line, error = %e, "unparseable docker output");
                None
            }
        })
        .collect()
}
