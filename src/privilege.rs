use crate::error::{ProvisionError, Result};

/// 현재 프로세스의 effective uid
pub fn effective_uid() -> u32 {
    // SAFETY: geteuid는 항상 성공하며 부작용이 없음
    unsafe { libc::geteuid() }
}

/// root가 아니면 실행 방법을 알려주는 에러
pub fn require_root(euid: u32) -> Result<()> {
    if euid == 0 {
        return Ok(());
    }

    let program = std::env::args()
        .next()
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    Err(ProvisionError::NotPrivileged(program))
}
