use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

/// 建立连接的超时；整体调用时限由 `Moderator` 控制
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// 是否禁用 TLS 验证（用于调试 mitmproxy 等场景）
pub fn should_disable_tls_verify() -> bool {
    std::env::var("MODERATOR_DISABLE_TLS_VERIFY")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// 创建出站 HTTP 客户端
pub fn build_http_client() -> Result<Client> {
    let mut builder = Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10);

    if should_disable_tls_verify() {
        tracing::warn!("TLS certificate verification is DISABLED - for debugging only!");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder.build().context("Failed to create HTTP client")
}
