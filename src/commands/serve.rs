//! Serve 命令 - 启动审核服务
//!
//! 此模块实现 `serve` 命令，加载配置和系统指令后启动 HTTP 服务器。

use anyhow::Result;

use crate::config::Config;
use crate::gateway;

/// 执行服务器启动命令
///
/// # 参数
///
/// * `config` - 应用配置，包含监听地址、OpenAI 凭据和指令文件路径
///
/// # 功能
///
/// - 读取系统指令文件（缺失时启动失败）
/// - 初始化 OpenAI Provider、HTTP 路由和中间件
/// - 启动服务器并等待关闭信号（Ctrl+C 或 SIGTERM）
pub async fn serve_command(config: Config) -> Result<()> {
    tracing::debug!(?config, "configuration loaded");
    gateway::serve(config).await
}
