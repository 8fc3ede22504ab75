//! Moderator - 基于 LLM 的文本审核服务
//!
//! 把用户文本转发给 OpenAI Responses API，
//! 再把模型的单词回答映射成 `hate` / `spam` 两个二值标记。
//!
//! # 功能特性
//!
//! - `POST /classify`：输入 `{"text": ...}`，返回 `{"hate": 0|1, "spam": 0|1}`
//! - 输入超过 1000 个字符时自动截断
//! - 模型调用超时和错误统一返回 500，不重试
//!
//! # 命令行接口
//!
//! - `serve`: 启动 API 服务器
//! - `test`: 向本地服务器发送测试请求

mod commands;
mod config;
mod gateway;
mod moderation;
mod providers;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::{Config, Endpoint};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Moderator CLI
#[derive(Parser)]
#[command(name = "moderator")]
#[command(about = "LLM-backed hate/spam moderation service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// 可用的命令
#[derive(Subcommand)]
enum Commands {
    /// 启动审核服务器
    Serve,
    /// 向本地服务器发送测试请求
    Test {
        /// 要审核的文本
        #[arg(default_value = "hello")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 加载 .env 文件（如果存在）
    if let Ok(dotenv_path) = std::env::var("MODERATOR_ENV_FILE") {
        dotenvy::from_path(&dotenv_path).ok();
    } else {
        dotenvy::dotenv().ok();
    }

    // 初始化日志系统（MODERATOR_LOG_FORMAT=json 时输出 JSON）
    let json_logs = std::env::var("MODERATOR_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let (text_layer, json_layer) = if json_logs {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            ),
            None,
        )
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moderator=info".into()),
        )
        .with(text_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => commands::serve_command(Config::from_env()?).await,
        Commands::Test { text } => commands::test_command(Endpoint::from_env()?, text).await,
    }
}
