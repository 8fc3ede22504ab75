//! 应用配置模块
//!
//! 负责从环境变量加载应用配置，包括：
//! - 服务器监听地址和端口
//! - OpenAI 认证密钥、模型名称和 API 地址
//! - 系统指令（prompt）文件路径
//! - 上游 LLM 调用超时

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-5-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_PROMPT_PATH: &str = "prompt.txt";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;
/// 整个 HTTP 请求的最小时限
const MIN_REQUEST_TIMEOUT_SECS: u64 = 300;
/// 请求时限比 LLM 超时多留的余量
const REQUEST_TIMEOUT_MARGIN_SECS: u64 = 30;

/// 服务器监听地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// 监听地址（如 "0.0.0.0" 或 "127.0.0.1"）
    pub host: String,
    /// 监听端口
    pub port: u16,
}

impl Endpoint {
    /// 从环境变量加载监听地址
    ///
    /// `test` 命令只需要这一部分，不要求 API key
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&env_lookup)
    }

    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("MODERATOR_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = lookup("MODERATOR_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .context("MODERATOR_PORT must be a valid port number")?;

        Ok(Self { host, port })
    }
}

/// 应用配置
///
/// 进程启动时构造一次，之后只读
#[derive(Clone)]
pub struct Config {
    pub endpoint: Endpoint,
    /// OpenAI API 密钥
    pub api_key: String,
    /// 模型名称
    pub model: String,
    /// OpenAI API 基础地址（不含 `/responses`）
    pub base_url: String,
    /// 系统指令文件路径
    pub prompt_path: PathBuf,
    /// 单次 LLM 调用的超时
    pub llm_timeout: Duration,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// # 环境变量
    ///
    /// - `OPENAI_API_KEY`: OpenAI API 密钥（**必需**）
    /// - `OPENAI_MODEL`: 模型名称（默认: "gpt-5-mini"）
    /// - `OPENAI_BASE_URL`: API 基础地址（默认: "https://api.openai.com/v1"）
    /// - `PROMPT_PATH`: 系统指令文件（默认: "prompt.txt"）
    /// - `MODERATOR_HOST` / `MODERATOR_PORT`: 监听地址（默认: "0.0.0.0:8080"）
    /// - `MODERATOR_LLM_TIMEOUT_SECS`: LLM 调用超时秒数（默认: 30）
    ///
    /// # 错误
    ///
    /// - 如果 `OPENAI_API_KEY` 未设置或为空
    /// - 如果端口或超时不是有效数字
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&env_lookup)
    }

    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let endpoint = Endpoint::from_lookup(lookup)?;

        let api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.is_empty())
            .context("OPENAI_API_KEY environment variable is required")?;

        let model = lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base_url = lookup("OPENAI_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let prompt_path = PathBuf::from(
            lookup("PROMPT_PATH").unwrap_or_else(|| DEFAULT_PROMPT_PATH.to_string()),
        );

        let timeout_secs: u64 = lookup("MODERATOR_LLM_TIMEOUT_SECS")
            .unwrap_or_else(|| DEFAULT_LLM_TIMEOUT_SECS.to_string())
            .parse()
            .context("MODERATOR_LLM_TIMEOUT_SECS must be a whole number of seconds")?;
        if timeout_secs == 0 {
            anyhow::bail!("MODERATOR_LLM_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Self {
            endpoint,
            api_key,
            model,
            base_url,
            prompt_path,
            llm_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// 整个 HTTP 请求的时限，始终大于 LLM 超时
    pub fn request_timeout(&self) -> Duration {
        request_timeout_for(self.llm_timeout)
    }

    /// 读取系统指令
    ///
    /// 只在启动时调用一次，内容去掉首尾空白
    pub fn load_instructions(&self) -> Result<String> {
        read_instructions(&self.prompt_path)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("prompt_path", &self.prompt_path)
            .field("llm_timeout", &self.llm_timeout)
            .finish()
    }
}

pub fn request_timeout_for(llm_timeout: Duration) -> Duration {
    (llm_timeout + Duration::from_secs(REQUEST_TIMEOUT_MARGIN_SECS))
        .max(Duration::from_secs(MIN_REQUEST_TIMEOUT_SECS))
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn read_instructions(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Prompt file not found at: {}", path.display()))?;
    Ok(content.trim().to_string())
}
