//! Provider 抽象层
//!
//! 定义外部补全能力的统一接口：给定系统指令和用户文本，返回模型文本输出

pub mod openai;

use anyhow::Result;
use async_trait::async_trait;

pub use openai::OpenAiProvider;

/// 单次补全请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest<'a> {
    /// 固定的系统指令
    pub instructions: &'a str,
    /// 截断后的用户文本
    pub input: &'a str,
    /// 输出 token 上限
    pub max_output_tokens: u32,
}

/// Provider Trait - 所有补全服务提供商的统一接口
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider 名称（用于日志和标识）
    fn name(&self) -> &str;

    /// 发起一次补全调用，返回模型的文本输出（可能为空字符串）
    ///
    /// 不做重试
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String>;
}
