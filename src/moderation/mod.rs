//! 审核流水线
//!
//! 截断 -> 调用模型 -> 解析结果。无内部可变状态，可并发调用。

pub mod truncate;
pub mod verdict;

use std::sync::Arc;
use std::time::Duration;

use crate::providers::{CompletionProvider, CompletionRequest};

pub use truncate::{truncate, MAX_INPUT_CHARS};
pub use verdict::{classify_output, Verdict};

/// 模型只需要回答一个词
pub const MAX_OUTPUT_TOKENS: u32 = 16;

/// 模型调用失败
#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("request timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),
    #[error("{0:#}")]
    Provider(anyhow::Error),
}

pub struct Moderator {
    provider: Arc<dyn CompletionProvider>,
    instructions: String,
    timeout: Duration,
}

impl Moderator {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        instructions: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            instructions: instructions.into(),
            timeout,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// 审核一段文本
    ///
    /// 只调用一次 provider，不重试；超时和 provider 错误都以 `ModerationError` 返回。
    pub async fn classify(&self, text: &str) -> Result<Verdict, ModerationError> {
        let input = truncate(text, MAX_INPUT_CHARS);
        let request = CompletionRequest {
            instructions: &self.instructions,
            input,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        };

        let output = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| ModerationError::Timeout(self.timeout))?
            .map_err(ModerationError::Provider)?;

        tracing::debug!(provider = self.provider.name(), output = output.as_str(), "model output");

        Ok(classify_output(&output))
    }
}
