//! OpenAI Provider
//!
//! 基于 Responses API 的补全 Provider

mod constants;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::providers::{CompletionProvider, CompletionRequest};
use crate::utils::build_http_client;

use constants::{CONTENT_OUTPUT_TEXT, OUTPUT_ITEM_MESSAGE, RESPONSES_PATH};

/// Responses API 请求体
#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
    max_output_tokens: u32,
}

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    responses_url: String,
}

impl OpenAiProvider {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl AsRef<str>,
    ) -> Result<Self> {
        Ok(Self {
            client: build_http_client()?,
            api_key: api_key.into(),
            model: model.into(),
            responses_url: format!(
                "{}{}",
                base_url.as_ref().trim_end_matches('/'),
                RESPONSES_PATH
            ),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_key, &config.model, &config.base_url)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String> {
        let body = ResponsesRequest {
            model: &self.model,
            instructions: request.instructions,
            input: request.input,
            max_output_tokens: request.max_output_tokens,
        };

        let response = self
            .client
            .post(&self.responses_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to OpenAI API")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error {}: {}", status, error_body);
        }

        let response_body: Value = response
            .json()
            .await
            .context("Failed to parse OpenAI API response")?;

        Ok(extract_output_text(&response_body))
    }
}

/// 从 Responses API 响应中提取文本输出
///
/// 优先使用顶层 `output_text`；否则拼接所有 message 中的 `output_text` 内容块。
/// 没有任何文本时返回空字符串。
fn extract_output_text(response: &Value) -> String {
    if let Some(text) = response.get("output_text").and_then(|v| v.as_str()) {
        return text.to_string();
    }

    response
        .get("output")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter(|item| has_type(item, OUTPUT_ITEM_MESSAGE))
                .filter_map(|item| item.get("content").and_then(|c| c.as_array()))
                .flatten()
                .filter(|part| has_type(part, CONTENT_OUTPUT_TEXT))
                .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                .collect::<String>()
        })
        .unwrap_or_default()
}

fn has_type(value: &Value, expected: &str) -> bool {
    value.get("type").and_then(|t| t.as_str()) == Some(expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message_response(text: &str) -> Value {
        json!({
            "id": "resp_123",
            "object": "response",
            "status": "completed",
            "model": "gpt-5-mini",
            "output": [
                {
                    "id": "rs_1",
                    "type": "reasoning",
                    "summary": []
                },
                {
                    "id": "msg_1",
                    "type": "message",
                    "role": "assistant",
                    "content": [
                        { "type": "output_text", "text": text, "annotations": [] }
                    ]
                }
            ]
        })
    }

    fn request<'a>(input: &'a str) -> CompletionRequest<'a> {
        CompletionRequest {
            instructions: "Reply with hate, spam or benign.",
            input,
            max_output_tokens: 16,
        }
    }

    #[tokio::test]
    async fn sends_responses_request_and_reads_message_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/responses"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_json(json!({
                "model": "gpt-5-mini",
                "instructions": "Reply with hate, spam or benign.",
                "input": "buy cheap watches",
                "max_output_tokens": 16
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_response("spam")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = OpenAiProvider::new("sk-test", "gpt-5-mini", mock_server.uri()).unwrap();
        let output = assert_ok!(provider.complete(request("buy cheap watches")).await);

        assert_eq!(output, "spam");
    }

    #[tokio::test]
    async fn provider_error_status_is_reported() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {
                    "message": "You exceeded your current quota",
                    "type": "insufficient_quota",
                    "code": "insufficient_quota"
                }
            })))
            .mount(&mock_server)
            .await;

        let provider = OpenAiProvider::new("sk-test", "gpt-5-mini", mock_server.uri()).unwrap();
        let err = assert_err!(provider.complete(request("hello")).await);
        let message = format!("{err:#}");

        assert!(message.contains("429"));
        assert!(message.contains("exceeded your current quota"));
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let provider = OpenAiProvider::new("sk-test", "gpt-5-mini", mock_server.uri()).unwrap();
        let err = assert_err!(provider.complete(request("hello")).await);

        assert!(format!("{err:#}").contains("Failed to parse OpenAI API response"));
    }

    #[tokio::test]
    async fn base_url_trailing_slash_is_ignored() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_response("hate")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let base_url = format!("{}/v1/", mock_server.uri());
        let provider = OpenAiProvider::new("sk-test", "gpt-5-mini", base_url).unwrap();

        assert_eq!(provider.complete(request("hello")).await.unwrap(), "hate");
    }

    #[test]
    fn top_level_output_text_wins() {
        let response = json!({
            "output_text": "benign",
            "output": [{
                "type": "message",
                "content": [{ "type": "output_text", "text": "spam" }]
            }]
        });
        assert_eq!(extract_output_text(&response), "benign");
    }

    #[test]
    fn joins_every_output_text_part() {
        let response = json!({
            "output": [
                {
                    "type": "message",
                    "content": [
                        { "type": "output_text", "text": "hate" },
                        { "type": "refusal", "refusal": "no" },
                        { "type": "output_text", "text": " spam" }
                    ]
                }
            ]
        });
        assert_eq!(extract_output_text(&response), "hate spam");
    }

    #[test]
    fn missing_output_yields_empty_text() {
        assert_eq!(extract_output_text(&json!({ "status": "incomplete" })), "");
        assert_eq!(extract_output_text(&json!({ "output": [] })), "");
        assert_eq!(
            extract_output_text(&json!({ "output": [{ "type": "reasoning", "summary": [] }] })),
            ""
        );
    }
}
