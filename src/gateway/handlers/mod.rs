//! HTTP 请求处理器

pub mod classify;
pub mod health;

pub use classify::handle_classify;
pub use health::handle_health;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::moderation::ModerationError;

#[derive(Serialize)]
struct ErrorResponse {
    #[serde(rename = "type")]
    error_type: &'static str,
    detail: String,
}

/// 处理器错误，在边界处转换为状态码和结构化响应体
#[derive(Debug)]
pub enum ApiError {
    /// 请求体不合法（缺字段、类型错误、非 JSON）
    Validation(JsonRejection),
    /// 模型调用失败
    Moderation(ModerationError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection)
    }
}

impl From<ModerationError> for ApiError {
    fn from(err: ModerationError) -> Self {
        ApiError::Moderation(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::Validation(rejection) => {
                tracing::warn!(status = rejection.status().as_u16(), "invalid request body");
                (
                    rejection.status(),
                    ErrorResponse {
                        error_type: "invalid_request_error",
                        detail: rejection.body_text(),
                    },
                )
            }
            ApiError::Moderation(err) => {
                tracing::error!("LLM call failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error_type: "llm_error",
                        detail: format!("LLM call failed: {err}"),
                    },
                )
            }
        };
        (status, Json(error)).into_response()
    }
}
