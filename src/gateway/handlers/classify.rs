//! 文本审核处理器

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;

use crate::gateway::{handlers::ApiError, state::AppState};
use crate::moderation::{Verdict, MAX_INPUT_CHARS};

/// `POST /classify` 请求体
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    /// 原文
    pub text: String,
}

/// POST /classify 处理器
pub async fn handle_classify(
    State(state): State<AppState>,
    payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Json<Verdict>, ApiError> {
    let Json(payload) = payload?;

    let chars = payload.text.chars().count();
    tracing::info!(
        model = state.model(),
        chars,
        truncated = chars > MAX_INPUT_CHARS,
        "request"
    );

    let verdict = state.moderator().classify(&payload.text).await?;

    tracing::info!(
        hate = verdict.hate.as_u8(),
        spam = verdict.spam.as_u8(),
        "verdict"
    );

    Ok(Json(verdict))
}
