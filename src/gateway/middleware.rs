//! Gateway 中间件

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::Instrument;

/// 全局请求计数器，用于生成 request_id
static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(1);

const REQUEST_ID_HEADER: &str = "x-request-id";

/// 请求日志中间件
///
/// 为每个请求分配递增 id，写入日志 span 和 `x-request-id` 响应头，
/// 结束时记录状态码和耗时（5xx 用 warn 级别）。
pub async fn request_logger(request: Request, next: Next) -> Response {
    let request_id = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    let span = tracing::info_span!(
        "req",
        id = request_id,
        method = %request.method(),
        path = request.uri().path(),
    );

    async move {
        let start = Instant::now();
        let mut response = next.run(request).await;
        let latency_ms = start.elapsed().as_millis() as u64;
        let status = response.status();

        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), latency_ms, "done");
        } else {
            tracing::info!(status = status.as_u16(), latency_ms, "done");
        }

        response.headers_mut().insert(
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderValue::from(request_id),
        );
        response
    }
    .instrument(span)
    .await
}
