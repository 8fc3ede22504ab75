//! Gateway 应用层
//!
//! HTTP 服务器和请求处理

mod handlers;
mod middleware;
mod state;

pub use state::AppState;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::Config;
use crate::moderation::Moderator;
use crate::providers::OpenAiProvider;

pub async fn serve(config: Config) -> Result<()> {
    let instructions = config.load_instructions()?;
    tracing::info!(
        path = %config.prompt_path.display(),
        chars = instructions.chars().count(),
        "Loaded system instructions"
    );

    let provider = OpenAiProvider::from_config(&config)?;
    tracing::info!(
        model = provider.model(),
        base_url = config.base_url.as_str(),
        timeout_secs = config.llm_timeout.as_secs(),
        "Using OpenAI provider"
    );

    let moderator = Moderator::new(Arc::new(provider), instructions, config.llm_timeout);
    let state = AppState::new(moderator, config.model.as_str());
    let app = build_router(state, config.request_timeout());

    let addr: SocketAddr = format!("{}:{}", config.endpoint.host, config.endpoint.port)
        .parse()
        .context("Invalid listen address")?;
    tracing::info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// `request_timeout` 必须大于 LLM 超时，保证模型超时先以 500 返回
fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/classify", post(handlers::handle_classify))
        .route("/health", get(handlers::handle_health))
        // 文本长度不设上限，超长输入在转发前截断
        .layer(DefaultBodyLimit::disable())
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(middleware::request_logger))
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                )),
        )
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    #[cfg(not(unix))]
    tokio::select! {
        _ = ctrl_c => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
