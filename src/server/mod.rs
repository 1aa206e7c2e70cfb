//! HTTP surface for the quote generator.
//!
//! - `GET /` serves the input form
//! - `POST /quote` takes a `multipart/form-data` submission and answers with
//!   the generated `.docx` as a download
//! - `GET /health` reports liveness

mod handlers;

use crate::config::cli::LocalStorage;
use crate::core::engine::QuoteEngine;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use handlers::*;

/// 各 handler 共用的狀態；每次請求彼此獨立，沒有可變共享資料
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<QuoteEngine<LocalStorage>>,
}

impl AppState {
    pub fn new(engine: QuoteEngine<LocalStorage>) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/quote", post(generate_quote))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 在已綁定的 listener 上提供服務，直到收到 Ctrl-C
pub async fn serve(listener: TcpListener, state: AppState, max_upload_bytes: usize) -> Result<()> {
    let app = build_router(state, max_upload_bytes);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub async fn start_server<C: ConfigProvider>(config: &C) -> Result<()> {
    tokio::fs::create_dir_all(config.work_dir()).await?;

    let storage = LocalStorage::new(config.work_dir().to_string());
    let state = AppState::new(QuoteEngine::new(storage));

    let listener = TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("🚀 Serving quote form on http://{}", listener.local_addr()?);
    tracing::info!("📁 Spool directory: {}", config.work_dir());

    serve(listener, state, config.max_upload_bytes()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
