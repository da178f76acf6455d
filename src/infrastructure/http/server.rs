//! HTTP Server
//!
//! Axum HTTP 服务器启动和配置

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::middleware;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::middleware::error_logging_middleware;
use super::routes::create_routes;
use super::state::AppState;

/// 构建带中间件的 Router
pub fn build_router(state: Arc<AppState>) -> Router {
    // CORS 配置 - 允许所有来源的跨域请求
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(300));

    create_routes()
        .layer(middleware::from_fn(error_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// HTTP 服务器
pub struct HttpServer {
    addr: String,
    state: Arc<AppState>,
}

impl HttpServer {
    /// 创建新的 HTTP 服务器
    pub fn new(addr: impl Into<String>, state: AppState) -> Self {
        Self {
            addr: addr.into(),
            state: Arc::new(state),
        }
    }

    /// 启动服务器（带优雅关闭），`shutdown_signal` 完成后停止接收新请求
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = build_router(self.state);

        info!(addr = %self.addr, "Starting HTTP server");

        let listener = TcpListener::bind(&self.addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}
