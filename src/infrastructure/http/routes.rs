//! HTTP Routes
//!
//! API Endpoints:
//! - /api/v1/health                GET     服务健康状态
//! - /api/v1/providers             GET     列出 Provider
//! - /api/v1/voices?provider=      GET     列出音色
//! - /api/v1/tts                   POST    同步合成（响应体为音频）
//! - /api/v1/jobs                  POST    提交异步任务
//! - /api/v1/jobs?status=          GET     按状态列出任务
//! - /api/v1/jobs/:job_id          GET     查询任务状态
//! - /api/v1/jobs/:job_id          DELETE  删除任务
//! - /api/v1/jobs/:job_id/result   GET     下载结果音频
//! - /openapi.json                 GET     OpenAPI 文档

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/openapi.json", get(handlers::openapi_json))
        .nest("/api/v1", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/providers", get(handlers::list_providers))
        .route("/voices", get(handlers::list_voices))
        .route("/tts", post(handlers::synthesize))
        .route("/openapi.json", get(handlers::openapi_json))
        .nest("/jobs", job_routes())
}

/// Job 路由
fn job_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(handlers::create_job).get(handlers::list_jobs))
        .route(
            "/:job_id",
            get(handlers::get_job_status).delete(handlers::delete_job),
        )
        .route("/:job_id/result", get(handlers::get_job_result))
}
