//! Health Handler

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{HealthQuery, HealthReport};
use crate::infrastructure::http::state::AppState;

/// 健康检查，Provider 不可用时 status 为 degraded，HTTP 状态码仍为 200
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    Json(state.health_handler.handle(HealthQuery).await)
}
