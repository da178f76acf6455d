//! Synchronous TTS Handler

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Response,
    Json,
};
use http::header;
use std::sync::Arc;

use crate::application::SynthesizeCommand;
use crate::infrastructure::http::dto::TtsRequest;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 短文本直接合成，响应体为音频
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TtsRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let result = state
        .synthesize_handler
        .handle(SynthesizeCommand::from(req))
        .await?;

    tracing::info!(
        provider = %result.provider,
        format = %result.format,
        size_bytes = result.audio.len(),
        "Synchronous synthesis complete"
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.content_type)
        .header(header::CONTENT_LENGTH, result.audio.len())
        .body(Body::from(result.audio))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build audio response");
            ApiError::internal()
        })
}
