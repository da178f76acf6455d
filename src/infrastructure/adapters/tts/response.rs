//! reqwest 响应到端口类型的转换

use futures_util::TryStreamExt;
use std::io;
use tokio_util::io::StreamReader;

use crate::application::ports::{AudioStream, TtsError};

/// 将 reqwest 错误映射为 TtsError
pub(crate) fn map_request_error(err: reqwest::Error) -> TtsError {
    if err.is_timeout() {
        TtsError::Timeout
    } else if err.is_connect() {
        TtsError::NetworkError(format!("Cannot connect to TTS service: {}", err))
    } else {
        TtsError::NetworkError(err.to_string())
    }
}

/// 非 2xx 响应转换为 ServiceError（带响应体）
pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, TtsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_text = response.text().await.unwrap_or_default();
    Err(TtsError::ServiceError(format!("HTTP {}: {}", status, error_text)))
}

/// 响应头中的 Content-Type
pub(crate) fn content_type(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// 响应体按块流式读取，不整体缓冲
pub(crate) fn into_audio_stream(response: reqwest::Response) -> AudioStream {
    let body = response
        .bytes_stream()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
    Box::pin(StreamReader::new(body))
}
