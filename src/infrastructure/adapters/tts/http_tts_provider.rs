//! HTTP TTS Provider - 调用自托管 TTS HTTP 服务
//!
//! 外部 TTS API:
//! POST {base_url}/api/tts/infer
//! Request: {"text": "...", "voice_ref": "...", "format": "mp3"}  (JSON)
//! Response: 音频二进制，Content-Type 为音频类型

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::response::{content_type, ensure_success, into_audio_stream, map_request_error};
use crate::application::ports::{
    ActiveJobCounter, SynthesisRequest, SynthesisResult, TtsError, TtsProviderPort,
};
use crate::domain::Voice;

/// TTS 推理请求体 (JSON)
#[derive(Debug, Serialize)]
struct TtsHttpRequest<'a> {
    text: &'a str,
    /// 音色引用（音色 ID 或参考音频 URL，由 TTS 服务解释）
    voice_ref: &'a str,
    format: &'a str,
}

/// 音色列表条目
#[derive(Debug, Deserialize)]
struct TtsHttpVoice {
    id: String,
    name: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    gender: Option<String>,
}

/// HTTP TTS Provider 配置
#[derive(Debug, Clone)]
pub struct HttpTtsProviderConfig {
    /// TTS 服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    pub max_concurrent: usize,
}

impl Default for HttpTtsProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 120,
            max_concurrent: 2,
        }
    }
}

impl HttpTtsProviderConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }
}

/// HTTP TTS Provider
pub struct HttpTtsProvider {
    client: Client,
    config: HttpTtsProviderConfig,
    active: ActiveJobCounter,
}

impl HttpTtsProvider {
    pub const NAME: &'static str = "http";

    pub fn new(config: HttpTtsProviderConfig) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            config,
            active: ActiveJobCounter::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl TtsProviderPort for HttpTtsProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResult, TtsError> {
        let active = self.active.track();
        let url = self.url("/api/tts/infer");
        let body = TtsHttpRequest {
            text: &request.text,
            voice_ref: &request.voice_id,
            format: request.output_format.extension(),
        };

        tracing::debug!(
            url = %url,
            text_len = request.text.chars().count(),
            voice_ref = %request.voice_id,
            "Sending TTS infer request"
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_request_error)?;
        let response = ensure_success(response).await?;

        let content_type = content_type(&response)
            .unwrap_or_else(|| request.output_format.content_type().to_string());
        let size_bytes = response.content_length();

        Ok(SynthesisResult {
            audio: active.attach(into_audio_stream(response)),
            content_type,
            size_bytes,
        })
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, TtsError> {
        let response = self
            .client
            .get(self.url("/api/voices"))
            .send()
            .await
            .map_err(map_request_error)?;
        let voices: Vec<TtsHttpVoice> = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| TtsError::InvalidResponse(e.to_string()))?;

        Ok(voices
            .into_iter()
            .map(|v| Voice {
                voice_id: v.id,
                name: v.name,
                provider: Self::NAME.to_string(),
                language: v.language,
                gender: v.gender,
                preview_url: None,
            })
            .collect())
    }

    async fn is_available(&self) -> bool {
        match self
            .client
            .get(self.url("/health"))
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn max_concurrent(&self) -> usize {
        self.config.max_concurrent
    }

    fn active_jobs(&self) -> usize {
        self.active.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AudioFormat;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_config_default() {
        let config = HttpTtsProviderConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_config_builder() {
        let config = HttpTtsProviderConfig::new("http://example.com:9000/")
            .with_timeout(60)
            .with_max_concurrent(8);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.max_concurrent, 8);

        let provider = HttpTtsProvider::new(config).unwrap();
        assert_eq!(provider.url("/health"), "http://example.com:9000/health");
    }

    /// 启动本地 TTS 服务桩，返回 base_url
    async fn spawn_stub() -> String {
        let app = Router::new()
            .route(
                "/api/tts/infer",
                post(|Json(body): Json<serde_json::Value>| async move {
                    let text = body["text"].as_str().unwrap_or_default().to_string();
                    ([("content-type", "audio/wav")], text.into_bytes())
                }),
            )
            .route("/health", get(|| async { "ok" }))
            .route(
                "/api/voices",
                get(|| async { Json(serde_json::json!([{"id": "v1", "name": "One"}])) }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_synthesize_streams_body() {
        let provider = HttpTtsProvider::new(HttpTtsProviderConfig::new(spawn_stub().await)).unwrap();

        let mut result = provider
            .synthesize(SynthesisRequest {
                text: "echo me".to_string(),
                voice_id: "v1".to_string(),
                output_format: AudioFormat::Wav,
                settings: None,
            })
            .await
            .unwrap();
        assert_eq!(result.content_type, "audio/wav");
        // 读取响应体期间仍计为进行中
        assert_eq!(provider.active_jobs(), 1);

        let mut buf = Vec::new();
        result.audio.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"echo me");
        drop(result);
        assert_eq!(provider.active_jobs(), 0);
    }

    #[tokio::test]
    async fn test_list_voices_and_health() {
        let provider = HttpTtsProvider::new(HttpTtsProviderConfig::new(spawn_stub().await)).unwrap();

        assert!(provider.is_available().await);
        let voices = provider.list_voices().await.unwrap();
        assert_eq!(voices.len(), 1);
        assert_eq!(voices[0].voice_id, "v1");
        assert_eq!(voices[0].provider, "http");
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let provider =
            HttpTtsProvider::new(HttpTtsProviderConfig::new("http://127.0.0.1:1")).unwrap();
        assert!(!provider.is_available().await);
        assert!(provider.list_voices().await.is_err());
    }
}
