//! ElevenLabs HTTP API 客户端

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::infrastructure::adapters::tts::response::{ensure_success, map_request_error};
use crate::application::ports::TtsError;
use crate::domain::{AudioFormat, VoiceSettings};

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io/v1";
pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

/// 文本转语音请求体
#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct TextToSpeechRequest<'a> {
    pub text: &'a str,
    pub model_id: &'a str,
    pub output_format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_settings: Option<VoiceSettingsRequest>,
}

/// ElevenLabs 音色参数，未设置的字段使用服务端推荐值
#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct VoiceSettingsRequest {
    pub stability: f64,
    pub similarity_boost: f64,
    pub style: f64,
    pub use_speaker_boost: bool,
}

impl From<&VoiceSettings> for VoiceSettingsRequest {
    fn from(settings: &VoiceSettings) -> Self {
        Self {
            stability: settings.stability.unwrap_or(0.5),
            similarity_boost: settings.similarity_boost.unwrap_or(0.75),
            style: settings.style.unwrap_or(0.0),
            use_speaker_boost: settings.use_speaker_boost.unwrap_or(true),
        }
    }
}

/// 输出格式映射（wav 使用原始 PCM）
pub(crate) fn output_format(format: AudioFormat) -> &'static str {
    match format {
        AudioFormat::Mp3 => "mp3_22050_32",
        AudioFormat::Wav => "pcm_22050",
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct VoicesResponse {
    pub voices: Vec<VoiceResponse>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VoiceResponse {
    pub voice_id: String,
    pub name: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

/// ElevenLabs 客户端配置
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub base_url: String,
    pub model_id: String,
    pub timeout_secs: u64,
    pub max_concurrent: usize,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            timeout_secs: 120,
            max_concurrent: 4,
        }
    }
}

/// ElevenLabs 客户端
pub(crate) struct ElevenLabsClient {
    client: Client,
    config: ElevenLabsConfig,
}

impl ElevenLabsClient {
    pub fn new(config: ElevenLabsConfig) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ElevenLabsConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// POST /text-to-speech/{voice_id}，返回未读取的响应
    pub async fn text_to_speech(
        &self,
        voice_id: &str,
        request: &TextToSpeechRequest<'_>,
    ) -> Result<reqwest::Response, TtsError> {
        let response = self
            .client
            .post(self.url(&format!("/text-to-speech/{}", voice_id)))
            .header("xi-api-key", &self.config.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(request)
            .send()
            .await
            .map_err(map_request_error)?;
        ensure_success(response).await
    }

    /// GET /voices
    pub async fn voices(&self) -> Result<VoicesResponse, TtsError> {
        let response = self
            .client
            .get(self.url("/voices"))
            .header("xi-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(map_request_error)?;
        ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| TtsError::InvalidResponse(e.to_string()))
    }

    /// GET /user 作为存活探测
    pub async fn check_health(&self) -> bool {
        match self
            .client
            .get(self.url("/user"))
            .header("xi-api-key", &self.config.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
