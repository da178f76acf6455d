//! ElevenLabs Provider

use async_trait::async_trait;

use super::client::{
    output_format, ElevenLabsClient, ElevenLabsConfig, TextToSpeechRequest, VoiceSettingsRequest,
};
use super::voices;
use crate::application::ports::{
    ActiveJobCounter, SynthesisRequest, SynthesisResult, TtsError, TtsProviderPort,
};
use crate::domain::Voice;
use crate::infrastructure::adapters::tts::response::{content_type, into_audio_stream};

/// ElevenLabs TTS Provider
///
/// 音频以流的形式返回，不在内存中整体缓冲
pub struct ElevenLabsProvider {
    client: ElevenLabsClient,
    active: ActiveJobCounter,
}

impl ElevenLabsProvider {
    pub const NAME: &'static str = "elevenlabs";

    pub fn new(config: ElevenLabsConfig) -> Result<Self, TtsError> {
        if config.api_key.is_empty() {
            tracing::warn!("ElevenLabs API key is empty, synthesis requests will be rejected");
        }
        Ok(Self {
            client: ElevenLabsClient::new(config)?,
            active: ActiveJobCounter::new(),
        })
    }
}

#[async_trait]
impl TtsProviderPort for ElevenLabsProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResult, TtsError> {
        let active = self.active.track();
        let voice_id = voices::resolve_voice_id(&request.voice_id);

        let body = TextToSpeechRequest {
            text: &request.text,
            model_id: &self.client.config().model_id,
            output_format: output_format(request.output_format),
            voice_settings: request.settings.as_ref().map(VoiceSettingsRequest::from),
        };

        tracing::debug!(
            provider = Self::NAME,
            voice_id = %voice_id,
            output_format = body.output_format,
            text_len = request.text.chars().count(),
            "Sending ElevenLabs text-to-speech request"
        );

        let response = self.client.text_to_speech(voice_id, &body).await?;
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
        let response = self.client.voices().await?;

        Ok(response
            .voices
            .into_iter()
            .map(|mut v| Voice {
                voice_id: v.voice_id,
                name: v.name,
                provider: Self::NAME.to_string(),
                language: v.labels.remove("language"),
                gender: v.labels.remove("gender"),
                preview_url: v.preview_url.filter(|url| !url.is_empty()),
            })
            .collect())
    }

    async fn is_available(&self) -> bool {
        self.client.check_health().await
    }

    fn max_concurrent(&self) -> usize {
        self.client.config().max_concurrent
    }

    fn active_jobs(&self) -> usize {
        self.active.get()
    }

    fn resolve_voice_id(&self, name_or_id: &str) -> String {
        voices::resolve_voice_id(name_or_id).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AudioFormat, VoiceSettings};
    use axum::extract::{Path, State};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use http::HeaderMap;
    use std::sync::{Arc, Mutex};
    use tokio::io::AsyncReadExt;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<(String, String, serde_json::Value)>>>);

    async fn spawn_stub(captured: Captured) -> String {
        async fn tts(
            State(captured): State<Captured>,
            Path(voice_id): Path<String>,
            headers: HeaderMap,
            Json(body): Json<serde_json::Value>,
        ) -> ([(&'static str, &'static str); 1], &'static [u8]) {
            let key = headers
                .get("xi-api-key")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            captured.0.lock().unwrap().push((voice_id, key, body));
            ([("content-type", "audio/mpeg")], b"ID3-audio")
        }

        let app = Router::new()
            .route("/text-to-speech/:voice_id", post(tts))
            .route("/user", get(|| async { "{}" }))
            .route(
                "/voices",
                get(|| async {
                    Json(serde_json::json!({
                        "voices": [{
                            "voice_id": "abc",
                            "name": "Abc",
                            "labels": {"language": "en", "gender": "female"},
                            "preview_url": ""
                        }]
                    }))
                }),
            )
            .with_state(captured);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn provider(base_url: String) -> ElevenLabsProvider {
        ElevenLabsProvider::new(ElevenLabsConfig {
            api_key: "test-api-key".to_string(),
            base_url,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_provider_defaults() {
        let provider = provider("http://localhost".to_string());
        assert_eq!(provider.name(), "elevenlabs");
        assert_eq!(provider.max_concurrent(), 4);
        assert_eq!(provider.active_jobs(), 0);
        assert_eq!(provider.resolve_voice_id("aria"), "9BWtsMINqrJLrRacOk9x");
    }

    #[tokio::test]
    async fn test_synthesize_request_shape() {
        let captured = Captured::default();
        let provider = provider(spawn_stub(captured.clone()).await);

        let mut result = provider
            .synthesize(SynthesisRequest {
                text: "Hello".to_string(),
                voice_id: "sarah".to_string(),
                output_format: AudioFormat::Wav,
                settings: Some(VoiceSettings {
                    stability: Some(0.3),
                    ..Default::default()
                }),
            })
            .await
            .unwrap();

        let mut audio = Vec::new();
        result.audio.read_to_end(&mut audio).await.unwrap();
        assert_eq!(audio, b"ID3-audio");
        assert_eq!(result.content_type, "audio/mpeg");

        let calls = captured.0.lock().unwrap();
        let (voice_id, key, body) = &calls[0];
        assert_eq!(voice_id, "EXAVITQu4vr4xnSDxMaL");
        assert_eq!(key, "test-api-key");
        assert_eq!(body["model_id"], "eleven_multilingual_v2");
        assert_eq!(body["output_format"], "pcm_22050");
        assert_eq!(body["voice_settings"]["stability"], 0.3);
        assert_eq!(body["voice_settings"]["similarity_boost"], 0.75);
        assert_eq!(body["voice_settings"]["use_speaker_boost"], true);
    }

    #[tokio::test]
    async fn test_list_voices_extracts_labels() {
        let provider = provider(spawn_stub(Captured::default()).await);

        assert!(provider.is_available().await);
        let voices = provider.list_voices().await.unwrap();
        assert_eq!(voices.len(), 1);
        assert_eq!(voices[0].language.as_deref(), Some("en"));
        assert_eq!(voices[0].gender.as_deref(), Some("female"));
        assert_eq!(voices[0].preview_url, None);
        assert_eq!(voices[0].provider, "elevenlabs");
    }
}
