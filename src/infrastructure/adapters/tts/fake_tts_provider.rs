//! Fake TTS Provider - 用于本地开发和测试的 Provider
//!
//! 不调用任何远程服务，在配置的延迟后返回固定音频

use async_trait::async_trait;
use std::time::Duration;

use crate::application::ports::{
    ActiveJobCounter, SynthesisRequest, SynthesisResult, TtsError, TtsProviderPort,
};
use crate::domain::Voice;

/// Fake TTS Provider 配置
#[derive(Debug, Clone)]
pub struct FakeTtsProviderConfig {
    /// Provider 名称
    pub name: String,
    /// 固定返回的音频数据
    pub audio: Vec<u8>,
    /// 模拟合成延迟
    pub latency: Duration,
    pub max_concurrent: usize,
    /// 存活探测结果
    pub available: bool,
    /// 设置后 synthesize 总是返回该错误信息
    pub failure: Option<String>,
}

impl Default for FakeTtsProviderConfig {
    fn default() -> Self {
        Self {
            name: "fake".to_string(),
            audio: b"fake-audio".to_vec(),
            latency: Duration::ZERO,
            max_concurrent: 4,
            available: true,
            failure: None,
        }
    }
}

/// Fake TTS Provider
pub struct FakeTtsProvider {
    config: FakeTtsProviderConfig,
    active: ActiveJobCounter,
}

impl FakeTtsProvider {
    pub fn new(config: FakeTtsProviderConfig) -> Self {
        tracing::info!(
            provider = %config.name,
            latency_ms = config.latency.as_millis() as u64,
            "FakeTtsProvider initialized"
        );
        Self {
            config,
            active: ActiveJobCounter::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(FakeTtsProviderConfig::default())
    }
}

#[async_trait]
impl TtsProviderPort for FakeTtsProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResult, TtsError> {
        let active = self.active.track();

        tracing::debug!(
            provider = %self.config.name,
            text_len = request.text.chars().count(),
            voice_id = %request.voice_id,
            "FakeTtsProvider: returning fixed audio"
        );

        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }

        if let Some(message) = &self.config.failure {
            return Err(TtsError::ServiceError(message.clone()));
        }

        let mut result = SynthesisResult::from_bytes(
            self.config.audio.clone(),
            request.output_format.content_type(),
        );
        result.audio = active.attach(result.audio);
        Ok(result)
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, TtsError> {
        Ok(vec![Voice {
            voice_id: "fake-voice".to_string(),
            name: "Fake".to_string(),
            provider: self.config.name.clone(),
            language: Some("en".to_string()),
            gender: None,
            preview_url: None,
        }])
    }

    async fn is_available(&self) -> bool {
        self.config.available
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
    use std::sync::Arc;
    use tokio::io::AsyncReadExt;

    fn request(format: AudioFormat) -> SynthesisRequest {
        SynthesisRequest {
            text: "hello".to_string(),
            voice_id: "v".to_string(),
            output_format: format,
            settings: None,
        }
    }

    #[tokio::test]
    async fn test_returns_fixed_audio() {
        let provider = FakeTtsProvider::new(FakeTtsProviderConfig {
            audio: vec![1, 2, 3],
            ..Default::default()
        });

        let mut result = provider.synthesize(request(AudioFormat::Wav)).await.unwrap();
        assert_eq!(result.content_type, "audio/wav");
        assert_eq!(result.size_bytes, Some(3));

        let mut buf = Vec::new();
        result.audio.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_configured_failure() {
        let provider = FakeTtsProvider::new(FakeTtsProviderConfig {
            failure: Some("quota exceeded".to_string()),
            ..Default::default()
        });

        let err = provider.synthesize(request(AudioFormat::Mp3)).await.unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
        assert_eq!(provider.active_jobs(), 0);
    }

    #[tokio::test]
    async fn test_active_jobs_tracked_during_synthesis() {
        let provider = Arc::new(FakeTtsProvider::new(FakeTtsProviderConfig {
            latency: Duration::from_millis(50),
            ..Default::default()
        }));

        let handle = {
            let provider = provider.clone();
            tokio::spawn(async move { provider.synthesize(request(AudioFormat::Mp3)).await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(provider.active_jobs(), 1);

        handle.await.unwrap().unwrap();
        assert_eq!(provider.active_jobs(), 0);
    }

    #[tokio::test]
    async fn test_status() {
        let provider = FakeTtsProvider::new(FakeTtsProviderConfig {
            available: false,
            max_concurrent: 2,
            ..Default::default()
        });

        let status = provider.status().await;
        assert_eq!(status.name, "fake");
        assert!(!status.available);
        assert_eq!(status.max_concurrent, 2);
        assert_eq!(status.active_jobs, 0);
    }
}
