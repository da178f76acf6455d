//! Synthesis Command Handlers - 同步合成

use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;

use super::request::resolve_request;
use crate::application::commands::synthesis_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::SynthesisRequest;
use crate::application::provider_registry::ProviderRegistry;

/// 同步合成配置
#[derive(Debug, Clone)]
pub struct SynthesizeConfig {
    pub default_voice_id: String,
    /// 同步路径允许的最大字符数
    pub max_text_length: usize,
    /// 合成并读取完音频的总时限
    pub timeout: Duration,
}

/// Synthesize Handler - 短文本同步合成，不经过任务队列
pub struct SynthesizeHandler {
    providers: Arc<ProviderRegistry>,
    config: SynthesizeConfig,
}

impl SynthesizeHandler {
    pub fn new(providers: Arc<ProviderRegistry>, config: SynthesizeConfig) -> Self {
        Self { providers, config }
    }

    pub async fn handle(&self, cmd: SynthesizeCommand) -> Result<SynthesizeResponse, ApplicationError> {
        let resolved = resolve_request(
            &self.providers,
            &self.config.default_voice_id,
            &cmd.text,
            cmd.voice_id.as_deref(),
            cmd.provider.as_deref(),
            cmd.output_format.as_deref(),
            cmd.voice_settings,
        )?;

        let text_length = cmd.text.chars().count();
        if text_length > self.config.max_text_length {
            return Err(ApplicationError::TextTooLong {
                max_length: self.config.max_text_length,
                actual_length: text_length,
            });
        }

        let provider = resolved.provider;
        let request = SynthesisRequest {
            text: cmd.text,
            voice_id: resolved.voice_id,
            output_format: resolved.format,
            settings: resolved.settings,
        };

        // 存活探测与合成共用同一时限
        let synthesis = async {
            if !provider.is_available().await {
                return Err(ApplicationError::ProviderUnavailable(
                    provider.name().to_string(),
                ));
            }
            let mut result = provider.synthesize(request).await?;
            let mut audio = Vec::new();
            result.audio.read_to_end(&mut audio).await.map_err(|e| {
                ApplicationError::ProviderFailure(format!("synthesis failed: {}", e))
            })?;
            Ok::<_, ApplicationError>((audio, result.content_type))
        };

        let (audio, content_type) = tokio::time::timeout(self.config.timeout, synthesis)
            .await
            .map_err(|_| {
                tracing::warn!(
                    provider = %provider.name(),
                    timeout_secs = self.config.timeout.as_secs(),
                    "Synchronous synthesis timed out"
                );
                ApplicationError::ProviderFailure(format!(
                    "synthesis timed out after {}s",
                    self.config.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                tracing::error!(provider = %provider.name(), error = %e, "Synthesis failed");
                e
            })?;

        tracing::info!(
            provider = %provider.name(),
            text_length = text_length,
            audio_size = audio.len(),
            "Synchronous synthesis completed"
        );

        Ok(SynthesizeResponse {
            audio,
            content_type,
            format: resolved.format,
            provider: provider.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{SynthesisResult, TtsError, TtsProviderPort};
    use crate::domain::Voice;
    use crate::infrastructure::adapters::{FakeTtsProvider, FakeTtsProviderConfig};
    use async_trait::async_trait;

    /// 存活探测较慢、且声明了不可信长度的 Provider
    struct SlowLivenessProvider {
        liveness_delay: Duration,
    }

    #[async_trait]
    impl TtsProviderPort for SlowLivenessProvider {
        fn name(&self) -> &str {
            "fake"
        }

        async fn synthesize(&self, _request: SynthesisRequest) -> Result<SynthesisResult, TtsError> {
            Ok(SynthesisResult {
                audio: Box::pin(std::io::Cursor::new(b"abc".to_vec())),
                content_type: "audio/mpeg".to_string(),
                size_bytes: Some(u64::MAX),
            })
        }

        async fn list_voices(&self) -> Result<Vec<Voice>, TtsError> {
            Ok(Vec::new())
        }

        async fn is_available(&self) -> bool {
            tokio::time::sleep(self.liveness_delay).await;
            true
        }

        fn max_concurrent(&self) -> usize {
            1
        }

        fn active_jobs(&self) -> usize {
            0
        }
    }

    fn slow_liveness_handler(liveness_delay: Duration, timeout: Duration) -> SynthesizeHandler {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(SlowLivenessProvider { liveness_delay }));
        SynthesizeHandler::new(
            Arc::new(registry),
            SynthesizeConfig {
                default_voice_id: "voice".to_string(),
                max_text_length: 10,
                timeout,
            },
        )
    }

    fn handler(config: FakeTtsProviderConfig, timeout: Duration) -> SynthesizeHandler {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(FakeTtsProvider::new(config)));
        SynthesizeHandler::new(
            Arc::new(registry),
            SynthesizeConfig {
                default_voice_id: "voice".to_string(),
                max_text_length: 10,
                timeout,
            },
        )
    }

    fn command(text: &str) -> SynthesizeCommand {
        SynthesizeCommand {
            text: text.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_synthesize_returns_audio() {
        let handler = handler(
            FakeTtsProviderConfig {
                audio: b"RIFF....".to_vec(),
                ..Default::default()
            },
            Duration::from_secs(5),
        );

        let mut cmd = command("Hello");
        cmd.output_format = Some("wav".to_string());
        let response = handler.handle(cmd).await.unwrap();

        assert_eq!(response.audio, b"RIFF....");
        assert_eq!(response.content_type, "audio/wav");
        assert_eq!(response.provider, "fake");
    }

    #[tokio::test]
    async fn test_text_too_long_counts_characters() {
        let handler = handler(FakeTtsProviderConfig::default(), Duration::from_secs(5));

        // 10 个字符（30 字节）在限制内
        assert!(handler.handle(command("你好你好你好你好你好")).await.is_ok());

        match handler.handle(command("12345678901")).await {
            Err(ApplicationError::TextTooLong {
                max_length,
                actual_length,
            }) => {
                assert_eq!(max_length, 10);
                assert_eq!(actual_length, 11);
            }
            other => panic!("unexpected result: {:?}", other.map(|r| r.audio)),
        }
    }

    #[tokio::test]
    async fn test_provider_unavailable() {
        let handler = handler(
            FakeTtsProviderConfig {
                available: false,
                ..Default::default()
            },
            Duration::from_secs(5),
        );

        assert!(matches!(
            handler.handle(command("Hello")).await,
            Err(ApplicationError::ProviderUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_provider_failure() {
        let handler = handler(
            FakeTtsProviderConfig {
                failure: Some("boom".to_string()),
                ..Default::default()
            },
            Duration::from_secs(5),
        );

        assert!(matches!(
            handler.handle(command("Hello")).await,
            Err(ApplicationError::ProviderFailure(msg)) if msg.contains("boom")
        ));
    }

    #[tokio::test]
    async fn test_timeout() {
        let handler = handler(
            FakeTtsProviderConfig {
                latency: Duration::from_millis(200),
                ..Default::default()
            },
            Duration::from_millis(20),
        );

        assert!(matches!(
            handler.handle(command("Hello")).await,
            Err(ApplicationError::ProviderFailure(msg)) if msg.contains("timed out")
        ));
    }

    #[tokio::test]
    async fn test_declared_size_does_not_drive_allocation() {
        let handler = slow_liveness_handler(Duration::ZERO, Duration::from_secs(5));

        let response = handler.handle(command("Hello")).await.unwrap();
        assert_eq!(response.audio, b"abc");
    }

    #[tokio::test]
    async fn test_slow_liveness_check_counts_toward_timeout() {
        let handler = slow_liveness_handler(Duration::from_millis(200), Duration::from_millis(20));

        let started = std::time::Instant::now();
        let result = handler.handle(command("Hello")).await;
        assert!(started.elapsed() < Duration::from_millis(150));
        assert!(matches!(
            result,
            Err(ApplicationError::ProviderFailure(msg)) if msg.contains("timed out")
        ));
    }
}
