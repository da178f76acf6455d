//! Provider 装配 - 按配置创建并注册启用的 Provider

use std::sync::Arc;
use std::time::Duration;

use super::{
    ElevenLabsConfig, ElevenLabsProvider, FakeTtsProvider, FakeTtsProviderConfig,
    HttpTtsProvider, HttpTtsProviderConfig,
};
use crate::application::ports::TtsError;
use crate::application::provider_registry::ProviderRegistry;
use crate::config::ProvidersConfig;

/// 创建所有启用的 Provider，并将 `default_provider` 设为默认
pub fn build_provider_registry(
    config: &ProvidersConfig,
    default_provider: &str,
) -> Result<ProviderRegistry, TtsError> {
    let mut registry = ProviderRegistry::new();

    if config.elevenlabs.enabled {
        let elevenlabs = &config.elevenlabs;
        let provider = ElevenLabsProvider::new(ElevenLabsConfig {
            api_key: elevenlabs.api_key.clone(),
            base_url: elevenlabs.base_url.clone(),
            model_id: elevenlabs.model_id.clone(),
            timeout_secs: elevenlabs.timeout_secs,
            max_concurrent: elevenlabs.max_concurrent,
        })?;
        registry.register(Arc::new(provider));
    }

    if config.http.enabled {
        let http = &config.http;
        let provider = HttpTtsProvider::new(
            HttpTtsProviderConfig::new(http.url.clone())
                .with_timeout(http.timeout_secs)
                .with_max_concurrent(http.max_concurrent),
        )?;
        registry.register(Arc::new(provider));
    }

    if config.fake.enabled {
        registry.register(Arc::new(FakeTtsProvider::new(FakeTtsProviderConfig {
            latency: Duration::from_millis(config.fake.latency_ms),
            max_concurrent: config.fake.max_concurrent,
            ..Default::default()
        })));
    }

    if registry.is_empty() {
        return Err(TtsError::Unavailable(
            "no TTS provider enabled".to_string(),
        ));
    }

    if !registry.set_default(default_provider) {
        return Err(TtsError::Unavailable(format!(
            "default provider '{}' is not registered",
            default_provider
        )));
    }

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_only() -> ProvidersConfig {
        let mut config = ProvidersConfig::default();
        config.elevenlabs.enabled = false;
        config.http.enabled = false;
        config.fake.enabled = true;
        config
    }

    #[test]
    fn test_registers_enabled_providers_only() {
        let mut config = fake_only();
        config.elevenlabs.enabled = true;

        let registry = build_provider_registry(&config, "fake").unwrap();
        assert_eq!(registry.names(), vec!["elevenlabs", "fake"]);
        assert_eq!(registry.default_name(), Some("fake"));
    }

    #[test]
    fn test_fake_provider_uses_configured_limits() {
        let mut config = fake_only();
        config.fake.max_concurrent = 7;

        let registry = build_provider_registry(&config, "fake").unwrap();
        assert_eq!(registry.get("fake").unwrap().max_concurrent(), 7);
    }

    #[test]
    fn test_default_must_be_enabled() {
        assert!(build_provider_registry(&fake_only(), "elevenlabs").is_err());

        let mut none = fake_only();
        none.fake.enabled = false;
        assert!(build_provider_registry(&none, "fake").is_err());
    }
}
