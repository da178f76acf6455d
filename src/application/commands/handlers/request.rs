//! 合成请求参数解析（异步任务与同步合成共用）

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::TtsProviderPort;
use crate::application::provider_registry::ProviderRegistry;
use crate::domain::{AudioFormat, VoiceSettings};

/// 补全默认值并校验后的请求参数
pub(super) struct ResolvedRequest {
    pub provider: Arc<dyn TtsProviderPort>,
    pub voice_id: String,
    pub format: AudioFormat,
    pub settings: Option<VoiceSettings>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(super) fn resolve_request(
    providers: &ProviderRegistry,
    default_voice_id: &str,
    text: &str,
    voice_id: Option<&str>,
    provider: Option<&str>,
    output_format: Option<&str>,
    settings: Option<VoiceSettings>,
) -> Result<ResolvedRequest, ApplicationError> {
    if text.trim().is_empty() {
        return Err(ApplicationError::validation("text is required"));
    }

    let format = match non_empty(output_format) {
        Some(format) => format.parse::<AudioFormat>()?,
        None => AudioFormat::default(),
    };

    let provider = match non_empty(provider) {
        Some(name) => providers
            .get(name)
            .ok_or_else(|| ApplicationError::validation(format!("Unknown provider: {}", name)))?,
        None => providers.default_provider().ok_or_else(|| {
            ApplicationError::ProviderUnavailable("no TTS provider configured".to_string())
        })?,
    };

    if let Some(settings) = &settings {
        settings.validate()?;
    }

    let voice_id = provider.resolve_voice_id(non_empty(voice_id).unwrap_or(default_voice_id));

    Ok(ResolvedRequest {
        provider,
        voice_id,
        format,
        settings,
    })
}
