//! Voice Context - Value Objects

use serde::{Deserialize, Serialize};

use super::VoiceError;

/// 可选择的音色
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub voice_id: String,
    pub name: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

/// 音色调节参数
///
/// 所有字段可选，未设置的字段由 Provider 使用自身默认值
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VoiceSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_boost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_speaker_boost: Option<bool>,
}

impl VoiceSettings {
    /// 默认音色参数
    pub fn default_settings() -> Self {
        Self {
            stability: Some(0.0),
            similarity_boost: Some(1.0),
            style: Some(0.0),
            speed: Some(1.0),
            use_speaker_boost: Some(true),
        }
    }

    /// 以 `other` 中已设置的字段覆盖当前值
    pub fn merge(&self, other: Option<&VoiceSettings>) -> VoiceSettings {
        let Some(other) = other else {
            return *self;
        };
        VoiceSettings {
            stability: other.stability.or(self.stability),
            similarity_boost: other.similarity_boost.or(self.similarity_boost),
            style: other.style.or(self.style),
            speed: other.speed.or(self.speed),
            use_speaker_boost: other.use_speaker_boost.or(self.use_speaker_boost),
        }
    }

    /// 范围校验
    ///
    /// - stability / similarity_boost / style: [0, 1]
    /// - speed: [0.5, 2.0]
    pub fn validate(&self) -> Result<(), VoiceError> {
        check_range("stability", self.stability, 0.0, 1.0)?;
        check_range("similarity_boost", self.similarity_boost, 0.0, 1.0)?;
        check_range("style", self.style, 0.0, 1.0)?;
        check_range("speed", self.speed, 0.5, 2.0)?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: Option<f64>, min: f64, max: f64) -> Result<(), VoiceError> {
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(VoiceError::SettingOutOfRange {
            field,
            value: v,
            min,
            max,
        }),
        _ => Ok(()),
    }
}
