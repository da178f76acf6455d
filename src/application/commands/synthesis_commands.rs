//! Synthesis Commands - 同步合成命令

use crate::domain::{AudioFormat, VoiceSettings};

/// 同步合成命令，短文本直接返回音频
#[derive(Debug, Clone, Default)]
pub struct SynthesizeCommand {
    pub text: String,
    pub voice_id: Option<String>,
    pub provider: Option<String>,
    pub output_format: Option<String>,
    pub voice_settings: Option<VoiceSettings>,
}

/// 同步合成响应
#[derive(Debug, Clone)]
pub struct SynthesizeResponse {
    pub audio: Vec<u8>,
    pub content_type: String,
    pub format: AudioFormat,
    pub provider: String,
}
