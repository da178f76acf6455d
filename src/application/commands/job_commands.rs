//! Job Commands - 异步任务相关命令

use chrono::{DateTime, Utc};

use crate::domain::{JobStatus, VoiceSettings};

/// 提交异步合成任务命令
///
/// 除 text 外均可省略，省略时使用默认音色、默认 Provider 与 mp3 格式
#[derive(Debug, Clone, Default)]
pub struct SubmitJobCommand {
    pub text: String,
    pub voice_id: Option<String>,
    pub provider: Option<String>,
    pub output_format: Option<String>,
    pub voice_settings: Option<VoiceSettings>,
}

/// 提交任务响应
#[derive(Debug, Clone)]
pub struct SubmitJobResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

/// 删除任务命令（同时删除已存储的音频）
#[derive(Debug, Clone)]
pub struct DeleteJobCommand {
    pub job_id: String,
}
