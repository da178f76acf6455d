//! Job Context - Aggregate Root

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{AudioFormat, JobError, JobStatus};
use crate::domain::voice::VoiceSettings;

/// 预估耗时的基础延迟
const ESTIMATE_BASE_MS: i64 = 2_000;
/// 每个字符追加的预估耗时
const ESTIMATE_PER_CHAR_MS: i64 = 5;

/// 根据文本长度预估合成耗时（约 1000 字符 ≈ 7 秒）
pub fn estimate_synthesis_duration(char_count: usize) -> Duration {
    let chars = i64::try_from(char_count).unwrap_or(i64::MAX / ESTIMATE_PER_CHAR_MS);
    Duration::milliseconds(ESTIMATE_BASE_MS + chars * ESTIMATE_PER_CHAR_MS)
}

/// Job 聚合根
///
/// 不变量:
/// - 状态单调推进，终态不可逆
/// - progress 创建时为 0，仅在 completed 时为 100，processing 期间不回退
/// - `expires_at` 只在 completed 时设置（完成时间 + 保留窗口）
/// - `started_at` / `completed_at` 只在对应转换时设置一次
/// - 文本非空
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    id: String,
    text: String,
    voice_id: String,
    provider_name: String,
    output_format: AudioFormat,
    voice_settings: Option<VoiceSettings>,
    status: JobStatus,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    progress: u8,
    estimated_completion_at: Option<DateTime<Utc>>,
    error_message: Option<String>,
    result_location: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl Job {
    /// 创建新任务（状态 queued，进度 0）
    pub fn new(
        text: impl Into<String>,
        voice_id: impl Into<String>,
        provider_name: impl Into<String>,
        output_format: AudioFormat,
        voice_settings: Option<VoiceSettings>,
    ) -> Result<Self, JobError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(JobError::EmptyText);
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            text,
            voice_id: voice_id.into(),
            provider_name: provider_name.into(),
            output_format,
            voice_settings,
            status: JobStatus::Queued,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            progress: 0,
            estimated_completion_at: None,
            error_message: None,
            result_location: None,
            expires_at: None,
        })
    }

    /// queued → processing
    pub fn start_processing(&mut self) -> Result<(), JobError> {
        self.ensure_status(JobStatus::Queued, JobStatus::Processing)?;
        self.status = JobStatus::Processing;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// 更新进度与预计完成时间
    ///
    /// 只允许在 processing 状态下调用，进度不可回退且不能达到 100
    pub fn update_progress(
        &mut self,
        progress: u8,
        estimated_completion_at: Option<DateTime<Utc>>,
    ) -> Result<(), JobError> {
        self.ensure_status(JobStatus::Processing, JobStatus::Processing)?;
        if progress >= 100 {
            return Err(JobError::ProgressOutOfRange(progress));
        }
        if progress < self.progress {
            return Err(JobError::ProgressRegression {
                current: self.progress,
                requested: progress,
            });
        }
        self.progress = progress;
        self.estimated_completion_at = estimated_completion_at;
        Ok(())
    }

    /// processing → completed
    pub fn complete(
        &mut self,
        result_location: impl Into<String>,
        retention: Duration,
    ) -> Result<(), JobError> {
        self.ensure_status(JobStatus::Processing, JobStatus::Completed)?;
        let now = Utc::now();
        self.status = JobStatus::Completed;
        self.completed_at = Some(now);
        self.result_location = Some(result_location.into());
        self.expires_at = Some(now + retention);
        self.progress = 100;
        Ok(())
    }

    /// {queued | processing} → failed
    ///
    /// 进度保持在最后一个成功的检查点
    pub fn fail(&mut self, error_message: impl Into<String>) -> Result<(), JobError> {
        if self.status.is_terminal() {
            return Err(JobError::InvalidTransition {
                from: self.status,
                to: JobStatus::Failed,
            });
        }
        let message = error_message.into();
        self.status = JobStatus::Failed;
        self.completed_at = Some(Utc::now());
        self.error_message = Some(if message.trim().is_empty() {
            "unknown error".to_string()
        } else {
            message
        });
        Ok(())
    }

    fn ensure_status(&self, expected: JobStatus, to: JobStatus) -> Result<(), JobError> {
        if self.status != expected {
            return Err(JobError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        Ok(())
    }

    /// 结果是否已过期（未完成的任务永不过期）
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |expires_at| now > expires_at)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// 文本字符数（用于耗时预估与长度限制）
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    // Getters
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice_id(&self) -> &str {
        &self.voice_id
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn output_format(&self) -> AudioFormat {
        self.output_format
    }

    pub fn voice_settings(&self) -> Option<&VoiceSettings> {
        self.voice_settings.as_ref()
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn estimated_completion_at(&self) -> Option<DateTime<Utc>> {
        self.estimated_completion_at
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn result_location(&self) -> Option<&str> {
        self.result_location.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}
