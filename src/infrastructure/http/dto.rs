//! Data Transfer Objects

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{SubmitJobCommand, SubmitJobResponse, SynthesizeCommand};
use crate::domain::{Job, JobStatus, VoiceSettings};

/// 时间统一输出为 `2006-01-02T15:04:05Z` 形式
fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ============================================================================
// TTS DTOs
// ============================================================================

/// 同步合成请求
#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    #[serde(default)]
    pub voice_id: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub output_format: Option<String>,
    #[serde(default)]
    pub voice_settings: Option<VoiceSettings>,
}

impl From<TtsRequest> for SynthesizeCommand {
    fn from(req: TtsRequest) -> Self {
        Self {
            text: req.text,
            voice_id: req.voice_id,
            provider: req.provider,
            output_format: req.output_format,
            voice_settings: req.voice_settings,
        }
    }
}

// ============================================================================
// Job DTOs
// ============================================================================

/// 创建任务请求
#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub text: String,
    #[serde(default)]
    pub voice_id: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub output_format: Option<String>,
    #[serde(default)]
    pub voice_settings: Option<VoiceSettings>,
}

impl From<CreateJobRequest> for SubmitJobCommand {
    fn from(req: CreateJobRequest) -> Self {
        Self {
            text: req.text,
            voice_id: req.voice_id,
            provider: req.provider,
            output_format: req.output_format,
            voice_settings: req.voice_settings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub created_at: String,
}

impl From<SubmitJobResponse> for CreateJobResponse {
    fn from(resp: SubmitJobResponse) -> Self {
        Self {
            job_id: resp.job_id,
            status: resp.status,
            created_at: format_time(resp.created_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListJobsParams {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub provider_name: String,
    pub output_format: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    pub progress_percentage: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_completion_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<&Job> for JobStatusResponse {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id().to_string(),
            status: job.status(),
            provider_name: job.provider_name().to_string(),
            output_format: job.output_format().to_string(),
            created_at: format_time(job.created_at()),
            started_at: job.started_at().map(format_time),
            completed_at: job.completed_at().map(format_time),
            progress_percentage: job.progress(),
            estimated_completion_at: job.estimated_completion_at().map(format_time),
            expires_at: job.expires_at().map(format_time),
            error_message: job.error_message().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobStatusResponse>,
    pub total: usize,
}

impl JobListResponse {
    pub fn from_jobs(jobs: &[Job]) -> Self {
        Self {
            jobs: jobs.iter().map(JobStatusResponse::from).collect(),
            total: jobs.len(),
        }
    }
}

// ============================================================================
// Provider DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListVoicesParams {
    pub provider: Option<String>,
}
