//! 应用层错误定义
//!
//! 统一的命令/查询错误类型。NotFound / NotYetComplete / Expired 是查询时的
//! 正常结果，以独立变体返回，由调用方决定如何呈现。

use thiserror::Error;

use crate::application::ports::{AudioStorageError, QueueError, TtsError};
use crate::domain::{JobError, JobStatus, VoiceError};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 任务尚未完成
    #[error("Job not yet completed (status: {status})")]
    NotYetComplete { status: JobStatus },

    /// 结果已过期
    #[error("Result has expired. Results are retained for {retention_hours} hours.")]
    Expired { retention_hours: u64 },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 输出格式无效
    #[error("Invalid output_format: {0}. Must be 'mp3' or 'wav'.")]
    InvalidFormat(String),

    /// 同步合成文本过长
    #[error("Text exceeds {max_length} character limit. Use POST /api/v1/jobs for longer texts.")]
    TextTooLong { max_length: usize, actual_length: usize },

    /// 队列已满，调用方可稍后重试
    #[error("Job queue is full, retry later")]
    QueueFull,

    /// 服务正在关闭
    #[error("Service is shutting down")]
    ShuttingDown,

    /// TTS Provider 不可用
    #[error("TTS provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// TTS Provider 调用失败
    #[error("TTS provider error: {0}")]
    ProviderFailure(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 Job NotFound 错误
    pub fn job_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: "Job",
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<QueueError> for ApplicationError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::NotFound(id) => Self::job_not_found(id),
            QueueError::Full => Self::QueueFull,
            QueueError::Closed => Self::ShuttingDown,
            other => Self::InternalError(other.to_string()),
        }
    }
}

impl From<TtsError> for ApplicationError {
    fn from(err: TtsError) -> Self {
        match err {
            TtsError::Unavailable(msg) => Self::ProviderUnavailable(msg),
            other => Self::ProviderFailure(other.to_string()),
        }
    }
}

impl From<AudioStorageError> for ApplicationError {
    fn from(err: AudioStorageError) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<JobError> for ApplicationError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::InvalidFormat(format) => Self::InvalidFormat(format),
            JobError::EmptyText | JobError::InvalidStatus(_) => {
                Self::ValidationError(err.to_string())
            }
            other => Self::InternalError(other.to_string()),
        }
    }
}

impl From<VoiceError> for ApplicationError {
    fn from(err: VoiceError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
