//! Audio Storage Port - 出站端口
//!
//! 定义合成结果的存储和按时间过期清理的抽象接口

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::application::ports::AudioStream;
use crate::domain::AudioFormat;

/// 音频存储错误
#[derive(Debug, Error)]
pub enum AudioStorageError {
    #[error("Audio not found for job {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for AudioStorageError {
    fn from(err: std::io::Error) -> Self {
        AudioStorageError::IoError(err.to_string())
    }
}

/// 已存储音频的读取句柄
pub struct StoredAudio {
    pub stream: AudioStream,
    pub format: AudioFormat,
    pub size_bytes: u64,
}

impl StoredAudio {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

impl fmt::Debug for StoredAudio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredAudio")
            .field("format", &self.format)
            .field("size_bytes", &self.size_bytes)
            .finish_non_exhaustive()
    }
}

/// Audio Storage Port - 出站端口
///
/// 每个 job id 每种格式一个条目，条目的修改时间是过期清理的唯一依据
#[async_trait]
pub trait AudioStoragePort: Send + Sync {
    /// 保存音频，返回存储位置；同一 id + 格式重复写入会覆盖
    async fn store(
        &self,
        job_id: &str,
        data: &[u8],
        format: AudioFormat,
    ) -> Result<String, AudioStorageError>;

    /// 打开任一已知格式的音频
    async fn retrieve(&self, job_id: &str) -> Result<StoredAudio, AudioStorageError>;

    /// 删除该 id 的所有格式（不存在时不报错）
    async fn delete(&self, job_id: &str) -> Result<(), AudioStorageError>;

    /// 是否存在任一格式的音频
    async fn exists(&self, job_id: &str) -> bool;

    /// 获取存储位置
    async fn location(&self, job_id: &str) -> Option<String>;

    /// 删除修改时间早于 now - retention 的所有条目，返回删除数量
    async fn sweep_expired(&self, retention: Duration) -> Result<usize, AudioStorageError>;
}
