//! TTS Provider Port - 语音合成服务抽象
//!
//! 定义 TTS 合成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::io::{AsyncRead, ReadBuf};

use crate::domain::{AudioFormat, Voice, VoiceSettings};

/// TTS 错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

/// 音频字节流
pub type AudioStream = Pin<Box<dyn AsyncRead + Send>>;

/// 合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice_id: String,
    pub output_format: AudioFormat,
    pub settings: Option<VoiceSettings>,
}

/// 合成结果
pub struct SynthesisResult {
    /// 音频流，调用方负责读取完毕
    pub audio: AudioStream,
    pub content_type: String,
    /// 已知时的字节数
    pub size_bytes: Option<u64>,
}

impl fmt::Debug for SynthesisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynthesisResult")
            .field("content_type", &self.content_type)
            .field("size_bytes", &self.size_bytes)
            .finish_non_exhaustive()
    }
}

impl SynthesisResult {
    /// 由内存中的音频构造结果
    pub fn from_bytes(data: Vec<u8>, content_type: impl Into<String>) -> Self {
        let size_bytes = Some(data.len() as u64);
        Self {
            audio: Box::pin(std::io::Cursor::new(data)),
            content_type: content_type.into(),
            size_bytes,
        }
    }
}

/// Provider 运行状态（健康检查用）
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProviderStatus {
    pub name: String,
    pub available: bool,
    pub active_jobs: usize,
    pub max_concurrent: usize,
}

/// TTS Provider Port
///
/// 远程 TTS 服务的抽象接口。`synthesize` 需支持最多 `max_concurrent` 路并发调用。
#[async_trait]
pub trait TtsProviderPort: Send + Sync {
    /// 稳定的 Provider 标识
    fn name(&self) -> &str;

    /// 执行合成
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResult, TtsError>;

    /// 可选音色列表
    async fn list_voices(&self) -> Result<Vec<Voice>, TtsError>;

    /// 轻量存活探测，仅用于健康上报，不阻止 `synthesize`
    async fn is_available(&self) -> bool;

    /// 声明的并发上限
    fn max_concurrent(&self) -> usize;

    /// 当前进行中的合成调用数
    fn active_jobs(&self) -> usize;

    /// 将音色别名解析为 Provider 的音色 ID
    fn resolve_voice_id(&self, name_or_id: &str) -> String {
        name_or_id.to_string()
    }

    async fn status(&self) -> ProviderStatus {
        ProviderStatus {
            name: self.name().to_string(),
            available: self.is_available().await,
            active_jobs: self.active_jobs(),
            max_concurrent: self.max_concurrent(),
        }
    }
}

/// 进行中合成调用计数器
#[derive(Debug, Default)]
pub struct ActiveJobCounter(Arc<AtomicUsize>);

impl ActiveJobCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 计数 +1，返回的 guard 释放时 -1
    pub fn track(&self) -> ActiveJobGuard {
        self.0.fetch_add(1, Ordering::SeqCst);
        ActiveJobGuard(self.0.clone())
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct ActiveJobGuard(Arc<AtomicUsize>);

impl ActiveJobGuard {
    /// 将计数绑定到音频流上，流被读完并释放后才 -1
    pub fn attach(self, audio: AudioStream) -> AudioStream {
        Box::pin(TrackedStream {
            inner: audio,
            _guard: self,
        })
    }
}

impl Drop for ActiveJobGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

struct TrackedStream {
    inner: AudioStream,
    _guard: ActiveJobGuard,
}

impl AsyncRead for TrackedStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        self.inner.as_mut().poll_read(cx, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_active_job_counter() {
        let counter = ActiveJobCounter::new();
        assert_eq!(counter.get(), 0);
        {
            let _a = counter.track();
            let _b = counter.track();
            assert_eq!(counter.get(), 2);
        }
        assert_eq!(counter.get(), 0);
    }

    #[tokio::test]
    async fn test_guard_lives_with_attached_stream() {
        let counter = ActiveJobCounter::new();
        let mut audio = counter
            .track()
            .attach(Box::pin(std::io::Cursor::new(b"abc".to_vec())));
        assert_eq!(counter.get(), 1);

        let mut buf = Vec::new();
        audio.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"abc");
        assert_eq!(counter.get(), 1);

        drop(audio);
        assert_eq!(counter.get(), 0);
    }

    #[tokio::test]
    async fn test_synthesis_result_from_bytes() {
        let mut result = SynthesisResult::from_bytes(b"abc".to_vec(), "audio/mpeg");
        assert_eq!(result.size_bytes, Some(3));

        let mut buf = Vec::new();
        result.audio.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"abc");
    }
}
