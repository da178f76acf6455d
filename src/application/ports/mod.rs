//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_storage;
mod job_queue;
mod tts_provider;

pub use audio_storage::{AudioStorageError, AudioStoragePort, StoredAudio};
pub use job_queue::{JobQueuePort, QueueError, QueueStats};
pub use tts_provider::{
    ActiveJobCounter, ActiveJobGuard, AudioStream, ProviderStatus, SynthesisRequest,
    SynthesisResult, TtsError, TtsProviderPort,
};
