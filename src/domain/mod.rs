//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Job Context: 合成任务及其状态机
//! - Voice Context: 音色与音色参数

pub mod job;
pub mod voice;

pub use job::{estimate_synthesis_duration, AudioFormat, Job, JobError, JobStatus};
pub use voice::{Voice, VoiceError, VoiceSettings};
