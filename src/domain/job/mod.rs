//! Job Context - 合成任务
//!
//! 一个 Job 对应一次 TTS 合成请求及其生命周期

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::{estimate_synthesis_duration, Job};
pub use errors::JobError;
pub use value_objects::{AudioFormat, JobStatus};
