//! Worker Layer - Background Job Processing
//!
//! 实现 WorkerPool，处理异步合成任务

mod synthesis_worker;

pub use synthesis_worker::{WorkerPool, WorkerPoolConfig};
