//! Job Queue Port - 任务注册表与分发队列
//!
//! 定义任务管理的抽象接口，具体实现在 infrastructure/memory 层

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::{Job, JobStatus};

/// Job Queue 错误
#[derive(Debug, Error, PartialEq)]
pub enum QueueError {
    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Job already exists: {0}")]
    AlreadyExists(String),

    /// 队列已满（调用方可重试）
    #[error("Job queue is full")]
    Full,

    /// 队列已关闭（不再接受新任务）
    #[error("Job queue is closed")]
    Closed,

    #[error("Invalid state transition for job {job_id}: {from} -> {to}")]
    InvalidStateTransition {
        job_id: String,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("Progress regression for job {job_id}: {current} -> {requested}")]
    ProgressRegression {
        job_id: String,
        current: u8,
        requested: u8,
    },
}

impl QueueError {
    /// 是否可由调用方稍后重试
    pub fn is_retriable(&self) -> bool {
        matches!(self, QueueError::Full)
    }
}

/// 队列统计（按状态计数的即时快照）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub total_jobs: usize,
    pub queued_jobs: usize,
    pub processing_jobs: usize,
    pub completed_jobs: usize,
    pub failed_jobs: usize,
}

impl QueueStats {
    pub fn record(&mut self, status: JobStatus) {
        self.total_jobs += 1;
        match status {
            JobStatus::Queued => self.queued_jobs += 1,
            JobStatus::Processing => self.processing_jobs += 1,
            JobStatus::Completed => self.completed_jobs += 1,
            JobStatus::Failed => self.failed_jobs += 1,
        }
    }
}

/// Job Queue Port
///
/// 任务存在性与状态的唯一数据源，同时负责准入控制。
/// 所有读取返回快照副本，调用方无法观察到进行中的修改。
#[async_trait]
pub trait JobQueuePort: Send + Sync {
    /// 登记任务并放入分发队列，队列满时等待空位
    ///
    /// 队列关闭时返回 `Closed`。等待期间丢弃该 future 会撤销登记。
    async fn enqueue(&self, job: Job) -> Result<(), QueueError>;

    /// 登记任务并放入分发队列，队列满时立即返回 `Full`
    fn try_enqueue(&self, job: Job) -> Result<(), QueueError>;

    /// 领取下一个任务（阻塞等待）
    ///
    /// 返回 `None` 表示队列已关闭且已排空，Worker 应退出。
    /// 同一任务只会被一个调用方领取。
    async fn dequeue(&self) -> Option<Job>;

    /// 获取任务快照
    fn get_job(&self, job_id: &str) -> Result<Job, QueueError>;

    /// 整体替换任务记录，状态不可回退
    fn update_job(&self, job: &Job) -> Result<(), QueueError>;

    /// 列出指定状态的任务
    fn list_jobs(&self, status: JobStatus) -> Vec<Job>;

    /// 删除任务记录（幂等）
    fn delete_job(&self, job_id: &str);

    /// 停止接受新任务并唤醒等待中的 `dequeue`（幂等）
    fn close(&self);

    fn is_closed(&self) -> bool;

    /// 当前队列统计
    fn stats(&self) -> QueueStats;
}
